//! # Shinsei - Multi-Step Webform Engine
//!
//! **Shinsei** turns a backend-supplied form description into a multi-step wizard:
//! it splits the description into ordered steps, tracks what the user has entered,
//! validates fields as they change, hides fields behind triage conditions, and
//! flattens everything into the payload the backend expects on submission.
//!
//! ## Core Workflow
//!
//! The engine works on a typed model of the form description rather than on raw JSON.
//! The primary workflow is:
//!
//! 1.  **Read the structure**: Parse the backend's JSON with [`WebformDocument`](descriptor::WebformDocument) or
//!     [`DescriptorModel`](descriptor::DescriptorModel). Type tags are resolved once, through a [`TypeRegistry`](descriptor::TypeRegistry).
//! 2.  **Initialize a store**: A [`FormStore`](store::FormStore) splits the descriptors into steps and
//!     seeds a value for every field.
//! 3.  **Fill and navigate**: Set values, answer triage questions, and move between
//!     steps. Forward navigation is blocked while the current step has errors.
//! 4.  **Submit**: Hand a [`SubmissionGateway`](gateway::SubmissionGateway) to
//!     [`FormStore::submit`](store::FormStore::submit). Pending files
//!     are uploaded, the whole form is validated, and the flattened payload is sent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shinsei::prelude::*;
//! use std::result::Result;
//!
//! struct Backend;
//!
//! impl SubmissionGateway for Backend {
//!     async fn upload_files(
//!         &self,
//!         _field_key: &str,
//!         files: &[PendingFile],
//!     ) -> Result<Vec<UploadedFile>, GatewayError> {
//!         Ok(files.iter().enumerate().map(|(i, _)| UploadedFile::new(i.to_string())).collect())
//!     }
//!
//!     async fn submit(&self, payload: &SubmissionPayload) -> Result<serde_json::Value, GatewayError> {
//!         Ok(serde_json::json!({ "sid": 1, "fields": payload.len() }))
//!     }
//! }
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::builder()
//!         .with_type_mapping("webform_telephone", "textfield")
//!         .build();
//!     let registry = config.type_registry();
//!
//!     let json = std::fs::read_to_string("path/to/webform.json")?;
//!     let document = WebformDocument::from_json("contact", &json, &registry)?;
//!
//!     let mut store = FormStore::new(config);
//!     let steps = store.initialize(&document.elements)?;
//!     println!("'{}' has {} step(s)", document.title, steps);
//!
//!     store.set_field_value("first_name", FieldValue::text("Ada"))?;
//!     match store.next_step()? {
//!         StepChange::Blocked(errors) => println!("Fix {} error(s) first", errors.len()),
//!         change => println!("{:?}", change),
//!     }
//!
//!     let response = store.submit(&Backend).await?;
//!     println!("Submitted: {}", response);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod gateway;
pub mod prelude;
pub mod store;
pub mod structure;
pub mod transform;
pub mod triage;
pub mod validation;
pub mod value;
