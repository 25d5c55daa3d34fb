//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the shinsei crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use shinsei::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let config = EngineConfig::default();
//! let json = std::fs::read_to_string("path/to/elements.json")?;
//! let model = DescriptorModel::from_json(&json, &config.type_registry())?;
//!
//! let mut store = FormStore::new(config);
//! store.initialize(&model)?;
//!
//! let report = store.validate();
//! println!("{} error(s), first on step {:?}", report.errors.len(), report.first_error_step);
//! # Ok(())
//! # }
//! ```

// Configuration
pub use crate::config::{EngineConfig, EngineConfigBuilder};

// Form description
pub use crate::descriptor::{
    CompositeKind, DescriptorModel, FieldDescriptor, FieldKind, TriageQuestionnaire,
    TypeRegistry, WebformDocument,
};
pub use crate::structure::{Step, StructureParser};

// Values and payloads
pub use crate::transform::{SubmissionPayload, to_payload};
pub use crate::value::{
    CompositeValue, FieldValue, FileRef, FormValues, PendingFile, Scalar, TriageAnswers,
    UploadedFile,
};

// Session state
pub use crate::gateway::SubmissionGateway;
pub use crate::store::{FieldState, FormPhase, FormStore, Progress, StepChange, StepStatus};

// Validation and triage
pub use crate::triage::should_display;
pub use crate::validation::{FormReport, ValidationError, validate_form};

// Error types
pub use crate::error::{GatewayError, StoreError, StructureError, SubmitError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
