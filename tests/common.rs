//! Common test utilities for building form structures, values and a mock gateway.
use serde_json::json;
use shinsei::prelude::*;
use std::cell::RefCell;
use std::result::Result;

/// A two-page wizard plus one loose field that lands in the synthetic step.
///
/// - `personal`: `first_name` (required text), `email` (required email confirm)
/// - `details`: `home` (required address), `category` (select), `stolen_item`
///   (shown only when `category` is `"car"`)
/// - `notes`: textarea outside any page
#[allow(dead_code)]
pub fn wizard_structure_json() -> serde_json::Value {
    json!({
        "personal": {
            "#type": "webform_wizard_page",
            "#title": "About you",
            "first_name": {
                "#type": "textfield",
                "#title": "First name",
                "#required": true
            },
            "email": {
                "#type": "webform_email_confirm",
                "#title": "Email",
                "#required": true
            }
        },
        "details": {
            "#type": "webform_wizard_page",
            "#title": "Details",
            "home": {
                "#type": "webform_address",
                "#title": "Home address",
                "#required": true,
                "#address__required": true,
                "#city__required": true
            },
            "category": {
                "#type": "select",
                "#title": "Category",
                "#options": { "car": "Car", "bike": "Bike" }
            },
            "stolen_item": {
                "#type": "textfield",
                "#title": "What was stolen",
                "#required": true,
                "#triage_enabled": true,
                "#triage_conditions": "show_when:\n  category: \"car\""
            }
        },
        "notes": {
            "#type": "textarea",
            "#title": "Notes"
        }
    })
}

#[allow(dead_code)]
pub fn wizard_model() -> DescriptorModel {
    DescriptorModel::from_value(&wizard_structure_json(), &TypeRegistry::default())
        .expect("wizard fixture is a valid structure")
}

/// Three pages with one required text field each: `a`, `b`, `c`.
#[allow(dead_code)]
pub fn three_step_model() -> DescriptorModel {
    let page = |id: &str, field: &str| {
        FieldDescriptor::new(id, FieldKind::WizardPage)
            .with_title(&id.to_uppercase())
            .with_child(
                FieldDescriptor::new(field, FieldKind::TextField)
                    .with_title(&field.to_uppercase())
                    .required(),
            )
    };
    DescriptorModel::new()
        .with_entry(page("page_1", "a"))
        .with_entry(page("page_2", "b"))
        .with_entry(page("page_3", "c"))
}

/// A single-step form with one optional file field `evidence`.
#[allow(dead_code)]
pub fn upload_model() -> DescriptorModel {
    DescriptorModel::new().with_entry(
        FieldDescriptor::new("evidence", FieldKind::ManagedFile).with_title("Evidence"),
    )
}

#[allow(dead_code)]
pub fn ready_store(model: &DescriptorModel) -> FormStore {
    let mut store = FormStore::default();
    store
        .initialize(model)
        .expect("fixture structure initializes");
    store
}

/// A store on the wizard fixture with every required field filled.
#[allow(dead_code)]
pub fn filled_wizard_store() -> FormStore {
    let mut store = ready_store(&wizard_model());
    store
        .set_field_value("first_name", FieldValue::text("Ada"))
        .unwrap();
    store
        .set_field_value("email", email_pair("ada@example.org", "ada@example.org"))
        .unwrap();
    store
        .set_field_value(
            "home",
            FieldValue::Composite(
                CompositeValue::new(CompositeKind::Address)
                    .with_part("address", "1 Main St")
                    .with_part("city", "Springfield"),
            ),
        )
        .unwrap();
    store
}

#[allow(dead_code)]
pub fn email_pair(email: &str, confirm: &str) -> FieldValue {
    FieldValue::Composite(
        CompositeValue::new(CompositeKind::EmailConfirm)
            .with_part("email", email)
            .with_part("email_confirm", confirm),
    )
}

#[allow(dead_code)]
pub fn pending_file(name: &str) -> FileRef {
    FileRef::Pending(PendingFile::new(name, "image/png", vec![0u8; 16]))
}

/// Records every call and answers with canned results.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockGateway {
    pub fail_upload: bool,
    pub fail_submit: bool,
    /// Return one reference fewer than the number of files sent.
    pub short_upload: bool,
    pub uploads: RefCell<Vec<(String, Vec<String>)>>,
    pub submissions: RefCell<Vec<SubmissionPayload>>,
}

impl SubmissionGateway for MockGateway {
    async fn upload_files(
        &self,
        field_key: &str,
        files: &[PendingFile],
    ) -> Result<Vec<UploadedFile>, GatewayError> {
        self.uploads.borrow_mut().push((
            field_key.to_string(),
            files.iter().map(|f| f.name.clone()).collect(),
        ));
        if self.fail_upload {
            return Err(GatewayError::Upload("storage unavailable".to_string()));
        }
        let count = if self.short_upload {
            files.len().saturating_sub(1)
        } else {
            files.len()
        };
        Ok((0..count)
            .map(|i| UploadedFile::new(format!("fid-{}", i + 1)))
            .collect())
    }

    async fn submit(&self, payload: &SubmissionPayload) -> Result<serde_json::Value, GatewayError> {
        self.submissions.borrow_mut().push(payload.clone());
        if self.fail_submit {
            return Err(GatewayError::Submission("HTTP 500".to_string()));
        }
        Ok(json!({ "sid": "42" }))
    }
}
