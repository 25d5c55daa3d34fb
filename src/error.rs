use crate::validation::ValidationError;
use thiserror::Error;

/// Errors that can occur while reading a form structure from the backend.
#[derive(Error, Debug, Clone)]
pub enum StructureError {
    #[error("Failed to parse form structure JSON: {0}")]
    JsonParseError(String),

    #[error("Form structure must be a JSON object, but found {found}")]
    NotAnObject { found: String },

    #[error("This form is closed (status '{status}')")]
    FormClosed { status: String },
}

/// Errors that can occur while parsing a triage condition string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionParseError {
    #[error("Condition string is empty")]
    Empty,

    #[error("First line of a condition must declare a condition type, found '{0}'")]
    MissingConditionType(String),

    #[error("Unknown condition type '{0}', expected 'show_when' or 'hide_when'")]
    UnknownConditionType(String),

    #[error("Condition metadata is not a string")]
    Unreadable,
}

/// Errors that can occur when mutating or navigating a `FormStore`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("The form has no steps yet")]
    NotReady,

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("Field '{0}' is not part of the current form structure")]
    UnknownField(String),

    #[error("Field '{key}' expects a {expected} value")]
    ShapeMismatch { key: String, expected: &'static str },

    #[error("Cannot jump to step {requested} while on step {current}")]
    StepNotReachable { requested: usize, current: usize },
}

/// Errors reported by the external collaborator that uploads files and submits forms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("File upload failed: {0}")]
    Upload(String),

    #[error("Upload returned {returned} file references for {sent} files")]
    UploadCountMismatch { sent: usize, returned: usize },

    #[error("Form submission failed: {0}")]
    Submission(String),
}

/// Ways a `FormStore::submit` call can end without a successful submission.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("The form has no steps yet")]
    NotReady,

    #[error("A submission is already in progress")]
    AlreadySubmitting,

    #[error("The form has {} validation errors", errors.len())]
    Invalid {
        errors: Vec<ValidationError>,
        first_error_step: Option<usize>,
    },

    #[error("Failed to upload files for {field}: {source}")]
    Upload { field: String, source: GatewayError },

    #[error("{0}")]
    Rejected(GatewayError),
}
