//! Field, step and whole-form validation.
//!
//! Validation never fails in the Rust sense: every pass returns the list of
//! field-addressed errors it found, and an empty list means the data is valid.

use crate::descriptor::FieldDescriptor;
use crate::structure::{Step, first_step_with_errors};
use crate::triage::should_display;
use crate::value::{FieldValue, FormValues, TriageAnswers};
use ahash::AHashMap;
use serde::Serialize;
use thiserror::Error;

mod presence;
mod rules;

pub use presence::has_value;
pub use rules::is_valid_email;

static EMPTY_VALUE: FieldValue = FieldValue::Empty;

/// A problem with one field. `field` is the field key, or `parent.child` for a
/// composite part.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn required(field: impl Into<String>, title: &str) -> Self {
        Self::new(field, format!("{} is required", title))
    }
}

/// The result of validating every step of a form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormReport {
    pub errors: Vec<ValidationError>,
    /// Index of the first step owning any of the errors; the step to navigate to.
    pub first_error_step: Option<usize>,
}

impl FormReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates a single field.
///
/// Fields without access and fields hidden by triage are skipped. A required field
/// without a value yields exactly one error and nothing else is checked on that pass.
pub fn validate_field(
    descriptor: &FieldDescriptor,
    value: &FieldValue,
    key: &str,
    values: &FormValues,
    answers: &TriageAnswers,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !descriptor.access || !should_display(descriptor, values, answers) {
        return errors;
    }

    if descriptor.required && !has_value(descriptor, value) {
        errors.push(ValidationError::required(key, descriptor.display_title()));
        return errors;
    }

    rules::type_specific(descriptor, value, key, &mut errors);
    errors
}

/// Validates every data field of a step, in declaration order.
pub fn validate_step(
    step: &Step,
    values: &FormValues,
    answers: &TriageAnswers,
) -> Vec<ValidationError> {
    step.data_fields()
        .flat_map(|field| {
            let value = values.get(&field.key).unwrap_or(&EMPTY_VALUE);
            validate_field(field, value, &field.key, values, answers)
        })
        .collect()
}

/// Validates all steps and finds the first one that needs the user's attention.
pub fn validate_form(steps: &[Step], values: &FormValues, answers: &TriageAnswers) -> FormReport {
    let errors: Vec<ValidationError> = steps
        .iter()
        .flat_map(|step| validate_step(step, values, answers))
        .collect();
    let first_error_step = if errors.is_empty() {
        None
    } else {
        first_step_with_errors(steps, errors.iter().map(|e| e.field.as_str()))
    };
    FormReport {
        errors,
        first_error_step,
    }
}

/// The first message reported for each field.
pub fn group_errors_by_field(errors: &[ValidationError]) -> AHashMap<String, String> {
    let mut grouped = AHashMap::new();
    for error in errors {
        grouped
            .entry(error.field.clone())
            .or_insert_with(|| error.message.clone());
    }
    grouped
}
