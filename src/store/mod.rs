//! The Form State Store: one form-filling session.
//!
//! The store owns the parsed steps, the Form Value Tree, per-field validity and the
//! current step index. It is an ordinary value: construct one per session and hand
//! it (or a reference to it) to whatever drives the UI.
//!
//! Phases move `Uninitialized → Ready → Submitting → Ready | Cleared`. A store
//! initialized with a structure that yields no steps stays `Uninitialized`.

use crate::config::EngineConfig;
use crate::descriptor::{DescriptorModel, FieldDescriptor, FieldKind};
use crate::error::StoreError;
use crate::structure::{Step, StructureParser, addresses_field};
use crate::transform::{SubmissionPayload, to_payload};
use crate::validation::{FormReport, ValidationError, validate_field, validate_form, validate_step};
use crate::value::{CompositeValue, FieldValue, FormValues, Scalar, TriageAnswers};
use ahash::AHashMap;
use indexmap::IndexMap;
use tracing::{debug, info};

mod submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Uninitialized,
    Ready,
    Submitting,
    Cleared,
}

/// Stored validity of one field, refreshed every time its value is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

/// What a navigation request did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepChange {
    Moved { from: usize, to: usize },
    Stayed,
    /// The current step has errors; they are now the displayed errors.
    Blocked(Vec<ValidationError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based index of the current step, `0` when there are no steps.
    pub current: usize,
    pub total: usize,
    pub percent: u8,
}

pub struct FormStore {
    config: EngineConfig,
    phase: FormPhase,
    steps: Vec<Step>,
    /// Field key → (step index, field index).
    field_index: AHashMap<String, (usize, usize)>,
    values: FormValues,
    field_states: IndexMap<String, FieldState>,
    triage_answers: TriageAnswers,
    current_step: usize,
    displayed_errors: Vec<ValidationError>,
    submit_error: Option<String>,
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl FormStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            phase: FormPhase::Uninitialized,
            steps: Vec::new(),
            field_index: AHashMap::new(),
            values: FormValues::new(),
            field_states: IndexMap::new(),
            triage_answers: TriageAnswers::new(),
            current_step: 0,
            displayed_errors: Vec::new(),
            submit_error: None,
        }
    }

    /// Parses `model` into steps and seeds a value for every data field.
    ///
    /// Calling this again with a new structure keeps the values of fields present
    /// in both structures as long as the value still fits the field (and revalidates them),
    /// seeds defaults for new fields and drops values of fields that no longer exist.
    /// Returns the number of steps.
    pub fn initialize(&mut self, model: &DescriptorModel) -> Result<usize, StoreError> {
        if self.phase == FormPhase::Submitting {
            return Err(StoreError::SubmissionInProgress);
        }

        let steps = StructureParser::new(&self.config).parse(model);
        let mut field_index = AHashMap::new();
        let mut values = FormValues::new();
        let mut field_states = IndexMap::new();
        let mut kept = Vec::new();

        for (step_idx, step) in steps.iter().enumerate() {
            for (field_idx, field) in step.fields.iter().enumerate() {
                if field.kind.is_wizard_page() {
                    continue;
                }
                field_index.insert(field.key.clone(), (step_idx, field_idx));
                let existing = self
                    .values
                    .swap_remove(&field.key)
                    .filter(|value| check_shape(field, value).is_ok());
                match existing {
                    Some(existing) => {
                        values.insert(field.key.clone(), existing);
                        field_states.insert(field.key.clone(), FieldState::default());
                        kept.push(field.key.clone());
                    }
                    None => {
                        values.insert(field.key.clone(), FieldValue::default_for(field));
                        field_states.insert(
                            field.key.clone(),
                            FieldState {
                                valid: !field.required,
                                errors: Vec::new(),
                            },
                        );
                    }
                }
            }
        }

        self.phase = if steps.is_empty() {
            FormPhase::Uninitialized
        } else {
            FormPhase::Ready
        };
        self.current_step = self.current_step.min(steps.len().saturating_sub(1));
        self.steps = steps;
        self.field_index = field_index;
        self.values = values;
        self.field_states = field_states;
        self.displayed_errors.clear();
        for key in &kept {
            self.revalidate_field(key)?;
        }
        self.revalidate_gated_fields(None);

        info!(
            "Initialized form with {} step(s) and {} field(s)",
            self.steps.len(),
            self.values.len()
        );
        Ok(self.steps.len())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn current_step_data(&self) -> Option<&Step> {
        self.steps.get(self.current_step)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn field_value(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn field_state(&self, key: &str) -> Option<&FieldState> {
        self.field_states.get(key)
    }

    pub fn descriptor(&self, key: &str) -> Option<&FieldDescriptor> {
        let (step_idx, field_idx) = *self.field_index.get(key)?;
        self.steps.get(step_idx)?.fields.get(field_idx)
    }

    pub fn displayed_errors(&self) -> &[ValidationError] {
        &self.displayed_errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn triage_answers(&self) -> &TriageAnswers {
        &self.triage_answers
    }

    /// Records a triage answer and refreshes the state of every triage-gated field.
    pub fn set_triage_answer(&mut self, question: &str, answer: impl Into<Scalar>) {
        self.triage_answers.insert(question.to_string(), answer.into());
        self.revalidate_gated_fields(None);
    }

    /// Stores `value` for `key` and revalidates that field immediately.
    pub fn set_field_value(
        &mut self,
        key: &str,
        value: FieldValue,
    ) -> Result<&FieldState, StoreError> {
        self.ensure_ready()?;
        let descriptor = self
            .descriptor(key)
            .ok_or_else(|| StoreError::UnknownField(key.to_string()))?;
        check_shape(descriptor, &value)?;

        self.values.insert(key.to_string(), value);
        self.displayed_errors
            .retain(|error| !addresses_field(&error.field, key));
        self.revalidate_gated_fields(Some(key));
        self.revalidate_field(key)
    }

    /// Updates one part of a composite field and revalidates the field.
    pub fn set_composite_part(
        &mut self,
        key: &str,
        part: &str,
        value: impl Into<Scalar>,
    ) -> Result<&FieldState, StoreError> {
        let descriptor = self
            .descriptor(key)
            .ok_or_else(|| StoreError::UnknownField(key.to_string()))?;
        let kind = descriptor.composite.ok_or(StoreError::ShapeMismatch {
            key: key.to_string(),
            expected: "scalar or file list",
        })?;

        let mut composite = self
            .values
            .get(key)
            .and_then(FieldValue::as_composite)
            .cloned()
            .unwrap_or_else(|| CompositeValue::new(kind));
        composite.parts.insert(part.to_string(), value.into());
        self.set_field_value(key, FieldValue::Composite(composite))
    }

    fn revalidate_field(&mut self, key: &str) -> Result<&FieldState, StoreError> {
        let &(step_idx, field_idx) = self
            .field_index
            .get(key)
            .ok_or_else(|| StoreError::UnknownField(key.to_string()))?;
        let descriptor = &self.steps[step_idx].fields[field_idx];
        let value = self.values.get(key).cloned().unwrap_or_default();
        let errors = validate_field(descriptor, &value, key, &self.values, &self.triage_answers);

        let state = self.field_states.entry(key.to_string()).or_default();
        state.valid = errors.is_empty();
        state.errors = errors;
        Ok(state)
    }

    /// Visibility of gated fields can depend on any value or answer, so their
    /// stored state is refreshed after every edit.
    fn revalidate_gated_fields(&mut self, skip: Option<&str>) {
        let gated: Vec<String> = self
            .steps
            .iter()
            .flat_map(|step| step.data_fields())
            .filter(|field| field.triage.is_some() && Some(field.key.as_str()) != skip)
            .map(|field| field.key.clone())
            .collect();
        for key in gated {
            if self.revalidate_field(&key).is_err() {
                debug!("Gated field '{}' is not indexed", key);
            }
        }
    }

    /// Stored validity of every data field in the step. Unknown steps count as valid.
    pub fn is_step_valid(&self, index: usize) -> bool {
        self.steps.get(index).is_none_or(|step| {
            step.data_fields().all(|field| {
                self.field_states
                    .get(&field.key)
                    .is_none_or(|state| state.valid)
            })
        })
    }

    pub fn validate_current_step(&self) -> Vec<ValidationError> {
        self.current_step_data()
            .map(|step| validate_step(step, &self.values, &self.triage_answers))
            .unwrap_or_default()
    }

    /// Whole-form validation on the current values.
    pub fn validate(&self) -> FormReport {
        validate_form(&self.steps, &self.values, &self.triage_answers)
    }

    /// Moves forward only if the current step validates cleanly.
    pub fn next_step(&mut self) -> Result<StepChange, StoreError> {
        self.ensure_ready()?;
        let errors = self.validate_current_step();
        if !errors.is_empty() {
            debug!(
                "Step {} has {} error(s), staying put",
                self.current_step,
                errors.len()
            );
            self.displayed_errors = errors.clone();
            return Ok(StepChange::Blocked(errors));
        }

        self.displayed_errors.clear();
        if self.current_step + 1 < self.steps.len() {
            Ok(self.move_to(self.current_step + 1))
        } else {
            Ok(StepChange::Stayed)
        }
    }

    /// Moves back one step. Displayed errors are cleared, values are kept.
    pub fn previous_step(&mut self) -> Result<StepChange, StoreError> {
        self.ensure_ready()?;
        self.displayed_errors.clear();
        if self.current_step == 0 {
            return Ok(StepChange::Stayed);
        }
        Ok(self.move_to(self.current_step - 1))
    }

    /// Jumps to an earlier step (or the current one). Skipping ahead is refused.
    pub fn go_to_step(&mut self, index: usize) -> Result<StepChange, StoreError> {
        self.ensure_ready()?;
        if index > self.current_step {
            return Err(StoreError::StepNotReachable {
                requested: index,
                current: self.current_step,
            });
        }
        self.displayed_errors.clear();
        if index == self.current_step {
            Ok(StepChange::Stayed)
        } else {
            Ok(self.move_to(index))
        }
    }

    fn move_to(&mut self, index: usize) -> StepChange {
        let from = self.current_step;
        self.current_step = index;
        debug!("Moved from step {} to step {}", from, index);
        StepChange::Moved { from, to: index }
    }

    pub fn step_status(&self, index: usize) -> StepStatus {
        match index.cmp(&self.current_step) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Current,
            std::cmp::Ordering::Greater => StepStatus::Upcoming,
        }
    }

    pub fn progress(&self) -> Progress {
        let total = self.steps.len();
        if total == 0 {
            return Progress {
                current: 0,
                total,
                percent: 0,
            };
        }
        let current = self.current_step + 1;
        let percent = ((current as f64 / total as f64) * 100.0).round() as u8;
        Progress {
            current,
            total,
            percent,
        }
    }

    /// The payload the current values would be submitted as.
    pub fn payload(&self) -> SubmissionPayload {
        to_payload(&self.values)
    }

    /// Discards the whole session.
    pub fn reset(&mut self) {
        self.steps.clear();
        self.field_index.clear();
        self.values.clear();
        self.field_states.clear();
        self.triage_answers.clear();
        self.current_step = 0;
        self.displayed_errors.clear();
        self.submit_error = None;
        self.phase = FormPhase::Cleared;
        debug!("Form state cleared");
    }

    fn ensure_ready(&self) -> Result<(), StoreError> {
        match self.phase {
            FormPhase::Ready => Ok(()),
            FormPhase::Submitting => Err(StoreError::SubmissionInProgress),
            FormPhase::Uninitialized | FormPhase::Cleared => Err(StoreError::NotReady),
        }
    }
}

fn check_shape(descriptor: &FieldDescriptor, value: &FieldValue) -> Result<(), StoreError> {
    let expected = match (descriptor.composite, &descriptor.kind, value) {
        (_, _, FieldValue::Empty) => return Ok(()),
        (Some(kind), _, FieldValue::Composite(c)) if c.kind == kind => return Ok(()),
        (Some(_), _, _) => "composite",
        (None, FieldKind::ManagedFile, FieldValue::Files(_)) => return Ok(()),
        (None, FieldKind::ManagedFile, _) => "file list",
        (None, _, FieldValue::Scalar(_)) => return Ok(()),
        (None, _, _) => "scalar",
    };
    Err(StoreError::ShapeMismatch {
        key: descriptor.key.clone(),
        expected,
    })
}
