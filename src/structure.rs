use crate::config::EngineConfig;
use crate::descriptor::{DescriptorModel, FieldDescriptor};
use itertools::Itertools;
use std::fmt;
use tracing::debug;

/// One page of the wizard: an ordered list of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: String,
    pub title: String,
    /// Fields in declaration order; each carries its own key.
    pub fields: Vec<FieldDescriptor>,
}

impl Step {
    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Fields that hold data, i.e. everything except nested wizard-page markers.
    pub fn data_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.kind.is_wizard_page())
    }

    /// Whether an error addressed to `error_field` (possibly `parent.child`) belongs here.
    pub fn owns_error_field(&self, error_field: &str) -> bool {
        self.fields
            .iter()
            .any(|f| addresses_field(error_field, &f.key))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.title,
            self.id,
            self.fields.iter().map(|field| &field.key).join(", ")
        )
    }
}

/// `error_field` is `field_key` itself or a dotted sub-field of it.
pub(crate) fn addresses_field(error_field: &str, field_key: &str) -> bool {
    error_field
        .strip_prefix(field_key)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Turns a descriptor model into the ordered list of wizard steps.
pub struct StructureParser<'a> {
    config: &'a EngineConfig,
}

impl<'a> StructureParser<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Wizard pages become steps in first-occurrence order; all other top-level fields
    /// are collected into a trailing synthetic step. An empty model yields no steps,
    /// which callers treat as "not ready".
    pub fn parse(&self, model: &DescriptorModel) -> Vec<Step> {
        let mut steps = Vec::new();
        let mut regular_fields = Vec::new();

        for (key, entry) in &model.entries {
            if entry.kind.is_wizard_page() {
                let fields = entry
                    .children
                    .iter()
                    .map(|(child_key, child)| FieldDescriptor {
                        key: child_key.clone(),
                        ..child.clone()
                    })
                    .collect();
                steps.push(Step {
                    id: key.clone(),
                    title: entry.display_title().to_string(),
                    fields,
                });
            } else {
                regular_fields.push(FieldDescriptor {
                    key: key.clone(),
                    ..entry.clone()
                });
            }
        }

        if !regular_fields.is_empty() {
            steps.push(Step {
                id: self.config.additional_step_id.clone(),
                title: self.config.additional_step_title.clone(),
                fields: regular_fields,
            });
        }

        debug!(
            "Parsed {} step(s) from {} top-level entries",
            steps.len(),
            model.entries.len()
        );
        steps
    }
}

/// The first step owning any of the given error fields, by dotted-prefix match.
pub fn first_step_with_errors<'e>(
    steps: &[Step],
    error_fields: impl Iterator<Item = &'e str> + Clone,
) -> Option<usize> {
    steps
        .iter()
        .find_position(|step| error_fields.clone().any(|field| step.owns_error_field(field)))
        .map(|(index, _)| index)
}
