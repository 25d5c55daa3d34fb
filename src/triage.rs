//! Conditional visibility driven by triage answers.
//!
//! A condition string looks like
//!
//! ```text
//! show_when:
//!   what_did_you_have_stolen: "car"
//!   reported_to_police: true
//! ```
//!
//! The first line names the condition type (`show_when` or `hide_when`); every
//! following non-blank line is a `key: value` pair. A compact single-line form,
//! `show_when: {category: "car", urgent: true}`, is accepted as well.
//!
//! Values are coerced in priority order: `true`/`false` become booleans, anything
//! that parses as a finite number becomes a number, everything else is kept as the
//! string with its quotes removed. All pairs must equal the merged answers
//! (triage answers override form values) for the conditions to be met.

use crate::descriptor::{FieldDescriptor, TriageRule};
use crate::error::ConditionParseError;
use crate::value::{FormValues, Scalar, TriageAnswers};
use indexmap::IndexMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionMode {
    ShowWhen,
    HideWhen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriageCondition {
    pub mode: ConditionMode,
    /// Field key → required value.
    pub expectations: IndexMap<String, Scalar>,
}

impl TriageCondition {
    pub fn parse(input: &str) -> Result<Self, ConditionParseError> {
        let mut lines = input.trim().lines();
        let first = lines.next().map(str::trim).unwrap_or_default();
        if first.is_empty() {
            return Err(ConditionParseError::Empty);
        }

        let (mode_tag, inline) = first
            .split_once(':')
            .ok_or_else(|| ConditionParseError::MissingConditionType(first.to_string()))?;
        let mode = match mode_tag.trim() {
            "show_when" => ConditionMode::ShowWhen,
            "hide_when" => ConditionMode::HideWhen,
            other => return Err(ConditionParseError::UnknownConditionType(other.to_string())),
        };

        let mut expectations = IndexMap::new();
        let inline = inline.trim();
        if let Some(body) = inline.strip_prefix('{').and_then(|b| b.strip_suffix('}')) {
            for pair in body.split(',') {
                insert_pair(&mut expectations, pair);
            }
        }
        for line in lines {
            insert_pair(&mut expectations, line);
        }

        Ok(Self { mode, expectations })
    }

    /// Whether every expected value equals the merged answer for its key.
    pub fn conditions_met(&self, values: &FormValues, answers: &TriageAnswers) -> bool {
        self.expectations.iter().all(|(key, expected)| {
            match answers.get(key) {
                Some(answer) => answer == expected,
                None => values.get(key).is_some_and(|v| v.matches(expected)),
            }
        })
    }

    pub fn evaluate(&self, values: &FormValues, answers: &TriageAnswers) -> bool {
        let met = self.conditions_met(values, answers);
        match self.mode {
            ConditionMode::ShowWhen => met,
            ConditionMode::HideWhen => !met,
        }
    }
}

fn insert_pair(expectations: &mut IndexMap<String, Scalar>, raw: &str) {
    let Some((key, value)) = raw.trim().split_once(':') else {
        return;
    };
    let key = strip_quotes(key.trim());
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return;
    }
    expectations.insert(key, coerce_value(value));
}

fn strip_quotes(raw: &str) -> String {
    raw.chars().filter(|c| *c != '"' && *c != '\'').collect()
}

fn coerce_value(raw: &str) -> Scalar {
    let text = strip_quotes(raw);
    match text.as_str() {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        _ => match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Scalar::Number(n),
            _ => Scalar::Text(text),
        },
    }
}

/// Whether `descriptor` should be shown given the current values and triage answers.
///
/// Descriptors without triage metadata are always shown. Metadata that cannot be
/// read or parsed hides the field.
pub fn should_display(
    descriptor: &FieldDescriptor,
    values: &FormValues,
    answers: &TriageAnswers,
) -> bool {
    match &descriptor.triage {
        None => true,
        Some(TriageRule::Unreadable) => {
            warn!(
                "Hiding '{}': {}",
                descriptor.key,
                ConditionParseError::Unreadable
            );
            false
        }
        Some(TriageRule::Conditions(raw)) => match TriageCondition::parse(raw) {
            Ok(condition) => condition.evaluate(values, answers),
            Err(e) => {
                warn!(
                    "Hiding '{}': failed to parse triage conditions {:?}: {}",
                    descriptor.key, raw, e
                );
                false
            }
        },
    }
}
