use super::{DescriptorModel, FieldDescriptor, TypeRegistry, json_type_name};
use crate::error::StructureError;
use crate::validation::ValidationError;
use crate::value::TriageAnswers;
use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// A preliminary question whose answer drives conditional visibility.
#[derive(Debug, Clone, Deserialize)]
pub struct TriageQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: u8,
    #[serde(default, deserialize_with = "map_or_empty")]
    pub options: IndexMap<String, String>,
    #[serde(default)]
    pub weight: Option<String>,
}

impl TriageQuestion {
    pub fn is_required(&self) -> bool {
        self.required == 1
    }

    /// The question expressed as a regular field descriptor, so it can be rendered
    /// and validated like any other select field.
    pub fn to_descriptor(&self, registry: &TypeRegistry) -> FieldDescriptor {
        let mut descriptor = FieldDescriptor::new(&self.id, registry.resolve(&self.question_type));
        descriptor.type_tag = self.question_type.clone();
        descriptor.title = Some(self.title.clone());
        descriptor.admin_title = Some(self.title.clone());
        descriptor.required = self.is_required();
        descriptor.options = self.options.clone();
        descriptor
    }
}

/// Reads a keyed map, treating `null` and `[]` as empty. PHP backends encode an
/// empty associative array as a JSON list.
fn map_or_empty<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(IndexMap::new()),
        Value::Array(items) if items.is_empty() => Ok(IndexMap::new()),
        value => IndexMap::<String, T>::deserialize(value).map_err(D::Error::custom),
    }
}

/// The triage questionnaire attached to a form document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriageQuestionnaire {
    #[serde(default, deserialize_with = "map_or_empty")]
    pub questions: IndexMap<String, TriageQuestion>,
}

impl TriageQuestionnaire {
    /// Reports every required question that has no usable answer.
    pub fn validate_answers(&self, answers: &TriageAnswers) -> Vec<ValidationError> {
        self.questions
            .iter()
            .filter(|(_, question)| question.is_required())
            .filter(|(key, _)| !answers.get(*key).is_some_and(|a| a.is_filled()))
            .map(|(key, question)| {
                ValidationError::new(key, format!("{} is required", question.title))
            })
            .collect()
    }
}

/// A form definition as fetched from the backend.
#[derive(Debug, Clone)]
pub struct WebformDocument {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub elements: DescriptorModel,
    pub triage: Option<TriageQuestionnaire>,
}

impl WebformDocument {
    /// Parses either a wrapped document (`{"id", "title", "status", "elements", ...}`)
    /// or a bare element map. Wrapped documents that are not open are rejected.
    pub fn from_json(
        webform_id: &str,
        json: &str,
        registry: &TypeRegistry,
    ) -> Result<Self, StructureError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| StructureError::JsonParseError(e.to_string()))?;
        Self::from_value(webform_id, &value, registry)
    }

    pub fn from_value(
        webform_id: &str,
        value: &Value,
        registry: &TypeRegistry,
    ) -> Result<Self, StructureError> {
        let object = value.as_object().ok_or_else(|| StructureError::NotAnObject {
            found: json_type_name(value).to_string(),
        })?;

        let Some(elements) = object.get("elements") else {
            debug!("Form '{}' was returned as a bare element map", webform_id);
            return Ok(Self {
                id: webform_id.to_string(),
                title: "Form".to_string(),
                description: None,
                status: "open".to_string(),
                elements: DescriptorModel::from_value(value, registry)?,
                triage: None,
            });
        };

        let status = object.get("status").and_then(Value::as_str);
        if let Some(status) = status {
            if status != "open" {
                return Err(StructureError::FormClosed {
                    status: status.to_string(),
                });
            }
        }

        let triage = match object.get("triage") {
            None | Some(Value::Null) => None,
            Some(triage) => Some(
                TriageQuestionnaire::deserialize(triage)
                    .map_err(|e| StructureError::JsonParseError(e.to_string()))?,
            ),
        };

        Ok(Self {
            id: object
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or(webform_id)
                .to_string(),
            title: object
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("Form")
                .to_string(),
            description: object
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            status: status.unwrap_or("open").to_string(),
            elements: DescriptorModel::from_value(elements, registry)?,
            triage,
        })
    }

    /// The triage questions as select-like descriptors, in questionnaire order.
    pub fn triage_descriptors(&self, registry: &TypeRegistry) -> Vec<FieldDescriptor> {
        self.triage
            .iter()
            .flat_map(|t| t.questions.values())
            .map(|q| q.to_descriptor(registry))
            .collect()
    }

    pub fn has_triage(&self) -> bool {
        self.triage.as_ref().is_some_and(|t| !t.questions.is_empty())
    }
}
