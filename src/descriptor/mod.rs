//! The Field Descriptor Model: the declarative tree a backend sends to describe a form.
//!
//! Descriptors arrive as JSON objects in which `#`-prefixed keys are properties
//! (`#type`, `#title`, `#required`, ...) and every other key holding an object with
//! a `#type` is a nested descriptor. Kinds are resolved once, here, through a
//! [`TypeRegistry`], so later stages never look at raw tags again.

pub mod document;
pub mod kind;

pub use document::{TriageQuestion, TriageQuestionnaire, WebformDocument};
pub use kind::{CompositeKind, FieldKind, TypeRegistry};

use crate::error::StructureError;
use crate::value::Scalar;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::warn;

const TYPE_KEY: &str = "#type";

/// Conditional-visibility metadata attached to a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum TriageRule {
    /// The raw condition string, parsed each time visibility is evaluated.
    Conditions(String),
    /// Triage is enabled but the condition metadata is not a string.
    Unreadable,
}

/// One node of the descriptor tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// The key this descriptor was found under.
    pub key: String,
    /// The backend type tag, as sent.
    pub type_tag: String,
    pub kind: FieldKind,
    /// Decided from the kind and the composite properties when the descriptor is read.
    pub composite: Option<CompositeKind>,
    pub title: Option<String>,
    pub admin_title: Option<String>,
    pub required: bool,
    /// `false` only when the backend explicitly denies access.
    pub access: bool,
    pub default_value: Option<Scalar>,
    /// Enumerated options, value → label, in declaration order.
    pub options: IndexMap<String, String>,
    pub composite_elements: IndexMap<String, FieldDescriptor>,
    /// Parts flagged required on the parent through `#<part>__required`.
    pub required_parts: Vec<String>,
    pub triage: Option<TriageRule>,
    /// Nested descriptors (the fields of a wizard page).
    pub children: IndexMap<String, FieldDescriptor>,
}

impl FieldDescriptor {
    /// A bare descriptor of the given kind, mostly useful for building forms in code.
    pub fn new(key: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            type_tag: kind.tag().to_string(),
            composite: kind.composite_kind(),
            kind,
            title: None,
            admin_title: None,
            required: false,
            access: true,
            default_value: None,
            options: IndexMap::new(),
            composite_elements: IndexMap::new(),
            required_parts: Vec::new(),
            triage: None,
            children: IndexMap::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_triage(mut self, conditions: &str) -> Self {
        self.triage = Some(TriageRule::Conditions(conditions.to_string()));
        self
    }

    pub fn with_element(mut self, element: FieldDescriptor) -> Self {
        self.composite_elements.insert(element.key.clone(), element);
        if self.composite.is_none() {
            self.composite = Some(CompositeKind::Generic);
        }
        self
    }

    pub fn with_child(mut self, child: FieldDescriptor) -> Self {
        self.children.insert(child.key.clone(), child);
        self
    }

    /// `#title`, else `#admin_title`, else the key.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.admin_title.as_deref().filter(|t| !t.is_empty()))
            .unwrap_or(&self.key)
    }

    /// Whether the composite part `part` must be filled in.
    pub fn is_part_required(&self, part: &str) -> bool {
        self.composite_elements
            .get(part)
            .is_some_and(|element| element.required)
            || self.required_parts.iter().any(|p| p == part)
    }

    /// Reads a descriptor from JSON. Returns `None` when the value carries no `#type`.
    pub fn from_json(key: &str, value: &Value, registry: &TypeRegistry) -> Option<Self> {
        let object = value.as_object()?;
        let type_tag = object.get(TYPE_KEY)?.as_str()?.to_string();
        let kind = registry.resolve(&type_tag);

        let composite_elements: IndexMap<String, FieldDescriptor> = object
            .get("#webform_composite_elements")
            .and_then(Value::as_object)
            .map(|elements| {
                elements
                    .iter()
                    .filter_map(|(k, v)| FieldDescriptor::from_json(k, v, registry))
                    .map(|element| (element.key.clone(), strip_wizard_pages(element)))
                    .collect()
            })
            .unwrap_or_default();

        let composite = kind.composite_kind().or_else(|| {
            let flagged = object
                .get("#webform_composite")
                .is_some_and(is_truthy_json);
            (flagged || !composite_elements.is_empty()).then_some(CompositeKind::Generic)
        });

        let children = object
            .iter()
            .filter(|(k, _)| k.as_str() != TYPE_KEY)
            .filter_map(|(k, v)| FieldDescriptor::from_json(k, v, registry))
            .map(|child| (child.key.clone(), child))
            .collect();

        Some(Self {
            key: key.to_string(),
            type_tag,
            kind,
            composite,
            title: string_prop(object, "#title"),
            admin_title: string_prop(object, "#admin_title"),
            required: object.get("#required").is_some_and(is_truthy_json),
            access: object.get("#access").and_then(Value::as_bool).unwrap_or(true),
            default_value: object.get("#default_value").and_then(Scalar::from_json),
            options: read_options(object.get("#options")),
            composite_elements,
            required_parts: read_required_parts(object),
            triage: read_triage(object),
            children,
        })
    }
}

/// Composite sub-descriptors never hold wizard pages.
fn strip_wizard_pages(mut element: FieldDescriptor) -> FieldDescriptor {
    let before = element.children.len();
    element.children.retain(|_, child| !child.kind.is_wizard_page());
    if element.children.len() != before {
        warn!(
            "Dropped {} wizard page(s) nested inside composite element '{}'",
            before - element.children.len(),
            element.key
        );
    }
    element
}

fn string_prop(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn is_truthy_json(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn read_options(value: Option<&Value>) -> IndexMap<String, String> {
    let Some(Value::Object(options)) = value else {
        return IndexMap::new();
    };
    options
        .iter()
        .map(|(k, v)| {
            let label = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), label)
        })
        .collect()
}

fn read_required_parts(object: &Map<String, Value>) -> Vec<String> {
    object
        .iter()
        .filter(|(_, v)| is_truthy_json(v))
        .filter_map(|(k, _)| k.strip_prefix('#')?.strip_suffix("__required"))
        .map(str::to_string)
        .collect()
}

fn read_triage(object: &Map<String, Value>) -> Option<TriageRule> {
    if !object.get("#triage_enabled").is_some_and(is_truthy_json) {
        return None;
    }
    match object.get("#triage_conditions") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(TriageRule::Conditions(s.clone())),
        Some(_) => Some(TriageRule::Unreadable),
    }
}

/// The top-level descriptor map of one form, in the order the backend sent it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorModel {
    pub entries: IndexMap<String, FieldDescriptor>,
}

impl DescriptorModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level descriptor under its own key.
    pub fn with_entry(mut self, descriptor: FieldDescriptor) -> Self {
        self.entries.insert(descriptor.key.clone(), descriptor);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads a descriptor model from a JSON object. Entries without a `#type` are skipped.
    pub fn from_value(value: &Value, registry: &TypeRegistry) -> Result<Self, StructureError> {
        let object = value.as_object().ok_or_else(|| StructureError::NotAnObject {
            found: json_type_name(value).to_string(),
        })?;

        let mut entries = IndexMap::new();
        for (key, entry) in object {
            match FieldDescriptor::from_json(key, entry, registry) {
                Some(descriptor) => {
                    entries.insert(key.clone(), descriptor);
                }
                None => warn!("Skipping top-level entry '{}' without a type tag", key),
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json(json: &str, registry: &TypeRegistry) -> Result<Self, StructureError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| StructureError::JsonParseError(e.to_string()))?;
        Self::from_value(&value, registry)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_properties_and_children_in_order() {
        let value = json!({
            "#type": "webform_wizard_page",
            "#title": "About you",
            "name": { "#type": "textfield", "#title": "Name", "#required": true },
            "#options": { "ignored": "because not a descriptor" },
            "age": { "#type": "select", "#options": { "1": "Under 18", "2": "18+" } }
        });
        let page = FieldDescriptor::from_json("page_1", &value, &TypeRegistry::default()).unwrap();

        assert_eq!(page.kind, FieldKind::WizardPage);
        assert_eq!(page.display_title(), "About you");
        let keys: Vec<_> = page.children.keys().cloned().collect();
        assert_eq!(keys, vec!["name".to_string(), "age".to_string()]);
        assert!(page.children["name"].required);
        assert_eq!(page.children["age"].options.get("2").map(String::as_str), Some("18+"));
    }

    #[test]
    fn required_parts_come_from_parent_flags() {
        let value = json!({
            "#type": "webform_address",
            "#address__required": true,
            "#city__required": false,
            "#postal_code__title": "Postcode"
        });
        let address = FieldDescriptor::from_json("home", &value, &TypeRegistry::default()).unwrap();
        assert_eq!(address.composite, Some(CompositeKind::Address));
        assert!(address.is_part_required("address"));
        assert!(!address.is_part_required("city"));
    }

    #[test]
    fn unreadable_triage_metadata_is_kept() {
        let value = json!({
            "#type": "textfield",
            "#triage_enabled": true,
            "#triage_conditions": { "show_when": "car" }
        });
        let field = FieldDescriptor::from_json("f", &value, &TypeRegistry::default()).unwrap();
        assert_eq!(field.triage, Some(TriageRule::Unreadable));
    }
}
