use crate::descriptor::CompositeKind;
use crate::value::{CompositeValue, FieldValue, FileRef, FormValues, Scalar};
use serde_json::{Map, Value, json};
use tracing::trace;

/// The flattened field key → value mapping handed to the submission gateway.
pub type SubmissionPayload = Map<String, Value>;

const ADDRESS_PARTS: [&str; 6] = [
    "address",
    "address_2",
    "city",
    "state_province",
    "postal_code",
    "country",
];
const NAME_PARTS: [&str; 3] = ["title", "first_name", "last_name"];

/// Flattens the form values into the backend's submission shape.
///
/// Empty values are left out entirely. Address and name composites keep only their
/// recognized, non-empty parts; an email confirmation pair sends only the email.
/// Uploaded files are replaced by their identifiers, files still pending by a
/// name/size/type descriptor.
pub fn to_payload(values: &FormValues) -> SubmissionPayload {
    let mut payload = Map::new();
    for (key, value) in values {
        match transform_value(value) {
            Some(transformed) => {
                payload.insert(key.clone(), transformed);
            }
            None => trace!("Omitting empty value for '{}'", key),
        }
    }
    payload
}

fn transform_value(value: &FieldValue) -> Option<Value> {
    match value {
        FieldValue::Empty => None,
        FieldValue::Scalar(Scalar::Text(s)) if s.is_empty() => None,
        FieldValue::Scalar(scalar) => Some(scalar.to_json()),
        FieldValue::Files(files) if files.is_empty() => None,
        FieldValue::Files(files) => Some(Value::Array(files.iter().map(file_entry).collect())),
        FieldValue::Composite(composite) => transform_composite(composite),
    }
}

fn transform_composite(composite: &CompositeValue) -> Option<Value> {
    match composite.kind {
        CompositeKind::Address => known_parts(composite, &ADDRESS_PARTS),
        CompositeKind::FullName => known_parts(composite, &NAME_PARTS),
        CompositeKind::EmailConfirm => composite
            .part("email")
            .filter(|email| email.is_truthy())
            .map(Scalar::to_json),
        CompositeKind::Generic => Some(Value::Object(
            composite
                .parts
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )),
    }
}

fn known_parts(composite: &CompositeValue, parts: &[&str]) -> Option<Value> {
    let object: Map<String, Value> = parts
        .iter()
        .filter_map(|part| {
            composite
                .part(part)
                .filter(|v| v.is_truthy())
                .map(|v| (part.to_string(), v.to_json()))
        })
        .collect();
    // An address or name with nothing filled in is left out instead of sent as `{}`.
    (!object.is_empty()).then_some(Value::Object(object))
}

fn file_entry(file: &FileRef) -> Value {
    match file {
        FileRef::Uploaded(uploaded) => Value::String(uploaded.id.clone()),
        FileRef::Pending(pending) => json!({
            "filename": pending.name,
            "filesize": pending.size,
            "filemime": pending.mime_type,
        }),
    }
}
