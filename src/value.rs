//! The Form Value Tree: what the user has entered so far.
//!
//! Values are tagged by shape when they are created, because the descriptor
//! of the field they belong to is known at that point. Nothing downstream
//! inspects a value's contents to guess what it is.

use crate::descriptor::{CompositeKind, FieldDescriptor, FieldKind};
use ahash::AHashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field key → current value, in field declaration order.
pub type FormValues = IndexMap<String, FieldValue>;

/// Answers to the preliminary triage questionnaire, keyed by question id.
pub type TriageAnswers = AHashMap<String, Scalar>;

/// A single primitive value. Equality is strict: `Text("1")`, `Number(1.0)`
/// and `Bool(true)` are all different.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Whether this value counts as filled in: non-blank text, `true`, or any number.
    pub fn is_filled(&self) -> bool {
        match self {
            Scalar::Text(s) => !s.trim().is_empty(),
            Scalar::Bool(b) => *b,
            Scalar::Number(_) => true,
        }
    }

    /// Loose truthiness, used where a plain "is there something" check applies.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Text(s) => !s.is_empty(),
            Scalar::Bool(b) => *b,
            Scalar::Number(n) => *n != 0.0 && !n.is_nan(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Text(s) => serde_json::Value::String(s.clone()),
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }

    /// Converts a JSON primitive. Arrays, objects and `null` have no scalar form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Scalar::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Scalar::Number),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

/// A file chosen by the user that has not been handed to the uploader yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// A file reference returned by the uploader.
///
/// Uploaders answer with `fid`, `id`, or both, as a string or a number. `fid` wins
/// when both are present and numbers are kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUploadedFile")]
pub struct UploadedFile {
    pub id: String,
    pub filename: Option<String>,
    pub filesize: Option<u64>,
    pub filemime: Option<String>,
}

#[derive(Deserialize)]
struct RawUploadedFile {
    #[serde(default)]
    fid: Option<serde_json::Value>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    filesize: Option<serde_json::Value>,
    #[serde(default)]
    filemime: Option<String>,
}

impl TryFrom<RawUploadedFile> for UploadedFile {
    type Error = String;

    fn try_from(raw: RawUploadedFile) -> Result<Self, Self::Error> {
        let id = [raw.fid, raw.id]
            .into_iter()
            .flatten()
            .find_map(|value| identifier_text(&value))
            .ok_or_else(|| "uploaded file needs a string or numeric `fid` or `id`".to_string())?;
        Ok(Self {
            id,
            filename: raw.filename,
            filesize: raw.filesize.as_ref().and_then(|size| match size {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.parse().ok(),
                _ => None,
            }),
            filemime: raw.filemime,
        })
    }
}

fn identifier_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl UploadedFile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: None,
            filesize: None,
            filemime: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileRef {
    Pending(PendingFile),
    Uploaded(UploadedFile),
}

impl FileRef {
    pub fn is_pending(&self) -> bool {
        matches!(self, FileRef::Pending(_))
    }
}

/// The sub-values of a composite field, tagged with the composite's kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeValue {
    pub kind: CompositeKind,
    pub parts: IndexMap<String, Scalar>,
}

impl CompositeValue {
    pub fn new(kind: CompositeKind) -> Self {
        Self {
            kind,
            parts: IndexMap::new(),
        }
    }

    pub fn with_part(mut self, part: &str, value: impl Into<Scalar>) -> Self {
        self.parts.insert(part.to_string(), value.into());
        self
    }

    pub fn part(&self, part: &str) -> Option<&Scalar> {
        self.parts.get(part)
    }

    /// The part as text, or `""` when missing or not text.
    pub fn text(&self, part: &str) -> &str {
        self.parts.get(part).and_then(Scalar::as_str).unwrap_or("")
    }

    pub fn is_part_filled(&self, part: &str) -> bool {
        self.parts.get(part).is_some_and(Scalar::is_filled)
    }
}

/// The value held for one field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Scalar(Scalar),
    Files(Vec<FileRef>),
    Composite(CompositeValue),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Scalar(Scalar::Text(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        FieldValue::Scalar(Scalar::Bool(value))
    }

    pub fn number(value: f64) -> Self {
        FieldValue::Scalar(Scalar::Number(value))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeValue> {
        match self {
            FieldValue::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[FileRef]> {
        match self {
            FieldValue::Files(files) => Some(files),
            _ => None,
        }
    }

    /// Strict comparison against a scalar, as used by triage conditions.
    pub fn matches(&self, expected: &Scalar) -> bool {
        self.as_scalar() == Some(expected)
    }

    /// A short name for the shape of this value, used in error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            FieldValue::Empty => "empty",
            FieldValue::Scalar(_) => "scalar",
            FieldValue::Files(_) => "file list",
            FieldValue::Composite(_) => "composite",
        }
    }

    /// The initial value a freshly initialized form holds for `descriptor`.
    pub fn default_for(descriptor: &FieldDescriptor) -> Self {
        if let Some(kind) = descriptor.composite {
            return FieldValue::Composite(CompositeValue::new(kind));
        }
        match descriptor.kind {
            FieldKind::Checkbox | FieldKind::Checkboxes => FieldValue::bool(false),
            FieldKind::ManagedFile => FieldValue::Empty,
            _ => match &descriptor.default_value {
                Some(value) => FieldValue::Scalar(value.clone()),
                None => FieldValue::text(""),
            },
        }
    }

    /// Reads a JSON value for `descriptor`, choosing the variant from the descriptor.
    ///
    /// Composite fields take an object of primitives, file fields take an array of
    /// upload results (`{"id"|"fid", ...}`) or pending files (`{"name", "size", "type"}`),
    /// everything else takes a primitive. `null` is always `Empty`. Returns `None` when
    /// the JSON does not fit the descriptor.
    pub fn from_json(descriptor: &FieldDescriptor, json: &serde_json::Value) -> Option<Self> {
        if json.is_null() {
            return Some(FieldValue::Empty);
        }
        if let Some(kind) = descriptor.composite {
            let object = json.as_object()?;
            let parts = object
                .iter()
                .filter_map(|(k, v)| Scalar::from_json(v).map(|s| (k.clone(), s)))
                .collect();
            return Some(FieldValue::Composite(CompositeValue { kind, parts }));
        }
        if descriptor.kind == FieldKind::ManagedFile {
            let files = json
                .as_array()?
                .iter()
                .map(file_ref_from_json)
                .collect::<Option<Vec<_>>>()?;
            return Some(FieldValue::Files(files));
        }
        Scalar::from_json(json).map(FieldValue::Scalar)
    }
}

fn file_ref_from_json(json: &serde_json::Value) -> Option<FileRef> {
    let object = json.as_object()?;
    if object.contains_key("id") || object.contains_key("fid") {
        return serde_json::from_value(json.clone())
            .ok()
            .map(FileRef::Uploaded);
    }
    let name = object.get("name")?.as_str()?.to_string();
    Some(FileRef::Pending(PendingFile {
        name,
        size: object.get("size").and_then(|v| v.as_u64()).unwrap_or(0),
        mime_type: object
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("application/octet-stream")
            .to_string(),
        bytes: Vec::new(),
    }))
}
