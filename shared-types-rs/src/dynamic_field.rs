// shared-types-rs/src/dynamic_field.rs
// Open-ended fields the analysis backend introduces at runtime.
//
// Wire shape: {"key": "...", "type": "string" | "array", "value": ..., "is_confirmed": bool}
// In memory the value is a typed variant; the declared `type` is derived from it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder the backend uses for values it has not filled in yet.
pub const PLACEHOLDER_VALUE: &str = "TBD";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DynamicFieldError {
    #[error("dynamic field key must not be empty")]
    EmptyKey,

    #[error("dynamic field '{key}' has an unsupported value: {kind}")]
    UnsupportedValue { key: String, kind: &'static str },
}

/// Declared type of a dynamic field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Array,
}

impl FieldType {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => Some(FieldType::String),
            "array" | "list" => Some(FieldType::Array),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Array => "array",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicValue {
    Text(String),
    List(Vec<String>),
}

impl DynamicValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            DynamicValue::Text(_) => FieldType::String,
            DynamicValue::List(_) => FieldType::Array,
        }
    }

    /// Coerce the value toward a declared type.
    fn coerce(self, declared: FieldType) -> Self {
        match (self, declared) {
            (DynamicValue::Text(text), FieldType::Array) => DynamicValue::List(vec![text]),
            (DynamicValue::List(items), FieldType::String) => DynamicValue::Text(items.join(", ")),
            (value, _) => value,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            DynamicValue::Text(text) => Value::String(text.clone()),
            DynamicValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl Default for DynamicValue {
    fn default() -> Self {
        DynamicValue::Text(PLACEHOLDER_VALUE.to_string())
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for DynamicValue {
    fn from(value: Vec<String>) -> Self {
        DynamicValue::List(value)
    }
}

/// A single runtime-defined field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDynamicField", into = "RawDynamicField")]
pub struct DynamicField {
    pub key: String,
    pub value: DynamicValue,
    pub confirmed: bool,
}

impl DynamicField {
    pub fn new(key: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            confirmed: false,
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDynamicField {
    key: String,
    #[serde(rename = "type", default)]
    field_type: Option<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    is_confirmed: Option<bool>,
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl TryFrom<RawDynamicField> for DynamicField {
    type Error = DynamicFieldError;

    fn try_from(raw: RawDynamicField) -> Result<Self, Self::Error> {
        let key = raw.key.trim().to_string();
        if key.is_empty() {
            return Err(DynamicFieldError::EmptyKey);
        }

        let value = match raw.value {
            None | Some(Value::Null) => DynamicValue::default(),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in &items {
                    match scalar_to_string(item) {
                        Some(s) => out.push(s),
                        None => {
                            return Err(DynamicFieldError::UnsupportedValue {
                                key,
                                kind: "nested list or object inside array",
                            })
                        }
                    }
                }
                DynamicValue::List(out)
            }
            Some(Value::Object(_)) => {
                return Err(DynamicFieldError::UnsupportedValue { key, kind: "object" })
            }
            Some(scalar) => match scalar_to_string(&scalar) {
                Some(s) => DynamicValue::Text(s),
                None => DynamicValue::default(),
            },
        };

        let value = match raw.field_type.as_deref().and_then(FieldType::parse) {
            Some(declared) => value.coerce(declared),
            None => value,
        };

        Ok(DynamicField {
            key,
            value,
            confirmed: raw.is_confirmed.unwrap_or(false),
        })
    }
}

impl From<DynamicField> for RawDynamicField {
    fn from(field: DynamicField) -> Self {
        RawDynamicField {
            field_type: Some(field.field_type().as_str().to_string()),
            value: Some(field.value.to_json()),
            is_confirmed: Some(field.confirmed),
            key: field.key,
        }
    }
}

/// Ordered collection of dynamic fields, unique by key.
///
/// Deserialization goes through `upsert`, so a repeated key keeps its first
/// position and its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DynamicField>", into = "Vec<DynamicField>")]
pub struct DynamicFieldSet(Vec<DynamicField>);

impl From<Vec<DynamicField>> for DynamicFieldSet {
    fn from(fields: Vec<DynamicField>) -> Self {
        fields.into_iter().collect()
    }
}

impl From<DynamicFieldSet> for Vec<DynamicField> {
    fn from(set: DynamicFieldSet) -> Self {
        set.0
    }
}

impl DynamicFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&DynamicField> {
        self.0.iter().find(|f| f.key == key)
    }

    /// Replace the field with the same key in place, or append it.
    pub fn upsert(&mut self, field: DynamicField) {
        match self.0.iter_mut().find(|f| f.key == field.key) {
            Some(existing) => *existing = field,
            None => self.0.push(field),
        }
    }

    /// Mark a field confirmed. Returns false when the key is unknown.
    pub fn confirm(&mut self, key: &str) -> bool {
        match self.0.iter_mut().find(|f| f.key == key) {
            Some(field) => {
                field.confirmed = true;
                true
            }
            None => false,
        }
    }

    pub fn confirmed(&self) -> impl Iterator<Item = &DynamicField> {
        self.0.iter().filter(|f| f.confirmed)
    }

    pub fn pending(&self) -> impl Iterator<Item = &DynamicField> {
        self.0.iter().filter(|f| !f.confirmed)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DynamicField> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<DynamicField> for DynamicFieldSet {
    fn from_iter<I: IntoIterator<Item = DynamicField>>(iter: I) -> Self {
        let mut set = DynamicFieldSet::new();
        for field in iter {
            set.upsert(field);
        }
        set
    }
}

impl<'a> IntoIterator for &'a DynamicFieldSet {
    type Item = &'a DynamicField;
    type IntoIter = std::slice::Iter<'a, DynamicField>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
