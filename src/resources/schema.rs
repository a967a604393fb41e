use serde::Serialize;
use serde_json::Value;

use crate::database::Record;

/// Value kinds a catalog field may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string
    Text,
    /// Identifier of a row in the named collection of the same store
    Reference(&'static str),
    Number,
    Boolean,
}

/// Declarative description of one request field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// JSON key and column name
    pub name: &'static str,
    /// Human label used in validation messages
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind: FieldKind::Text, required: true }
    }

    /// Identifier of a row in `collection`, e.g. "billboards"
    pub const fn reference(name: &'static str, label: &'static str, collection: &'static str) -> Self {
        Self { name, label, kind: FieldKind::Reference(collection), required: true }
    }

    pub const fn number(name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind: FieldKind::Number, required: true }
    }

    /// Booleans are optional and default to `false`.
    pub const fn boolean(name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind: FieldKind::Boolean, required: false }
    }

    /// Collection this field points into, if it is a reference
    pub fn references(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::Reference(collection) => Some(collection),
            _ => None,
        }
    }
}

/// One failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn required(field: impl Into<String>, label: &str) -> Self {
        Self {
            field: field.into(),
            message: format!("{} is required", label),
        }
    }

    fn wrong_kind(spec: &FieldSpec) -> Self {
        let expected = match spec.kind {
            FieldKind::Text | FieldKind::Reference(_) => "a string",
            FieldKind::Number => "a number",
            FieldKind::Boolean => "true or false",
        };
        Self {
            field: spec.name.to_string(),
            message: format!("{} must be {}", spec.label, expected),
        }
    }
}

/// Check `body` against `fields`, returning the accepted values or every violation found.
///
/// Keys not named by the schema are dropped, so callers can never smuggle in
/// `id`, `storeId` or timestamps. Optional booleans that are absent are filled
/// with `false`; other absent optional fields are left out.
pub fn validate(fields: &[FieldSpec], body: &Value) -> Result<Record, Vec<FieldViolation>> {
    let empty = Record::new();
    let object = body.as_object().unwrap_or(&empty);

    let mut accepted = Record::new();
    let mut violations = Vec::new();

    for spec in fields {
        match (spec.kind, object.get(spec.name)) {
            (_, None) | (_, Some(Value::Null)) => {
                if spec.required {
                    violations.push(FieldViolation::required(spec.name, spec.label));
                } else if spec.kind == FieldKind::Boolean {
                    accepted.insert(spec.name.to_string(), Value::Bool(false));
                }
            }
            (FieldKind::Text | FieldKind::Reference(_), Some(Value::String(s))) => {
                if s.trim().is_empty() {
                    if spec.required {
                        violations.push(FieldViolation::required(spec.name, spec.label));
                    }
                } else {
                    accepted.insert(spec.name.to_string(), Value::String(s.clone()));
                }
            }
            (FieldKind::Number, Some(v @ Value::Number(_))) => {
                accepted.insert(spec.name.to_string(), v.clone());
            }
            (FieldKind::Boolean, Some(v @ Value::Bool(_))) => {
                accepted.insert(spec.name.to_string(), v.clone());
            }
            (_, Some(_)) => violations.push(FieldViolation::wrong_kind(spec)),
        }
    }

    if violations.is_empty() {
        Ok(accepted)
    } else {
        Err(violations)
    }
}
