use serde_json::{Map, Value};

use crate::error::{Result, ResultError};
use crate::results::ResultKind;

/// Discriminator field carried by every wire object.
pub const TYPE_FIELD: &str = "type";

/// Version stamp written on encode and tolerated on decode.
pub const VERSION_FIELD: &str = "__version__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    String,
    /// Any JSON-compatible value.
    Json,
}

/// Declaration of a single wire field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub wire_type: WireType,
    pub nullable: bool,
    pub required: bool,
}

impl FieldSpec {
    /// A required, non-null string.
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            wire_type: WireType::String,
            nullable: false,
            required: true,
        }
    }

    /// An optional, nullable JSON value.
    pub const fn json(name: &'static str) -> Self {
        Self {
            name,
            wire_type: WireType::Json,
            nullable: true,
            required: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            required: false,
            ..self
        }
    }
}

/// Wire fields that passed validation for one codec.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// String field; `None` when absent or null.
    pub fn str(&self, name: &str) -> Option<&'a str> {
        self.map.get(name).and_then(Value::as_str)
    }

    /// Raw field; `Some(Value::Null)` for an explicit null, `None` when absent.
    pub fn value(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name)
    }
}

/// Check `object` against `specs`: no unknown fields, every required field
/// present, every present field of the declared type.
pub fn validate<'a>(
    kind: ResultKind,
    specs: &[FieldSpec],
    object: &'a Map<String, Value>,
) -> Result<Fields<'a>> {
    for name in object.keys() {
        if name == TYPE_FIELD || name == VERSION_FIELD {
            continue;
        }
        if !specs.iter().any(|spec| spec.name == name) {
            return Err(ResultError::schema(format!(
                "{kind}: unknown field '{name}'"
            )));
        }
    }

    for spec in specs {
        match object.get(spec.name) {
            None if spec.required => {
                return Err(ResultError::schema(format!(
                    "{kind}: missing required field '{}'",
                    spec.name
                )));
            }
            None => {}
            Some(Value::Null) if !spec.nullable => {
                return Err(ResultError::schema(format!(
                    "{kind}: field '{}' may not be null",
                    spec.name
                )));
            }
            Some(Value::Null) => {}
            Some(value) => check_type(kind, spec, value)?,
        }
    }

    Ok(Fields { map: object })
}

fn check_type(kind: ResultKind, spec: &FieldSpec, value: &Value) -> Result<()> {
    match spec.wire_type {
        WireType::String if !value.is_string() => Err(ResultError::schema(format!(
            "{kind}: field '{}' must be a string, got {}",
            spec.name,
            type_name(value)
        ))),
        WireType::String | WireType::Json => Ok(()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
