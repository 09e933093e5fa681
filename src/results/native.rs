use std::borrow::Cow;

use serde_json::Value;

use super::{ResultKind, ResultOps};
use crate::error::Result;

/// Stores a value inside its own location as JSON text.
///
/// Writing `[1, 2]` yields a result whose location is the string `"[1,2]"`;
/// reading that location parses it back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NativeResult {
    value: Option<Value>,
    location: String,
}

impl NativeResult {
    /// A result holding `value` that has not been written yet.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            location: String::new(),
        }
    }

    /// A result pointing at already-encoded text, not yet read.
    pub fn from_location(location: impl Into<String>) -> Self {
        Self {
            value: None,
            location: location.into(),
        }
    }

    fn decode(location: &str) -> Result<Value> {
        Ok(serde_json::from_str(location)?)
    }

    /// Like [`ResultOps::exists`] for a value that may not be text. Only a
    /// string holding encoded JSON is recognised; raw values are not.
    pub fn exists_value(&self, candidate: &Value) -> bool {
        match candidate {
            Value::String(text) => self.exists(text),
            _ => false,
        }
    }
}

impl ResultOps for NativeResult {
    fn kind(&self) -> ResultKind {
        ResultKind::Native
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn read(&self, location: &str) -> Result<Cow<'_, Self>> {
        let value = Self::decode(location)?;
        Ok(Cow::Owned(Self {
            value: Some(value),
            location: location.to_string(),
        }))
    }

    fn write(&self, value: Value) -> Result<Cow<'_, Self>> {
        let location = serde_json::to_string(&value)?;
        Ok(Cow::Owned(Self {
            value: Some(value),
            location,
        }))
    }

    fn exists(&self, location: &str) -> bool {
        match Self::decode(location) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Location is not encoded JSON");
                false
            }
        }
    }

    fn is_safe(&self) -> bool {
        true
    }
}
