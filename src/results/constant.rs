use std::borrow::Cow;

use serde_json::Value;

use super::{ResultKind, ResultOps};
use crate::error::{Result, ResultError};

/// A value fixed at construction. Reads ignore their location and writes
/// only succeed for the value already held.
///
/// `null` is a legitimate constant, not an absent result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstantResult {
    value: Value,
}

impl ConstantResult {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl ResultOps for ConstantResult {
    fn kind(&self) -> ResultKind {
        ResultKind::Constant
    }

    fn value(&self) -> Option<&Value> {
        Some(&self.value)
    }

    fn location(&self) -> &str {
        ""
    }

    fn read(&self, _location: &str) -> Result<Cow<'_, Self>> {
        Ok(Cow::Borrowed(self))
    }

    fn write(&self, value: Value) -> Result<Cow<'_, Self>> {
        if value != self.value {
            tracing::debug!(stored = %self.value, attempted = %value, "Rejected write to constant result");
            return Err(ResultError::ImmutableWrite);
        }
        Ok(Cow::Borrowed(self))
    }

    fn exists(&self, _location: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_same_value_returns_self() {
        let result = ConstantResult::new("constant value");
        let output = result.write(json!("constant value")).unwrap();
        assert!(std::ptr::eq(output.as_ref(), &result));
        assert_eq!(output.value(), Some(&json!("constant value")));
    }

    #[test]
    fn test_write_compares_structurally() {
        let result = ConstantResult::new(json!({"a": [1, 2]}));
        assert!(result.write(json!({"a": [1, 2]})).is_ok());
        assert!(matches!(
            result.write(json!({"a": [2, 1]})),
            Err(ResultError::ImmutableWrite)
        ));
    }
}
