use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;

use super::interpolate::{has_placeholders, render};
use super::{Context, ResultKind, ResultOps};
use crate::error::{Result, ResultError};

/// Pass-through result. Holds a value and a location in memory; nothing is
/// persisted, so `exists` is always false.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseResult {
    value: Option<Value>,
    location: String,
}

impl BaseResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(&self, value: Value) -> Self {
        Self {
            value: Some(value),
            location: self.location.clone(),
        }
    }

    pub fn with_location(&self, location: impl Into<String>) -> Self {
        Self {
            value: self.value.clone(),
            location: location.into(),
        }
    }

    /// Render `${ctx.*}` placeholders in the location.
    pub fn format(&self, ctx: &Context) -> Cow<'_, Self> {
        if !has_placeholders(&self.location) {
            return Cow::Borrowed(self);
        }
        Cow::Owned(self.with_location(render(&self.location, ctx)))
    }
}

impl ResultOps for BaseResult {
    fn kind(&self) -> ResultKind {
        ResultKind::Base
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn read(&self, _location: &str) -> Result<Cow<'_, Self>> {
        Ok(Cow::Borrowed(self))
    }

    fn write(&self, value: Value) -> Result<Cow<'_, Self>> {
        Ok(Cow::Owned(self.with_value(value)))
    }

    fn exists(&self, _location: &str) -> bool {
        false
    }
}

/// A value already known to be plain JSON.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SafeResult {
    value: Option<Value>,
}

impl SafeResult {
    pub fn new(value: Value) -> Self {
        Self { value: Some(value) }
    }

    /// Convert any serializable value, failing if it has no JSON form
    /// (for example a map keyed by tuples).
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| ResultError::schema(format!("value is not JSON-compatible: {e}")))?;
        Ok(Self::new(value))
    }

    pub(crate) fn from_optional(value: Option<Value>) -> Self {
        Self { value }
    }
}

impl ResultOps for SafeResult {
    fn kind(&self) -> ResultKind {
        ResultKind::Safe
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn location(&self) -> &str {
        ""
    }

    fn read(&self, _location: &str) -> Result<Cow<'_, Self>> {
        Ok(Cow::Borrowed(self))
    }

    fn write(&self, value: Value) -> Result<Cow<'_, Self>> {
        Ok(Cow::Owned(Self::new(value)))
    }

    fn exists(&self, _location: &str) -> bool {
        self.value.is_some()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// Sentinel for "the task produced no value". Distinct from a result
/// holding `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoResult;

impl ResultOps for NoResult {
    fn kind(&self) -> ResultKind {
        ResultKind::NoResult
    }

    fn value(&self) -> Option<&Value> {
        None
    }

    fn location(&self) -> &str {
        ""
    }

    fn read(&self, _location: &str) -> Result<Cow<'_, Self>> {
        Ok(Cow::Borrowed(self))
    }

    fn write(&self, _value: Value) -> Result<Cow<'_, Self>> {
        Ok(Cow::Borrowed(self))
    }

    fn exists(&self, _location: &str) -> bool {
        false
    }

    fn is_safe(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_base_write_keeps_location() {
        let base = BaseResult::new().with_location("out/${ctx.task}.json");
        let written = base.write(json!(7)).unwrap();
        assert_eq!(written.value(), Some(&json!(7)));
        assert_eq!(written.location(), "out/${ctx.task}.json");
        assert!(base.value().is_none());
    }

    #[test]
    fn test_base_format_without_placeholders_is_identity() {
        let base = BaseResult::new().with_location("fixed.json");
        let formatted = base.format(&HashMap::new());
        assert!(matches!(formatted, Cow::Borrowed(_)));
    }

    #[test]
    fn test_safe_from_serializable_rejects_non_string_keys() {
        let mut map = HashMap::new();
        map.insert((1, 2), "pair");
        assert!(matches!(
            SafeResult::from_serializable(&map),
            Err(ResultError::Schema(_))
        ));
    }

    #[test]
    fn test_no_result_ignores_writes() {
        let written = NoResult.write(json!(1)).unwrap();
        assert!(written.value().is_none());
        assert!(!NoResult.exists("anything"));
    }
}
