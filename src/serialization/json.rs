use serde_json::{Map, Number, Value};
use serde_yml::Value as Yaml;

use crate::error::{Result, ResultError};

/// Convert a YAML tree to JSON, rejecting anything JSON cannot represent:
/// non-string mapping keys, non-finite floats and tagged values. Errors
/// name the offending path, e.g. `$.value.items[2]`.
pub fn from_yaml(value: &Yaml) -> Result<Value> {
    convert(value, "$")
}

fn convert(value: &Yaml, path: &str) -> Result<Value> {
    match value {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| {
                        ResultError::schema(format!("{path}: {n} is not a JSON-compatible number"))
                    })
            }
        }
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| convert(item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                let Yaml::String(key) = key else {
                    return Err(ResultError::schema(format!(
                        "{path}: mapping key {key:?} is not a string"
                    )));
                };
                let item = convert(item, &format!("{path}.{key}"))?;
                object.insert(key.clone(), item);
            }
            Ok(Value::Object(object))
        }
        Yaml::Tagged(tagged) => Err(ResultError::schema(format!(
            "{path}: tagged value {} is not JSON-compatible",
            tagged.tag
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Yaml {
        serde_yml::from_str(text).unwrap()
    }

    #[test]
    fn converts_plain_structures() {
        let value = from_yaml(&yaml("a: [1, 2.5, true, null]\nb: {c: text}")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"a": [1, 2.5, true, null], "b": {"c": "text"}})
        );
    }

    #[test]
    fn rejects_integer_keys() {
        let err = from_yaml(&yaml("value:\n  1: one")).unwrap_err();
        assert!(err.to_string().contains("$.value: mapping key"));
    }

    #[test]
    fn rejects_nan() {
        let err = from_yaml(&yaml("value: [.nan]")).unwrap_err();
        assert!(err.to_string().contains("$.value[0]"));
    }

    #[test]
    fn rejects_tags() {
        assert!(from_yaml(&yaml("value: !Point {x: 1}")).is_err());
    }
}
