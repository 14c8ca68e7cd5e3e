//! What a task body hands back to the stage runner.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::TaskError;

const EXPECTED_KEYS: [&str; 3] = ["data", "message", "violation"];

/// Return value of a task body.
///
/// - `data`: a JSON object or array, required.
/// - `message`: optional human-readable summary.
/// - `violation`: insights only; ignored for collectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub data: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub violation: bool,
}

impl TaskOutput {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            message: None,
            violation: false,
        }
    }

    /// `{"data": {}}`.
    pub fn empty() -> Self {
        Self::new(Value::Object(Map::new()))
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_violation(mut self, violation: bool) -> Self {
        self.violation = violation;
        self
    }

    /// Build from a raw mapping such as `{"data": {...}, "violation": true}`.
    ///
    /// Unknown keys are tolerated and reported with a warning.
    pub fn from_value(value: Value) -> Result<Self, TaskError> {
        let Value::Object(mut map) = value else {
            return Err(TaskError::MalformedResult(format!(
                "task must return a mapping, got {}",
                type_name(&value)
            )));
        };

        let unexpected: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|k| !EXPECTED_KEYS.contains(k))
            .collect();
        if !unexpected.is_empty() {
            tracing::warn!(?unexpected, expected = ?EXPECTED_KEYS, "unexpected keys in task result");
        }

        let data = map
            .remove("data")
            .ok_or_else(|| TaskError::MalformedResult("result must include 'data'".into()))?;

        let violation = match map.remove("violation") {
            None => false,
            Some(Value::Bool(b)) => b,
            Some(other) => {
                return Err(TaskError::MalformedResult(format!(
                    "'violation' must be a bool, got {}",
                    type_name(&other)
                )));
            }
        };

        let message = match map.remove("message") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                return Err(TaskError::MalformedResult(format!(
                    "'message' must be a string, got {}",
                    type_name(&other)
                )));
            }
        };

        let output = Self {
            data,
            message,
            violation,
        };
        output.validate()?;
        Ok(output)
    }

    /// `data` must be an object or an array.
    pub fn validate(&self) -> Result<(), TaskError> {
        match &self.data {
            Value::Object(_) | Value::Array(_) => Ok(()),
            other => Err(TaskError::MalformedResult(format!(
                "'data' must be a mapping or a list, got {}",
                type_name(other)
            ))),
        }
    }
}

impl TryFrom<Value> for TaskOutput {
    type Error = TaskError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn from_value_reads_all_fields() {
        let out = TaskOutput::from_value(json!({
            "data": {"items": ["a"]},
            "violation": true,
            "message": "m",
        }))
        .unwrap();
        assert_eq!(out.data, json!({"items": ["a"]}));
        assert_eq!(out.message.as_deref(), Some("m"));
        assert!(out.violation);
    }

    #[test]
    fn violation_and_message_are_optional() {
        let out = TaskOutput::from_value(json!({"data": [1, 2]})).unwrap();
        assert!(!out.violation);
        assert_eq!(out.message, None);

        let out = TaskOutput::from_value(json!({"data": {}, "message": null})).unwrap();
        assert_eq!(out.message, None);
    }

    #[test]
    fn unexpected_keys_are_tolerated() {
        let out = TaskOutput::from_value(json!({"data": {}, "extra": 1})).unwrap();
        assert_eq!(out, TaskOutput::empty());
    }

    #[rstest]
    #[case::not_a_mapping(json!([1]))]
    #[case::missing_data(json!({"message": "m"}))]
    #[case::scalar_data(json!({"data": 5}))]
    #[case::string_violation(json!({"data": {}, "violation": "yes"}))]
    #[case::null_violation(json!({"data": {}, "violation": null}))]
    #[case::numeric_message(json!({"data": {}, "message": 3}))]
    fn malformed_results_are_rejected(#[case] value: Value) {
        let err = TaskOutput::from_value(value).unwrap_err();
        assert!(matches!(err, TaskError::MalformedResult(_)));
    }

    #[test]
    fn builder_output_validates_data_shape() {
        assert!(TaskOutput::new(json!({"a": 1})).validate().is_ok());
        assert!(TaskOutput::new(json!("text")).validate().is_err());
    }
}
