//! Checks JSON documents against the catalog shapes.
//!
//! A document conforms when it decodes into the typed shape. Keys the shape
//! does not model are dropped by the decoder; they are reported as
//! warnings rather than errors.
//!
//! The `_str` variants check JSON text, so their errors point at a line and
//! column in that text.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{EventError, EventResult};
use crate::event::{EventSource, Input, LambdaEvent};

/// Result of a conformance check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Name of the shape the document was checked against.
    pub shape: String,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    /// Paths of non-null keys the shape ignored.
    pub ignored: Vec<String>,
}

impl ValidationResult {
    pub fn valid(shape: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
            valid: true,
            errors: vec![],
            ignored: vec![],
        }
    }

    pub fn invalid(shape: impl Into<String>, errors: Vec<ValidationError>) -> Self {
        Self {
            shape: shape.into(),
            valid: false,
            errors,
            ignored: vec![],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn into_result(self) -> EventResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(EventError::ShapeMismatch {
                shape: self.shape,
                message: self
                    .errors
                    .iter()
                    .map(|e| e.message.clone())
                    .collect::<Vec<_>>()
                    .join("; "),
            })
        }
    }
}

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub message: String,
    /// Position in the source text. Only set by the `_str` checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    fn from_serde(err: &serde_json::Error) -> Self {
        let mut error = Self::new(err.to_string());
        if err.line() > 0 {
            error.line = Some(err.line());
            error.column = Some(err.column());
        }
        error
    }
}

/// Checks `value` against the shape `T`.
pub fn check<T>(value: &Value) -> ValidationResult
where
    T: DeserializeOwned + Serialize,
{
    check_input::<T, _>(value, value.clone())
}

/// Checks JSON `text` against the shape `T`.
pub fn check_str<T>(text: &str) -> ValidationResult
where
    T: DeserializeOwned + Serialize,
{
    match serde_json::from_str::<Value>(text) {
        Ok(value) => check_input::<T, _>(&value, text),
        Err(e) => ValidationResult::invalid(short_type_name::<T>(), vec![ValidationError::from_serde(&e)]),
    }
}

fn check_input<T, I>(value: &Value, input: I) -> ValidationResult
where
    T: DeserializeOwned + Serialize,
    I: Input,
{
    let shape = short_type_name::<T>();
    match input.decode::<T>() {
        Ok(decoded) => {
            let mut result = ValidationResult::valid(shape);
            if let Ok(encoded) = serde_json::to_value(&decoded) {
                result.ignored = ignored_keys(value, &encoded);
            }
            result
        }
        Err(e) => {
            debug!(shape, error = %e, "Document does not conform");
            ValidationResult::invalid(shape, vec![ValidationError::from_serde(&e)])
        }
    }
}

/// Checks `value` against the envelope shape of `source`.
pub fn check_source(source: EventSource, value: &Value) -> ValidationResult {
    check_source_input(source, value, value.clone())
}

/// Checks JSON `text` against the envelope shape of `source`.
pub fn check_source_str(source: EventSource, text: &str) -> ValidationResult {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => check_source_input(source, &value, text),
        Err(e) => ValidationResult::invalid(source.as_str(), vec![ValidationError::from_serde(&e)]),
    }
}

fn check_source_input<I: Input>(source: EventSource, value: &Value, input: I) -> ValidationResult {
    match LambdaEvent::decode_input(source, input) {
        Ok(event) => {
            let mut result = ValidationResult::valid(source.as_str());
            if let Ok(encoded) = event.to_value() {
                result.ignored = ignored_keys(value, &encoded);
            }
            result
        }
        Err(e) => {
            debug!(source = %source, error = %e, "Document does not conform");
            ValidationResult::invalid(source.as_str(), vec![ValidationError::from_serde(&e)])
        }
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Lists the non-null keys of `original` that are missing from `encoded`.
fn ignored_keys(original: &Value, encoded: &Value) -> Vec<String> {
    let mut ignored = Vec::new();
    collect_ignored(original, encoded, "", &mut ignored);
    ignored
}

fn collect_ignored(original: &Value, encoded: &Value, path: &str, out: &mut Vec<String>) {
    match (original, encoded) {
        (Value::Object(original), Value::Object(encoded)) => {
            for (key, value) in original {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                match encoded.get(key) {
                    Some(encoded_value) => collect_ignored(value, encoded_value, &child, out),
                    None if !value.is_null() => out.push(child),
                    None => {}
                }
            }
        }
        (Value::Array(original), Value::Array(encoded)) => {
            for (i, (value, encoded_value)) in original.iter().zip(encoded).enumerate() {
                collect_ignored(value, encoded_value, &format!("{path}[{i}]"), out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apigw::ProxyResult;
    use crate::authorizer::CustomAuthorizerEvent;
    use crate::cloudformation::CustomResourceResponse;
    use serde_json::json;

    #[test]
    fn test_check_valid_with_ignored_keys() {
        let result = check::<ProxyResult>(&json!({
            "statusCode": 200,
            "body": "ok",
            "cookies": ["a=1"],
            "extra": null
        }));

        assert!(result.is_valid());
        assert_eq!(result.shape, "ProxyResult");
        assert_eq!(result.ignored, vec!["cookies".to_string()]);
    }

    #[test]
    fn test_check_invalid() {
        let result = check::<CustomResourceResponse>(&json!({
            "Status": "FAILED",
            "PhysicalResourceId": "p",
            "StackId": "s",
            "RequestId": "r",
            "LogicalResourceId": "l"
        }));

        assert!(!result.is_valid());
        assert!(result.errors[0].message.contains("Reason"));
        assert!(matches!(
            result.into_result(),
            Err(EventError::ShapeMismatch { shape, .. }) if shape == "CustomResourceResponse"
        ));
    }

    #[test]
    fn test_check_source() {
        let value = json!({ "awslogs": { "data": "H4sI" } });
        assert!(check_source(EventSource::CloudWatchLogs, &value).is_valid());

        let result = check_source(EventSource::Kinesis, &value);
        assert!(!result.is_valid());
        assert_eq!(result.shape, "kinesis");
        assert_eq!(result.errors[0].line, None);
    }

    #[test]
    fn test_check_source_str_reports_position() {
        let text = r#"{
  "type": "TOKEN",
  "authorizationToken": "allow",
  "methodArn": null
}"#;
        let result = check_source_str(EventSource::CustomAuthorizer, text);
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].line, Some(4));
        assert!(result.errors[0].column.is_some());

        let result = check_source_str(EventSource::CustomAuthorizer, "{ \"type\": ");
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].line, Some(1));
    }

    #[test]
    fn test_check_str_reports_ignored_keys() {
        let text = r#"{ "statusCode": 200, "body": "ok", "cookies": ["a=1"] }"#;
        let result = check_str::<ProxyResult>(text);
        assert!(result.is_valid());
        assert_eq!(result.ignored, vec!["cookies".to_string()]);

        let result = check_str::<CustomAuthorizerEvent>("{\n  \"type\": \"TOKEN\",\n  \"authorizationToken\": 7\n}");
        assert_eq!(result.shape, "CustomAuthorizerEvent");
        assert_eq!(result.errors[0].line, Some(3));
    }
}
