use serde_json::{Map, Value};

use crate::errors::{WhippyError, WhippyResult};

/// A `data`/`params` argument as the caller supplied it: a JSON object or a string holding one.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Absent,
    Object(Map<String, Value>),
    Text(String),
    /// Any other JSON shape. Always rejected by [`RawInput::normalize`].
    Other(Value),
}

impl Default for RawInput {
    fn default() -> Self {
        RawInput::Absent
    }
}

impl From<Option<Value>> for RawInput {
    fn from(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawInput::Absent,
            Some(Value::Object(map)) => RawInput::Object(map),
            Some(Value::String(text)) => RawInput::Text(text),
            Some(other) => RawInput::Other(other),
        }
    }
}

impl From<Map<String, Value>> for RawInput {
    fn from(map: Map<String, Value>) -> Self {
        RawInput::Object(map)
    }
}

impl From<&str> for RawInput {
    fn from(text: &str) -> Self {
        RawInput::Text(text.to_string())
    }
}

impl RawInput {
    /// Resolves to a canonical map. `field` names the argument in error messages.
    pub fn normalize(self, field: &'static str) -> WhippyResult<Option<Map<String, Value>>> {
        match self {
            RawInput::Absent => Ok(None),
            RawInput::Object(map) => Ok(Some(map)),
            RawInput::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => Ok(Some(map)),
                Ok(other) => Err(WhippyError::InvalidJson {
                    field,
                    details: format!("expected a JSON object, got {}", type_name(&other)),
                    provided: text,
                }),
                Err(e) => Err(WhippyError::InvalidJson {
                    field,
                    details: e.to_string(),
                    provided: text,
                }),
            },
            RawInput::Other(value) => Err(WhippyError::InvalidType {
                field,
                type_name: type_name(&value),
                provided: value.to_string(),
            }),
        }
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_and_object_forms_normalize_identically() {
        let from_text = RawInput::from(r#"{"limit": 5}"#).normalize("params").unwrap();
        let from_object = RawInput::from(Some(json!({ "limit": 5 })))
            .normalize("params")
            .unwrap();
        assert_eq!(from_text, from_object);
    }

    #[test]
    fn null_is_absent() {
        assert_eq!(RawInput::from(Some(Value::Null)), RawInput::Absent);
        assert_eq!(RawInput::Absent.normalize("data").unwrap(), None);
    }

    #[test]
    fn malformed_text_echoes_original() {
        let err = RawInput::from("{not json").normalize("data").unwrap_err();
        let value = err.to_value();
        assert!(value["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON in data parameter: "));
        assert_eq!(value["provided_data"], "{not json");
    }

    #[test]
    fn text_holding_an_array_is_rejected() {
        let err = RawInput::from("[1, 2]").normalize("params").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid JSON in params parameter: expected a JSON object, got array"
        );
    }

    #[test]
    fn wrong_type_reports_type_name() {
        let err = RawInput::from(Some(json!(42))).normalize("params").unwrap_err();
        assert_eq!(
            err.to_value(),
            json!({
                "error": "Params parameter must be a dictionary or JSON string, got integer",
                "provided_params": "42"
            })
        );
    }
}
