//! Argument validation against tool parameter specs, plus JSON parsing helpers.
//!
//! ```rust
//! use pprovider::{ParamKind, ParameterSpec, ToolSchema};
//! use ptooling::{required_string, validate_arguments};
//! use serde_json::json;
//!
//! let schema = ToolSchema::new("search_web", "Search")
//!     .parameter(ParameterSpec::required("query", ParamKind::String, "Query"))
//!     .parameter(ParameterSpec::optional("num_results", ParamKind::Integer, "").with_default(json!(5)));
//!
//! let args = json!({"query": "rust"}).as_object().cloned().expect("object");
//! let validated = validate_arguments(&schema, &args).expect("arguments should validate");
//! assert_eq!(required_string(&validated, "query").expect("query"), "rust");
//! assert_eq!(validated["num_results"], json!(5));
//! ```

use pprovider::{ParameterSpec, ToolSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ToolError;

/// Checks required fields, kinds, and enum membership, then fills in declared defaults.
/// Arguments not named by the schema pass through untouched.
pub fn validate_arguments(
    schema: &ToolSchema,
    args: &Map<String, Value>,
) -> Result<Map<String, Value>, ToolError> {
    let mut validated = args.clone();

    for parameter in &schema.parameters {
        match args.get(&parameter.name) {
            Some(value) if !value.is_null() => validate_value(parameter, value)?,
            _ => {
                if let Some(default) = &parameter.default {
                    validated.insert(parameter.name.clone(), default.clone());
                } else if parameter.required {
                    return Err(ToolError::invalid_arguments(format!(
                        "missing required argument: '{}'",
                        parameter.name
                    )));
                }
            }
        }
    }

    Ok(validated)
}

fn validate_value(parameter: &ParameterSpec, value: &Value) -> Result<(), ToolError> {
    if !parameter.kind.accepts(value) {
        return Err(ToolError::invalid_arguments(format!(
            "argument '{}' must be of type {}",
            parameter.name, parameter.kind
        )));
    }

    if !parameter.allowed.is_empty() && !parameter.allowed.contains(value) {
        return Err(ToolError::invalid_arguments(format!(
            "argument '{}' must be one of {}",
            parameter.name,
            render_allowed(&parameter.allowed)
        )));
    }

    if let (Some(items), Some(elements)) = (&parameter.items, value.as_array()) {
        for element in elements {
            if !items.kind.accepts(element) {
                return Err(ToolError::invalid_arguments(format!(
                    "items of '{}' must be of type {}",
                    parameter.name, items.kind
                )));
            }

            if !items.allowed.is_empty() && !items.allowed.contains(element) {
                return Err(ToolError::invalid_arguments(format!(
                    "items of '{}' must be one of {}",
                    parameter.name,
                    render_allowed(&items.allowed)
                )));
            }
        }
    }

    Ok(())
}

fn render_allowed(allowed: &[Value]) -> String {
    let rendered = allowed.iter().map(Value::to_string).collect::<Vec<_>>();
    format!("[{}]", rendered.join(", "))
}

pub fn parse_arguments<T>(args: &Map<String, Value>) -> Result<T, ToolError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|err| ToolError::invalid_arguments(format!("invalid arguments: {err}")))
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

#[cfg(test)]
mod tests {
    use pprovider::ParamKind;
    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;

    fn schema() -> ToolSchema {
        ToolSchema::new("analyze_user_health_data", "Analyze")
            .parameter(ParameterSpec::required("user_id", ParamKind::Integer, "User"))
            .parameter(
                ParameterSpec::required("data_types", ParamKind::Array, "Types")
                    .with_item_allowed(ParamKind::String, ["activities", "diet", "all"]),
            )
            .parameter(
                ParameterSpec::optional("analysis_type", ParamKind::String, "Kind")
                    .with_allowed(["trends", "summary"])
                    .with_default(json!("summary")),
            )
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn defaults_are_applied_and_extras_kept() {
        let validated = validate_arguments(
            &schema(),
            &args(json!({"user_id": 7, "data_types": ["diet"], "note": "x"})),
        )
        .expect("arguments should validate");

        assert_eq!(validated["analysis_type"], "summary");
        assert_eq!(validated["note"], "x");
    }

    #[test]
    fn missing_required_and_wrong_kind_are_rejected() {
        let error = validate_arguments(&schema(), &args(json!({"data_types": []})))
            .expect_err("user_id is required");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
        assert!(error.message.contains("user_id"));

        let error = validate_arguments(
            &schema(),
            &args(json!({"user_id": "seven", "data_types": []})),
        )
        .expect_err("user_id must be an integer");
        assert!(error.message.contains("integer"));
    }

    #[test]
    fn enum_violations_are_rejected_for_values_and_items() {
        let error = validate_arguments(
            &schema(),
            &args(json!({"user_id": 1, "data_types": ["diet"], "analysis_type": "vibes"})),
        )
        .expect_err("analysis_type enum");
        assert!(error.message.contains("analysis_type"));

        let error = validate_arguments(
            &schema(),
            &args(json!({"user_id": 1, "data_types": ["sleep"]})),
        )
        .expect_err("data_types item enum");
        assert!(error.message.contains("data_types"));
    }

    #[test]
    fn null_counts_as_absent() {
        let error = validate_arguments(
            &schema(),
            &args(json!({"user_id": null, "data_types": ["all"]})),
        )
        .expect_err("null required argument");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
    }
}
