//! Declarative tool schemas presented to completion providers.
//!
//! ```rust
//! use pprovider::{ParamKind, ParameterSpec, ToolSchema};
//! use serde_json::json;
//!
//! let schema = ToolSchema::new("search_web", "Search the internet")
//!     .parameter(ParameterSpec::required("query", ParamKind::String, "Search query"))
//!     .parameter(
//!         ParameterSpec::optional("num_results", ParamKind::Integer, "Result count")
//!             .with_default(json!(5)),
//!     );
//!
//! let exported = serde_json::to_value(&schema).expect("schema should serialize");
//! let restored: ToolSchema = serde_json::from_value(exported).expect("schema should parse");
//! assert_eq!(restored, schema);
//! assert_eq!(schema.to_json_schema()["required"], json!(["query"]));
//! ```

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

impl Display for ParamKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element constraint for `array` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub kind: ParamKind,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    #[serde(default)]
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemSpec>,
}

impl ParameterSpec {
    pub fn new(
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required,
            default: None,
            allowed: Vec::new(),
            items: None,
        }
    }

    pub fn required(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self::new(name, kind, description, true)
    }

    pub fn optional(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self::new(name, kind, description, false)
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_allowed<I, V>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = allowed.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_items(mut self, kind: ParamKind) -> Self {
        self.items = Some(ItemSpec {
            kind,
            allowed: Vec::new(),
        });
        self
    }

    pub fn with_item_allowed<I, V>(mut self, kind: ParamKind, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.items = Some(ItemSpec {
            kind,
            allowed: allowed.into_iter().map(Into::into).collect(),
        });
        self
    }

    fn to_json_property(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".to_string(), json!(self.kind.as_str()));
        if !self.description.is_empty() {
            property.insert("description".to_string(), json!(self.description));
        }

        if let Some(default) = &self.default {
            property.insert("default".to_string(), default.clone());
        }

        if !self.allowed.is_empty() {
            property.insert("enum".to_string(), Value::Array(self.allowed.clone()));
        }

        if let Some(items) = &self.items {
            let mut item = Map::new();
            item.insert("type".to_string(), json!(items.kind.as_str()));
            if !items.allowed.is_empty() {
                item.insert("enum".to_string(), Value::Array(items.allowed.clone()));
            }
            property.insert("items".to_string(), Value::Object(item));
        }

        Value::Object(property)
    }
}

/// A tool's name, description, and parameter list. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn find_parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    /// Renders the parameter list as a JSON Schema object for provider wire formats.
    pub fn to_json_schema(&self) -> Value {
        let properties = self
            .parameters
            .iter()
            .map(|parameter| (parameter.name.clone(), parameter.to_json_property()))
            .collect::<Map<_, _>>();

        let required = self
            .parameters
            .iter()
            .filter(|parameter| parameter.required)
            .map(|parameter| json!(parameter.name))
            .collect::<Vec<_>>();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis_schema() -> ToolSchema {
        ToolSchema::new("analyze", "Analyze data")
            .parameter(
                ParameterSpec::required("data_types", ParamKind::Array, "Data types")
                    .with_item_allowed(ParamKind::String, ["diet", "weight"]),
            )
            .parameter(
                ParameterSpec::optional("analysis_type", ParamKind::String, "")
                    .with_allowed(["summary", "trends"])
                    .with_default(json!("summary")),
            )
    }

    #[test]
    fn json_schema_lists_required_and_constraints() {
        let rendered = analysis_schema().to_json_schema();

        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["data_types"]));
        assert_eq!(
            rendered["properties"]["data_types"]["items"]["enum"],
            json!(["diet", "weight"])
        );
        assert_eq!(rendered["properties"]["analysis_type"]["default"], "summary");
        assert!(rendered["properties"]["analysis_type"].get("description").is_none());
    }

    #[test]
    fn export_keeps_enum_and_default_fields() {
        let exported = serde_json::to_value(analysis_schema()).expect("schema should serialize");
        let parameter = &exported["parameters"][1];

        assert_eq!(parameter["name"], "analysis_type");
        assert_eq!(parameter["kind"], "string");
        assert_eq!(parameter["required"], false);
        assert_eq!(parameter["enum"], json!(["summary", "trends"]));
        assert_eq!(parameter["default"], "summary");
    }

    #[test]
    fn integer_kind_rejects_fractional_numbers() {
        assert!(ParamKind::Integer.accepts(&json!(3)));
        assert!(!ParamKind::Integer.accepts(&json!(3.5)));
        assert!(ParamKind::Number.accepts(&json!(3.5)));
        assert!(!ParamKind::Object.accepts(&json!([])));
    }
}
