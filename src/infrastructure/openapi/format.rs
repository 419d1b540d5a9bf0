//! Document format detection and decoding

use serde_json::Value as JsonValue;

use crate::analysis::SpecError;

/// Serialization format of an OpenAPI document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    /// Try JSON first, then YAML
    Unknown,
}

impl DocumentFormat {
    /// Detect from an optional content type, then from the source extension
    pub fn detect(source: &str, content_type: Option<&str>) -> Self {
        let content_type = content_type.unwrap_or_default();
        if content_type.contains("json") || source.ends_with(".json") {
            DocumentFormat::Json
        } else if content_type.contains("yaml")
            || content_type.contains("yml")
            || source.ends_with(".yaml")
            || source.ends_with(".yml")
        {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Unknown
        }
    }

    /// Decode `content` into a JSON tree
    pub fn decode(self, content: &str) -> Result<JsonValue, SpecError> {
        match self {
            DocumentFormat::Json => Ok(serde_json::from_str(content)?),
            DocumentFormat::Yaml => parse_yaml(content)
                .map_err(|e| SpecError::ParseError(format!("Failed to parse YAML: {e}"))),
            DocumentFormat::Unknown => serde_json::from_str(content)
                .or_else(|_| parse_yaml(content))
                .map_err(|e| {
                    SpecError::ParseError(format!("Failed to parse OpenAPI document: {e}"))
                }),
        }
    }
}

/// Parse YAML into a JSON tree.
///
/// Mapping keys that are not strings (`200:` response codes) are stringified.
pub fn parse_yaml(content: &str) -> Result<JsonValue, serde_yaml::Error> {
    serde_yaml::from_str::<serde_yaml::Value>(content).map(yaml_to_json)
}

fn yaml_to_json(value: serde_yaml::Value) -> JsonValue {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => JsonValue::Null,
        Yaml::Bool(b) => JsonValue::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(JsonValue::Null, JsonValue::Number)
            }
        }
        Yaml::String(s) => JsonValue::String(s),
        Yaml::Sequence(items) => JsonValue::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => JsonValue::Object(
            map.into_iter()
                .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match yaml_to_json(key) {
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}
