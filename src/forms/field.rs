//! Form field descriptors and per-field validation

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::infrastructure::openapi::{PrimitiveType, SchemaNode};

/// Strings with a larger `maxLength` are edited as long text
pub const LONG_TEXT_THRESHOLD: u64 = 200;

/// Where a field's value ends up in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSection {
    Path,
    Query,
    Body,
}

impl FieldSection {
    pub fn prefix(&self) -> &'static str {
        match self {
            FieldSection::Path => "__path_",
            FieldSection::Query => "__query_",
            FieldSection::Body => "__body_",
        }
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix())
    }

    /// Split a form key into its section and field name
    pub fn parse_key(key: &str) -> Option<(FieldSection, &str)> {
        [FieldSection::Path, FieldSection::Query, FieldSection::Body]
            .into_iter()
            .find_map(|section| key.strip_prefix(section.prefix()).map(|name| (section, name)))
    }
}

impl std::str::FromStr for FieldSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "path" => Ok(FieldSection::Path),
            "query" => Ok(FieldSection::Query),
            "body" => Ok(FieldSection::Body),
            other => Err(format!("unknown form section '{other}'")),
        }
    }
}

/// Input widget a field maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Enum,
    Boolean,
    Number,
    LongText,
    Text,
}

impl FieldKind {
    /// Kind of a resolved schema: enum, boolean, number, long text, then text
    pub fn for_schema(schema: &SchemaNode) -> Self {
        if schema.enum_values().is_some_and(|values| !values.is_empty()) {
            FieldKind::Enum
        } else if schema.is_boolean() {
            FieldKind::Boolean
        } else if schema.is_numeric() {
            FieldKind::Number
        } else if schema
            .facets()
            .and_then(|f| f.max_length)
            .is_some_and(|max| max > LONG_TEXT_THRESHOLD)
        {
            FieldKind::LongText
        } else {
            FieldKind::Text
        }
    }
}

/// `null`, missing and `""` are empty; `false`, `0` and `[]` are values
pub fn is_empty_value(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// One input of a generated form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub key: String,
    pub name: String,
    pub label: String,
    pub section: FieldSection,
    pub kind: FieldKind,
    pub required: bool,
    pub default: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Declared `integer` rather than `number`
    #[serde(skip)]
    pub integer: bool,
}

impl FormField {
    /// Field for a resolved schema; `name` and `label` are filled by the caller
    pub(crate) fn from_schema(
        section: FieldSection,
        name: &str,
        label: String,
        schema: &SchemaNode,
        required: bool,
        default: JsonValue,
    ) -> Self {
        let facets = schema.facets();
        let kind = FieldKind::for_schema(schema);

        Self {
            key: section.key(name),
            name: name.to_string(),
            label,
            section,
            kind,
            required,
            default,
            placeholder: None,
            description: facets.and_then(|f| f.description.clone()),
            options: schema.enum_values().map(<[_]>::to_vec).unwrap_or_default(),
            minimum: facets.and_then(|f| f.minimum),
            maximum: facets.and_then(|f| f.maximum),
            integer: schema.primitive_type() == Some(PrimitiveType::Integer),
        }
    }

    pub(crate) fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// First validation failure of `value`, if any
    pub fn validate(&self, value: Option<&JsonValue>) -> Option<String> {
        let empty = is_empty_value(value);

        if empty {
            let must_fill = self.section == FieldSection::Path
                || (self.required && self.kind != FieldKind::Boolean);
            return must_fill.then(|| format!("{} is required", self.label));
        }
        let value = value?;

        match self.kind {
            FieldKind::Number => self.validate_number(value),
            FieldKind::Enum if !self.options.iter().any(|o| same_option(o, value)) => {
                Some(format!(
                    "Must be one of: {}",
                    self.options
                        .iter()
                        .map(display_value)
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            }
            _ => None,
        }
    }

    fn validate_number(&self, value: &JsonValue) -> Option<String> {
        let Some(number) = numeric_value(value) else {
            return Some("Must be a valid number".to_string());
        };
        if let Some(min) = self.minimum.filter(|min| number < *min) {
            return Some(format!("Must be at least {}", display_number(min)));
        }
        if let Some(max) = self.maximum.filter(|max| number > *max) {
            return Some(format!("Must be at most {}", display_number(max)));
        }
        None
    }

    /// Convert string input to the JSON type the field expects
    pub(crate) fn coerce(&self, value: JsonValue) -> JsonValue {
        let JsonValue::String(text) = &value else {
            return value;
        };
        let text = text.trim();
        match self.kind {
            FieldKind::Number if !text.is_empty() => {
                if let Ok(int) = text.parse::<i64>() {
                    return JsonValue::from(int);
                }
                text.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .unwrap_or(value)
            }
            FieldKind::Boolean => match text {
                "true" => JsonValue::Bool(true),
                "false" => JsonValue::Bool(false),
                _ => value,
            },
            _ => value,
        }
    }
}

fn numeric_value(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn same_option(option: &JsonValue, value: &JsonValue) -> bool {
    option == value || display_value(option) == display_value(value)
}

/// Text of a JSON value without quotes around strings
pub fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(kind_schema: JsonValue, section: FieldSection, required: bool) -> FormField {
        let schema = SchemaNode::from_value(&kind_schema);
        FormField::from_schema(
            section,
            "age",
            "Age".to_string(),
            &schema,
            required,
            JsonValue::Null,
        )
    }

    #[test]
    fn test_kind_dispatch_order() {
        let kind = |v: JsonValue| FieldKind::for_schema(&SchemaNode::from_value(&v));
        assert_eq!(kind(json!({ "type": "string", "enum": ["A", "B"] })), FieldKind::Enum);
        assert_eq!(kind(json!({ "type": "integer", "enum": [1, 2] })), FieldKind::Enum);
        assert_eq!(kind(json!({ "type": "boolean" })), FieldKind::Boolean);
        assert_eq!(kind(json!({ "type": "number" })), FieldKind::Number);
        assert_eq!(kind(json!({ "type": "integer" })), FieldKind::Number);
        assert_eq!(kind(json!({ "type": "string", "maxLength": 201 })), FieldKind::LongText);
        assert_eq!(kind(json!({ "type": "string", "maxLength": 200 })), FieldKind::Text);
        assert_eq!(kind(json!({ "type": "array", "items": {} })), FieldKind::Text);
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(
            FieldSection::parse_key("__path_userId"),
            Some((FieldSection::Path, "userId"))
        );
        assert_eq!(
            FieldSection::parse_key("__body_name"),
            Some((FieldSection::Body, "name"))
        );
        assert_eq!(FieldSection::parse_key("name"), None);
    }

    #[test]
    fn test_empty_values() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&json!(null))));
        assert!(is_empty_value(Some(&json!(""))));
        assert!(!is_empty_value(Some(&json!(false))));
        assert!(!is_empty_value(Some(&json!(0))));
        assert!(!is_empty_value(Some(&json!([]))));
    }

    #[test]
    fn test_number_validation() {
        let f = field(
            json!({ "type": "integer", "minimum": 1, "maximum": 10 }),
            FieldSection::Body,
            false,
        );
        assert_eq!(f.validate(None), None);
        assert_eq!(f.validate(Some(&json!("abc"))).as_deref(), Some("Must be a valid number"));
        assert_eq!(f.validate(Some(&json!("0"))).as_deref(), Some("Must be at least 1"));
        assert_eq!(f.validate(Some(&json!(11))).as_deref(), Some("Must be at most 10"));
        assert_eq!(f.validate(Some(&json!("5"))), None);
    }

    #[test]
    fn test_required_validation() {
        let f = field(json!({ "type": "string" }), FieldSection::Body, true);
        assert_eq!(f.validate(Some(&json!(""))).as_deref(), Some("Age is required"));

        let flag = field(json!({ "type": "boolean" }), FieldSection::Body, true);
        assert_eq!(flag.validate(None), None);

        let path = field(json!({ "type": "string" }), FieldSection::Path, false);
        assert!(path.validate(Some(&json!(null))).is_some());
    }

    #[test]
    fn test_enum_validation() {
        let f = field(
            json!({ "type": "string", "enum": ["USER", "SUPERUSER"] }),
            FieldSection::Body,
            false,
        );
        assert_eq!(f.validate(Some(&json!("USER"))), None);
        assert_eq!(
            f.validate(Some(&json!("ROOT"))).as_deref(),
            Some("Must be one of: USER, SUPERUSER")
        );
    }

    #[test]
    fn test_coerce() {
        let number = field(json!({ "type": "number" }), FieldSection::Body, false);
        assert_eq!(number.coerce(json!("42")), json!(42));
        assert_eq!(number.coerce(json!("2.5")), json!(2.5));
        assert_eq!(number.coerce(json!("")), json!(""));
        assert_eq!(number.coerce(json!("abc")), json!("abc"));

        let flag = field(json!({ "type": "boolean" }), FieldSection::Query, false);
        assert_eq!(flag.coerce(json!("true")), json!(true));

        let text = field(json!({ "type": "string" }), FieldSection::Body, false);
        assert_eq!(text.coerce(json!("42")), json!("42"));
    }
}
