//! Form models derived from request schemas and operation parameters
//!
//! A [`FormModel`] lists one field per path parameter, query parameter and
//! request body property. Values travel as a flat map keyed by form key
//! (`__path_id`, `__query_search`, `__body_name`) and are split back into
//! the three request parts on submit.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use super::errors::{FieldError, FormError};
use super::field::{FieldSection, FormField, is_empty_value};
use crate::analysis::Endpoint;
use crate::analysis::paths::substitute_path;
use crate::core::utils::humanize_field_name;
use crate::infrastructure::openapi::{OpenApiDocument, Parameter, SchemaNode, SchemaResolver};

/// Flat form state keyed by form key
pub type FormValues = Map<String, JsonValue>;

/// A submission split into the parts of an HTTP request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub path_params: Map<String, JsonValue>,
    pub query_params: Map<String, JsonValue>,
    pub body: Map<String, JsonValue>,
}

impl FormSubmission {
    /// Fill `{name}` placeholders of `template` from the path parameters
    pub fn resolve_path(&self, template: &str) -> Result<String, FormError> {
        substitute_path(template, |name| {
            self.path_params
                .get(name)
                .filter(|value| !is_empty_value(Some(value)))
                .map(super::field::display_value)
        })
        .map_err(FormError::MissingPathParameter)
    }

    /// Query parameters as strings, in form order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query_params
            .iter()
            .map(|(name, value)| (name.clone(), super::field::display_value(value)))
            .collect()
    }
}

/// Split flat form values into path, query and body maps.
///
/// Path parameters are always kept, query parameters only when non-empty,
/// and body fields when required or non-empty. Keys without a known prefix
/// are dropped. Values are never rewritten.
pub fn partition_submission(values: &FormValues, required_body: &[String]) -> FormSubmission {
    let mut submission = FormSubmission::default();

    for (key, value) in values {
        match FieldSection::parse_key(key) {
            Some((FieldSection::Path, name)) => {
                submission
                    .path_params
                    .insert(name.to_string(), value.clone());
            }
            Some((FieldSection::Query, name)) => {
                if !is_empty_value(Some(value)) {
                    submission
                        .query_params
                        .insert(name.to_string(), value.clone());
                }
            }
            Some((FieldSection::Body, name)) => {
                if required_body.iter().any(|r| r == name) || !is_empty_value(Some(value)) {
                    submission.body.insert(name.to_string(), value.clone());
                }
            }
            None => debug!(key = %key, "Ignoring value without a form section prefix"),
        }
    }

    submission
}

/// Generated form for one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormModel {
    pub fields: Vec<FormField>,
}

impl FormModel {
    /// Build a form from an optional body schema plus path and query parameters.
    ///
    /// `initial` holds existing values keyed by plain field name (e.g. the
    /// record being edited); it takes precedence over schema defaults.
    pub fn build(
        document: &OpenApiDocument,
        schema: Option<&SchemaNode>,
        path_params: &[String],
        query_params: &[Parameter],
        initial: Option<&JsonValue>,
    ) -> Self {
        let resolver = SchemaResolver::new(document);
        let initial_value = |name: &str| initial.and_then(|data| data.get(name));
        let mut fields = Vec::new();

        for name in path_params {
            let default = initial_value(name)
                .filter(|v| !is_empty_value(Some(v)))
                .cloned()
                .unwrap_or_else(|| JsonValue::String(String::new()));
            fields.push(
                FormField::from_schema(
                    FieldSection::Path,
                    name,
                    name.clone(),
                    &SchemaNode::from_value(&JsonValue::Null),
                    true,
                    default,
                )
                .with_placeholder(format!("Enter {name}")),
            );
        }

        for param in query_params {
            let param_schema = resolver
                .resolve(&param.schema)
                .unwrap_or_else(|| param.schema.clone());
            let default = initial_value(&param.name)
                .filter(|v| !v.is_null())
                .cloned()
                .or_else(|| schema_default(&param_schema))
                .unwrap_or_else(|| {
                    if param_schema.is_boolean() {
                        JsonValue::Bool(false)
                    } else {
                        JsonValue::String(String::new())
                    }
                });
            let placeholder = param
                .description
                .clone()
                .unwrap_or_else(|| format!("Enter {}", param.name));
            fields.push(
                FormField::from_schema(
                    FieldSection::Query,
                    &param.name,
                    param.name.clone(),
                    &param_schema,
                    param.required,
                    default,
                )
                .with_placeholder(placeholder),
            );
        }

        if let Some(schema) = schema {
            let required = resolver.required(schema);
            for (name, property) in resolver.properties(schema).iter() {
                let property = resolver
                    .resolve(property)
                    .unwrap_or_else(|| property.clone());
                let default = initial_value(name)
                    .cloned()
                    .or_else(|| schema_default(&property))
                    .unwrap_or_else(|| {
                        if property.is_boolean() {
                            JsonValue::Bool(false)
                        } else if property.is_array() {
                            JsonValue::Array(Vec::new())
                        } else {
                            JsonValue::String(String::new())
                        }
                    });
                let label = humanize_field_name(name);
                let field = FormField::from_schema(
                    FieldSection::Body,
                    name,
                    label,
                    &property,
                    required.iter().any(|r| r == name),
                    default,
                );
                let placeholder = body_placeholder(&field, &property);
                fields.push(match placeholder {
                    Some(text) => field.with_placeholder(text),
                    None => field,
                });
            }
        }

        Self { fields }
    }

    /// Form for a resource endpoint
    pub fn for_endpoint(
        document: &OpenApiDocument,
        endpoint: &Endpoint,
        initial: Option<&JsonValue>,
    ) -> Self {
        Self::build(
            document,
            endpoint.request_schema.as_ref(),
            &endpoint.path_params,
            &endpoint.query_params,
            initial,
        )
    }

    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn fields_in(&self, section: FieldSection) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(move |f| f.section == section)
    }

    /// Names of required body fields
    pub fn required_body_fields(&self) -> Vec<String> {
        self.fields_in(FieldSection::Body)
            .filter(|f| f.required)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Initial form state
    pub fn defaults(&self) -> FormValues {
        self.fields
            .iter()
            .map(|f| (f.key.clone(), f.default.clone()))
            .collect()
    }

    /// Default state overlaid with `values`; unknown keys are rejected
    pub fn merge(&self, values: &FormValues) -> Result<FormValues, FormError> {
        let mut merged = self.defaults();
        for (key, value) in values {
            if self.field(key).is_none() {
                return Err(FormError::UnknownField(key.clone()));
            }
            merged.insert(key.clone(), value.clone());
        }
        Ok(merged)
    }

    /// Validate every field, collecting all failures in form order
    pub fn validate(&self, values: &FormValues) -> Result<(), FormError> {
        let errors: Vec<FieldError> = self
            .fields
            .iter()
            .filter_map(|field| {
                field
                    .validate(values.get(&field.key))
                    .map(|message| FieldError {
                        key: field.key.clone(),
                        message,
                    })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormError::Invalid(errors))
        }
    }

    /// Merge, validate, coerce and partition `values`.
    ///
    /// On failure nothing is returned and the caller keeps its input.
    pub fn submit(&self, values: &FormValues) -> Result<FormSubmission, FormError> {
        let merged = self.merge(values)?;
        self.validate(&merged)?;

        let coerced: FormValues = merged
            .into_iter()
            .map(|(key, value)| {
                let value = match self.field(&key) {
                    Some(field) => field.coerce(value),
                    None => value,
                };
                (key, value)
            })
            .collect();

        Ok(partition_submission(
            &coerced,
            &self.required_body_fields(),
        ))
    }
}

fn schema_default(schema: &SchemaNode) -> Option<JsonValue> {
    schema.facets()?.default.clone()
}

fn body_placeholder(field: &FormField, schema: &SchemaNode) -> Option<String> {
    use super::field::FieldKind;

    let label = field.label.to_lowercase();
    match field.kind {
        FieldKind::Boolean => None,
        FieldKind::Enum => Some(format!("Select {label}")),
        _ => Some(
            schema
                .facets()
                .and_then(|f| f.example.as_ref())
                .map(super::field::display_value)
                .unwrap_or_else(|| format!("Enter {label}")),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::field::FieldKind;
    use crate::infrastructure::openapi::{OpenApiParser, ParameterLocation};
    use serde_json::json;

    fn document() -> OpenApiDocument {
        OpenApiParser::new(json!({
            "openapi": "3.0.1",
            "components": {
                "schemas": {
                    "Base": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": { "type": "string", "example": "jdoe" },
                            "level": { "type": "string", "enum": ["USER", "SUPERUSER"] }
                        }
                    },
                    "UserCreateRequest": {
                        "allOf": [
                            { "$ref": "#/components/schemas/Base" },
                            {
                                "type": "object",
                                "required": ["name", "email"],
                                "properties": {
                                    "email": { "type": "string" },
                                    "displayName": { "type": "string", "maxLength": 500 },
                                    "active": { "type": "boolean" },
                                    "tags": { "type": "array", "items": { "type": "string" } },
                                    "quota": { "type": "integer", "minimum": 0, "default": 10 }
                                }
                            }
                        ]
                    }
                }
            },
            "paths": {}
        }))
        .parse()
        .unwrap()
    }

    fn query(name: &str, schema: JsonValue, required: bool) -> Parameter {
        Parameter {
            name: name.to_string(),
            location: ParameterLocation::Query,
            required,
            schema: SchemaNode::from_value(&schema),
            description: None,
        }
    }

    fn schema_ref() -> SchemaNode {
        SchemaNode::Ref {
            reference: "#/components/schemas/UserCreateRequest".to_string(),
        }
    }

    fn model(initial: Option<&JsonValue>) -> FormModel {
        FormModel::build(
            &document(),
            Some(&schema_ref()),
            &["profileId".to_string()],
            &[
                query("notify", json!({ "type": "boolean" }), false),
                query("mode", json!({ "type": "string", "default": "fast" }), false),
            ],
            initial,
        )
    }

    #[test]
    fn test_fields_and_keys() {
        let model = model(None);
        let keys: Vec<_> = model.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "__path_profileId",
                "__query_notify",
                "__query_mode",
                "__body_name",
                "__body_level",
                "__body_email",
                "__body_displayName",
                "__body_active",
                "__body_tags",
                "__body_quota",
            ]
        );

        let display = model.field("__body_displayName").unwrap();
        assert_eq!(display.label, "Display Name");
        assert_eq!(display.kind, FieldKind::LongText);
        assert_eq!(model.field("__body_level").unwrap().kind, FieldKind::Enum);
        assert_eq!(
            model.field("__body_name").unwrap().placeholder.as_deref(),
            Some("jdoe")
        );
        assert_eq!(model.required_body_fields(), vec!["name", "email"]);
    }

    #[test]
    fn test_defaults() {
        let defaults = model(None).defaults();
        assert_eq!(defaults["__path_profileId"], json!(""));
        assert_eq!(defaults["__query_notify"], json!(false));
        assert_eq!(defaults["__query_mode"], json!("fast"));
        assert_eq!(defaults["__body_active"], json!(false));
        assert_eq!(defaults["__body_tags"], json!([]));
        assert_eq!(defaults["__body_quota"], json!(10));
        assert_eq!(defaults["__body_email"], json!(""));
    }

    #[test]
    fn test_initial_data_wins() {
        let initial = json!({ "profileId": "p-1", "mode": "slow", "quota": 3, "email": null });
        let defaults = model(Some(&initial)).defaults();
        assert_eq!(defaults["__path_profileId"], json!("p-1"));
        assert_eq!(defaults["__query_mode"], json!("slow"));
        assert_eq!(defaults["__body_quota"], json!(3));
        assert_eq!(defaults["__body_email"], json!(null));
    }

    #[test]
    fn test_partition_rules() {
        let mut values = FormValues::new();
        values.insert("__path_id".into(), json!(""));
        values.insert("__query_search".into(), json!(""));
        values.insert("__query_flag".into(), json!(false));
        values.insert("__body_name".into(), json!(""));
        values.insert("__body_bio".into(), json!(""));
        values.insert("__body_count".into(), json!(0));
        values.insert("__body_tags".into(), json!([]));
        values.insert("stray".into(), json!("x"));

        let submission = partition_submission(&values, &["name".to_string()]);
        assert_eq!(submission.path_params.get("id"), Some(&json!("")));
        assert!(!submission.query_params.contains_key("search"));
        assert_eq!(submission.query_params.get("flag"), Some(&json!(false)));
        assert_eq!(submission.body.get("name"), Some(&json!("")));
        assert!(!submission.body.contains_key("bio"));
        assert_eq!(submission.body.get("count"), Some(&json!(0)));
        assert_eq!(submission.body.get("tags"), Some(&json!([])));
    }

    #[test]
    fn test_submit_validates_then_coerces() {
        let model = model(None);

        let mut values = FormValues::new();
        values.insert("__body_quota".into(), json!("-1"));
        let err = model.submit(&values).unwrap_err();
        let messages: Vec<_> = err
            .field_errors()
            .iter()
            .map(|e| (e.key.as_str(), e.message.as_str()))
            .collect();
        assert_eq!(
            messages,
            vec![
                ("__path_profileId", "profileId is required"),
                ("__body_name", "Name is required"),
                ("__body_email", "Email is required"),
                ("__body_quota", "Must be at least 0"),
            ]
        );

        let mut values = FormValues::new();
        values.insert("__path_profileId".into(), json!("p 1"));
        values.insert("__body_name".into(), json!("jdoe"));
        values.insert("__body_email".into(), json!("j@example.com"));
        values.insert("__body_quota".into(), json!("25"));
        values.insert("__query_notify".into(), json!("true"));
        let submission = model.submit(&values).unwrap();
        assert_eq!(submission.body["quota"], json!(25));
        assert_eq!(submission.query_params["notify"], json!(true));
        assert_eq!(submission.query_params["mode"], json!("fast"));
        assert!(!submission.body.contains_key("displayName"));
        assert_eq!(
            submission.resolve_path("/profile/{profileId}").unwrap(),
            "/profile/p%201"
        );
    }

    #[test]
    fn test_submit_rejects_unknown_field() {
        let mut values = FormValues::new();
        values.insert("__body_nope".into(), json!("x"));
        assert_eq!(
            model(None).submit(&values),
            Err(FormError::UnknownField("__body_nope".to_string()))
        );
    }

    #[test]
    fn test_resolve_path_missing() {
        let submission = FormSubmission::default();
        assert_eq!(
            submission.resolve_path("/user/{name}"),
            Err(FormError::MissingPathParameter("name".to_string()))
        );
    }
}
