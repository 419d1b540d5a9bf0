//! Form generation, validation and submission partitioning

use std::path::PathBuf;

use elements_admin::analysis::{OpenApiLoader, ResourceAction, analyze_openapi_spec, find_resource};
use elements_admin::forms::{
    FieldKind, FieldSection, FormError, FormModel, FormValues, partition_submission,
};
use elements_admin::infrastructure::openapi::{
    FileOpenApiLoader, OpenApiDocument, OpenApiParser, Parameter, ParameterLocation, SchemaNode,
};
use serde_json::{Value as JsonValue, json};

async fn fixture() -> OpenApiDocument {
    let path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/elements_openapi.yaml");
    let document = FileOpenApiLoader::new()
        .load(path.to_str().unwrap())
        .await
        .expect("fixture should load");
    (*document).clone()
}

async fn user_form(action: ResourceAction, variant: usize) -> FormModel {
    let document = fixture().await;
    let resources = analyze_openapi_spec(&document);
    let user = find_resource(&resources, "user").unwrap();
    let endpoint = &user.endpoints(action)[variant];
    FormModel::for_endpoint(&document, endpoint, None)
}

fn values(value: JsonValue) -> FormValues {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn messages(err: &FormError) -> Vec<(String, String)> {
    err.field_errors()
        .iter()
        .map(|e| (e.key.clone(), e.message.clone()))
        .collect()
}

#[test]
fn test_partition_drops_empty_query_and_keeps_false_body() {
    let submission = partition_submission(
        &values(json!({
            "__path_id": "5",
            "__query_count": "",
            "__body_name": "x",
            "__body_active": false
        })),
        &[],
    );

    assert_eq!(
        serde_json::to_value(&submission).unwrap(),
        json!({
            "pathParams": { "id": "5" },
            "queryParams": {},
            "body": { "name": "x", "active": false }
        })
    );
}

#[test]
fn test_model_submit_matches_partition() {
    let document = OpenApiParser::new(json!({ "openapi": "3.0.1", "paths": {} }))
        .parse()
        .unwrap();
    let count = Parameter {
        name: "count".to_string(),
        location: ParameterLocation::Query,
        required: false,
        schema: SchemaNode::from_value(&json!({ "type": "integer" })),
        description: None,
    };
    let schema = SchemaNode::from_value(&json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "active": { "type": "boolean" }
        }
    }));
    let model = FormModel::build(
        &document,
        Some(&schema),
        &["id".to_string()],
        &[count],
        None,
    );

    let submission = model
        .submit(&values(json!({
            "__path_id": "5",
            "__query_count": "",
            "__body_name": "x",
            "__body_active": false
        })))
        .unwrap();

    assert_eq!(submission.path_params, values(json!({ "id": "5" })));
    assert!(submission.query_params.is_empty());
    assert_eq!(submission.body, values(json!({ "name": "x", "active": false })));
    assert_eq!(submission.resolve_path("/item/{id}").unwrap(), "/item/5");
}

#[tokio::test]
async fn test_create_form_fields() {
    let model = user_form(ResourceAction::Create, 0).await;

    let keys: Vec<_> = model.fields.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "__body_name",
            "__body_email",
            "__body_level",
            "__body_password",
            "__body_active",
            "__body_quota",
            "__body_biography"
        ]
    );

    let level = model.field("__body_level").unwrap();
    assert_eq!(level.kind, FieldKind::Enum);
    assert!(level.required);
    assert_eq!(level.default, json!("USER"));
    assert_eq!(level.placeholder.as_deref(), Some("Select level"));

    let email = model.field("__body_email").unwrap();
    assert_eq!(email.kind, FieldKind::Text);
    assert_eq!(email.placeholder.as_deref(), Some("user@example.com"));

    assert_eq!(model.field("__body_active").unwrap().kind, FieldKind::Boolean);
    assert_eq!(model.field("__body_active").unwrap().default, json!(false));
    assert_eq!(model.field("__body_quota").unwrap().kind, FieldKind::Number);
    assert_eq!(model.field("__body_biography").unwrap().kind, FieldKind::LongText);
    assert_eq!(
        model.required_body_fields(),
        vec!["name", "level", "password"]
    );
}

#[tokio::test]
async fn test_required_messages() {
    let model = user_form(ResourceAction::Create, 0).await;
    let err = model.submit(&FormValues::new()).unwrap_err();

    assert_eq!(
        messages(&err),
        vec![
            ("__body_name".to_string(), "Name is required".to_string()),
            ("__body_password".to_string(), "Password is required".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_numeric_and_enum_messages() {
    let model = user_form(ResourceAction::Create, 0).await;
    let base = json!({ "__body_name": "bob", "__body_password": "pw" });

    let with = |key: &str, value: JsonValue| {
        let mut input = values(base.clone());
        input.insert(key.to_string(), value);
        input
    };

    let cases = [
        ("__body_quota", json!("abc"), "Must be a valid number"),
        ("__body_quota", json!("0"), "Must be at least 1"),
        ("__body_quota", json!(101), "Must be at most 100"),
        ("__body_level", json!("ADMIN"), "Must be one of: USER, SUPERUSER"),
    ];
    for (key, value, expected) in cases {
        let err = model.submit(&with(key, value)).unwrap_err();
        assert_eq!(
            messages(&err),
            vec![(key.to_string(), expected.to_string())],
            "{key}"
        );
    }

    // Optional numbers may stay empty
    assert!(model.submit(&with("__body_quota", json!(""))).is_ok());
}

#[tokio::test]
async fn test_submit_coerces_and_partitions() {
    let model = user_form(ResourceAction::Create, 0).await;
    let submission = model
        .submit(&values(json!({
            "__body_name": "bob",
            "__body_password": "pw",
            "__body_quota": "5",
            "__body_active": "true"
        })))
        .unwrap();

    assert_eq!(
        submission.body,
        values(json!({
            "name": "bob",
            "level": "USER",
            "password": "pw",
            "active": true,
            "quota": 5
        }))
    );
    assert!(submission.path_params.is_empty());
}

#[tokio::test]
async fn test_path_parameter_always_required() {
    let model = user_form(ResourceAction::Update, 0).await;

    let name = model.field("__path_name").unwrap();
    assert_eq!(name.section, FieldSection::Path);
    assert_eq!(name.placeholder.as_deref(), Some("Enter name"));

    let err = model.submit(&FormValues::new()).unwrap_err();
    assert_eq!(
        messages(&err),
        vec![("__path_name".to_string(), "name is required".to_string())]
    );

    let submission = model
        .submit(&values(json!({ "__path_name": "bob smith", "__body_email": "b@x.io" })))
        .unwrap();
    assert_eq!(
        submission.resolve_path("/user/{name}").unwrap(),
        "/user/bob%20smith"
    );
    assert_eq!(submission.body, values(json!({ "email": "b@x.io" })));
}

#[tokio::test]
async fn test_unknown_field_rejected() {
    let model = user_form(ResourceAction::Delete, 0).await;
    let err = model
        .submit(&values(json!({ "__path_name": "bob", "__body_extra": 1 })))
        .unwrap_err();
    assert_eq!(err, FormError::UnknownField("__body_extra".to_string()));
}
