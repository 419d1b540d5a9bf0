//! Tagged JSON-Schema nodes and `$ref` / `allOf` resolution
//!
//! Schemas are parsed once into [`SchemaNode`] values. References are kept
//! as [`SchemaNode::Ref`] and only followed on demand through a
//! [`SchemaResolver`], so an unresolvable reference never aborts parsing.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use super::types::OpenApiDocument;

/// Maximum number of `$ref` hops followed before giving up
pub const MAX_REF_DEPTH: usize = 20;

/// A JSON-Schema fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaNode {
    Ref {
        reference: String,
    },
    AllOf {
        members: Vec<SchemaNode>,
        #[serde(flatten)]
        facets: SchemaFacets,
    },
    Object(ObjectSchema),
    Array(ArraySchema),
    Primitive(PrimitiveSchema),
}

/// Keywords shared by every non-reference schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaFacets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<JsonValue>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    pub read_only: bool,
    pub nullable: bool,
}

impl SchemaFacets {
    fn from_object(obj: &Map<String, JsonValue>) -> Self {
        let string = |key: &str| obj.get(key).and_then(JsonValue::as_str).map(String::from);
        let flag = |key: &str| obj.get(key).and_then(JsonValue::as_bool).unwrap_or(false);

        Self {
            title: string("title"),
            description: string("description"),
            format: string("format"),
            default: obj.get("default").cloned(),
            example: obj.get("example").cloned(),
            enum_values: obj.get("enum").and_then(JsonValue::as_array).cloned(),
            minimum: obj.get("minimum").and_then(JsonValue::as_f64),
            maximum: obj.get("maximum").and_then(JsonValue::as_f64),
            min_length: obj.get("minLength").and_then(JsonValue::as_u64),
            max_length: obj.get("maxLength").and_then(JsonValue::as_u64),
            read_only: flag("readOnly"),
            nullable: flag("nullable"),
        }
    }
}

/// Ordered property map; inserting an existing key replaces its schema in place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, SchemaNode)>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: SchemaNode) {
        let name = name.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = schema,
            None => self.0.push((name, schema)),
        }
    }

    /// Merge `other` into `self`; entries from `other` win on conflict
    pub fn extend(&mut self, other: Properties) {
        for (name, schema) in other.0 {
            self.insert(name, schema);
        }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.0.iter().find(|(key, _)| key == name).map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, schema) in &self.0 {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectSchema {
    pub properties: Properties,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(flatten)]
    pub facets: SchemaFacets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArraySchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(flatten)]
    pub facets: SchemaFacets,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
    #[default]
    Any,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrimitiveSchema {
    #[serde(rename = "type")]
    pub primitive: PrimitiveType,
    #[serde(flatten)]
    pub facets: SchemaFacets,
}

impl SchemaNode {
    /// Parse a raw JSON-Schema value. Never fails: unknown shapes become `Any`.
    pub fn from_value(value: &JsonValue) -> SchemaNode {
        let Some(obj) = value.as_object() else {
            return SchemaNode::Primitive(PrimitiveSchema::default());
        };

        if let Some(reference) = obj.get("$ref").and_then(JsonValue::as_str) {
            return SchemaNode::Ref {
                reference: reference.to_string(),
            };
        }

        let facets = SchemaFacets::from_object(obj);

        if let Some(members) = obj.get("allOf").and_then(JsonValue::as_array) {
            return SchemaNode::AllOf {
                members: members.iter().map(SchemaNode::from_value).collect(),
                facets,
            };
        }

        match declared_type(obj) {
            Some("object") => Self::object(obj, facets),
            Some("array") => Self::array(obj, facets),
            Some(other) => SchemaNode::Primitive(PrimitiveSchema {
                primitive: match other {
                    "string" => PrimitiveType::String,
                    "number" => PrimitiveType::Number,
                    "integer" => PrimitiveType::Integer,
                    "boolean" => PrimitiveType::Boolean,
                    _ => PrimitiveType::Any,
                },
                facets,
            }),
            None if obj.contains_key("properties") => Self::object(obj, facets),
            None if obj.contains_key("items") => Self::array(obj, facets),
            None => SchemaNode::Primitive(PrimitiveSchema {
                primitive: PrimitiveType::Any,
                facets,
            }),
        }
    }

    fn object(obj: &Map<String, JsonValue>, facets: SchemaFacets) -> SchemaNode {
        let mut properties = Properties::new();
        if let Some(props) = obj.get("properties").and_then(JsonValue::as_object) {
            for (name, schema) in props {
                properties.insert(name.clone(), SchemaNode::from_value(schema));
            }
        }
        let required = obj
            .get("required")
            .and_then(JsonValue::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(JsonValue::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        SchemaNode::Object(ObjectSchema {
            properties,
            required,
            facets,
        })
    }

    fn array(obj: &Map<String, JsonValue>, facets: SchemaFacets) -> SchemaNode {
        SchemaNode::Array(ArraySchema {
            items: obj
                .get("items")
                .map(|items| Box::new(SchemaNode::from_value(items))),
            facets,
        })
    }

    /// Common keywords, absent for references
    pub fn facets(&self) -> Option<&SchemaFacets> {
        match self {
            SchemaNode::Ref { .. } => None,
            SchemaNode::AllOf { facets, .. } => Some(facets),
            SchemaNode::Object(o) => Some(&o.facets),
            SchemaNode::Array(a) => Some(&a.facets),
            SchemaNode::Primitive(p) => Some(&p.facets),
        }
    }

    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match self {
            SchemaNode::Primitive(p) => Some(p.primitive),
            _ => None,
        }
    }

    pub fn is_boolean(&self) -> bool {
        self.primitive_type() == Some(PrimitiveType::Boolean)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.primitive_type(),
            Some(PrimitiveType::Number | PrimitiveType::Integer)
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(self, SchemaNode::Array(_))
    }

    pub fn enum_values(&self) -> Option<&[JsonValue]> {
        self.facets()?.enum_values.as_deref()
    }
}

/// `type` keyword; for OpenAPI 3.1 type arrays the first non-null entry
fn declared_type(obj: &Map<String, JsonValue>) -> Option<&str> {
    match obj.get("type")? {
        JsonValue::String(s) => Some(s.as_str()),
        JsonValue::Array(types) => types
            .iter()
            .filter_map(JsonValue::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

/// Resolve a local `#/a/b/c` reference by literal traversal of `root`.
///
/// Segments are matched verbatim against object keys (or array indices).
/// Non-local references, missing targets and `null` targets yield `None`.
pub fn resolve_pointer<'a>(root: &'a JsonValue, reference: &str) -> Option<&'a JsonValue> {
    let path = reference.strip_prefix("#/")?;
    let mut current = root;
    for segment in path.split('/') {
        current = match current {
            JsonValue::Object(map) => map.get(segment)?,
            JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// Resolves schema nodes against the document they came from
pub struct SchemaResolver<'a> {
    document: &'a OpenApiDocument,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(document: &'a OpenApiDocument) -> Self {
        Self { document }
    }

    /// Follow references until a concrete node is reached
    pub fn resolve(&self, node: &SchemaNode) -> Option<SchemaNode> {
        self.resolve_in(node, &mut Vec::new())
    }

    fn resolve_in(&self, node: &SchemaNode, trail: &mut Vec<String>) -> Option<SchemaNode> {
        match node {
            SchemaNode::Ref { reference } => {
                let target = self.enter(reference, trail)?;
                let resolved = self.resolve_in(&target, trail);
                trail.pop();
                resolved
            }
            other => Some(other.clone()),
        }
    }

    /// Properties of `node`, merging `allOf` members in order (later wins)
    pub fn properties(&self, node: &SchemaNode) -> Properties {
        self.properties_in(node, &mut Vec::new())
    }

    fn properties_in(&self, node: &SchemaNode, trail: &mut Vec<String>) -> Properties {
        match node {
            SchemaNode::Ref { reference } => {
                let Some(target) = self.enter(reference, trail) else {
                    return Properties::new();
                };
                let properties = self.properties_in(&target, trail);
                trail.pop();
                properties
            }
            SchemaNode::AllOf { members, .. } => {
                let mut merged = Properties::new();
                for member in members {
                    merged.extend(self.properties_in(member, trail));
                }
                merged
            }
            SchemaNode::Object(object) => object.properties.clone(),
            _ => Properties::new(),
        }
    }

    /// Required property names of `node`; `allOf` members are unioned without duplicates
    pub fn required(&self, node: &SchemaNode) -> Vec<String> {
        self.required_in(node, &mut Vec::new())
    }

    fn required_in(&self, node: &SchemaNode, trail: &mut Vec<String>) -> Vec<String> {
        match node {
            SchemaNode::Ref { reference } => {
                let Some(target) = self.enter(reference, trail) else {
                    return Vec::new();
                };
                let required = self.required_in(&target, trail);
                trail.pop();
                required
            }
            SchemaNode::AllOf { members, .. } => {
                let mut all = Vec::new();
                for member in members {
                    for name in self.required_in(member, trail) {
                        if !all.contains(&name) {
                            all.push(name);
                        }
                    }
                }
                all
            }
            SchemaNode::Object(object) => object.required.clone(),
            _ => Vec::new(),
        }
    }

    /// Target of `reference`, pushed onto `trail`.
    ///
    /// `None` for references already on the trail (a cycle), past
    /// [`MAX_REF_DEPTH`], or unresolvable. Callers pop after a `Some`.
    fn enter(&self, reference: &str, trail: &mut Vec<String>) -> Option<SchemaNode> {
        if trail.iter().any(|seen| seen == reference) {
            debug!(reference, "Cyclic schema reference");
            return None;
        }
        if trail.len() >= MAX_REF_DEPTH {
            debug!(reference, "Reference depth limit reached");
            return None;
        }
        match self.document.resolve_ref(reference) {
            Some(target) => {
                trail.push(reference.to_string());
                Some(SchemaNode::from_value(target))
            }
            None => {
                debug!(reference, "Unresolvable schema reference");
                None
            }
        }
    }
}
