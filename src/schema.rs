//! Schema documents
//!
//! Renders [`Metadata`] and [`Field`] records into the nested documents
//! exposed to OpenAPI/JSON-Schema consumers.
//!
//! ```text
//! {
//!     "title": "Shape",
//!     "type": "object",
//!     "description": "Shape",
//!     "required": ["name"],
//!     "properties": {
//!         "name": {"title": "name", "type": "string", "required": true, "description": "name"},
//!         "position": {
//!             "title": "position",
//!             "type": "object",
//!             "required": false,
//!             "description": "position",
//!             "$ref": "#/components/schemas/demo.Point"
//!         },
//!         "tags": {
//!             "title": "tags",
//!             "type": "array",
//!             "required": false,
//!             "description": "tags",
//!             "items": {"type": "string"}
//!         }
//!     }
//! }
//! ```

use {
    crate::{
        error::SchemaResult,
        kind::SchemaKind,
        logging,
        metadata::{Field, ItemRef, Metadata},
    },
    serde::{Deserialize, Serialize},
    serde_json::{Number, Value},
    std::collections::{btree_map::Entry, BTreeMap},
};

pub const REF_NAME: &str = "$ref";
pub const REF_PREFIX: &str = "#/components/schemas/";

/// `#/components/schemas/<qualified>`
pub fn ref_path(qualified: &str) -> String {
    format!("{REF_PREFIX}{qualified}")
}

/// `{"$ref": "#/components/schemas/<qualified>"}`
pub fn schema_ref(qualified: &str) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(REF_NAME.to_string(), Value::String(ref_path(qualified)));
    Value::Object(map)
}

/// `items` of an array schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Type {
        #[serde(rename = "type")]
        kind: SchemaKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Box<Items>>,
    },
}

impl Items {
    pub fn basic(kind: SchemaKind) -> Self {
        Self::Type { kind, items: None }
    }

    pub fn from_item_ref(item: &ItemRef) -> Self {
        match item {
            ItemRef::Kind(kind) => Self::basic(*kind),
            ItemRef::Model(name) => Self::Ref {
                reference: ref_path(name),
            },
            ItemRef::Array(inner) => Self::Type {
                kind: SchemaKind::Array,
                items: Some(Box::new(Self::from_item_ref(inner))),
            },
        }
    }
}

/// Document for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    pub required: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl FieldSchema {
    pub fn from_field(field: &Field) -> Self {
        let kind = field.kind();
        let constraints = field.constraints();

        let mut schema = Self {
            title: field.name().to_string(),
            kind,
            required: field.is_required(),
            description: field.description().to_string(),
            default: field.default_value().cloned(),
            enumeration: (!constraints.one_of.is_empty()).then(|| constraints.enum_values(kind)),
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            min_length: None,
            max_length: None,
            items: None,
            reference: None,
        };

        match kind {
            SchemaKind::Integer | SchemaKind::Number => {
                // min/max are aliases and win over gte/lte
                schema.minimum = constraints.min.clone().or_else(|| constraints.gte.clone());
                schema.maximum = constraints.max.clone().or_else(|| constraints.lte.clone());
                schema.exclusive_minimum = constraints.gt.clone();
                schema.exclusive_maximum = constraints.lt.clone();
            }
            SchemaKind::String => {
                schema.min_length = constraints.min.clone();
                schema.max_length = constraints.max.clone();
            }
            SchemaKind::Array => {
                schema.items = Some(
                    field
                        .item_ref()
                        .map(Items::from_item_ref)
                        .unwrap_or_else(|| Items::basic(SchemaKind::String)),
                );
                // array bounds share the string length keys
                schema.min_length = constraints.min.clone();
                schema.max_length = constraints.max.clone();
            }
            SchemaKind::Object => {
                schema.reference = field.item_ref().and_then(ItemRef::model).map(ref_path);
            }
            SchemaKind::Boolean => {}
        }

        schema
    }

    pub fn to_value(&self) -> SchemaResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Document for a whole model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, FieldSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
}

impl ModelSchema {
    pub fn from_metadata(meta: &Metadata) -> Self {
        let mut schema = Self {
            title: meta.name().to_string(),
            kind: meta.kind(),
            description: meta.description().to_string(),
            required: None,
            properties: None,
            items: None,
        };

        match meta.kind() {
            SchemaKind::Object => {
                let mut properties = BTreeMap::new();
                for field in meta.fields().iter().filter(|f| f.is_property()) {
                    match properties.entry(field.json_name().to_string()) {
                        Entry::Vacant(slot) => {
                            slot.insert(FieldSchema::from_field(field));
                        }
                        Entry::Occupied(_) => logging::log_duplicate_property(
                            meta.qualified_name(),
                            field.name(),
                            field.json_name(),
                        ),
                    }
                }
                schema.required = Some(meta.required());
                schema.properties = Some(properties);
            }
            SchemaKind::Array => {
                schema.items = Some(
                    meta.items()
                        .map(Items::from_item_ref)
                        .unwrap_or_else(|| Items::basic(SchemaKind::String)),
                );
            }
            SchemaKind::Integer | SchemaKind::Number | SchemaKind::String | SchemaKind::Boolean => {}
        }

        schema
    }

    pub fn to_value(&self) -> SchemaResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Field documents for the inner fields of `meta`, keyed by property name.
pub fn inner_schema(meta: &Metadata) -> BTreeMap<String, FieldSchema> {
    meta.inner_fields()
        .iter()
        .map(|f| (f.json_name().to_string(), FieldSchema::from_field(f)))
        .collect()
}

/// The `components` section of an OpenAPI document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub schemas: BTreeMap<String, ModelSchema>,
}

impl Components {
    pub fn to_value(&self) -> SchemaResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeName;
    use serde_json::json;

    fn object(name: &str) -> Metadata {
        Metadata::new(TypeName::from_qualified(name), SchemaKind::Object)
    }

    #[test]
    fn test_integer_bounds() {
        let field = Field::new(
            "age",
            0,
            r#"gte:"0" lte:"150" gt:"-1" lt:"151" default:"7""#,
            SchemaKind::Integer,
        );
        let value = FieldSchema::from_field(&field).to_value().unwrap();
        assert_eq!(value["minimum"], json!(0));
        assert_eq!(value["maximum"], json!(150));
        assert_eq!(value["exclusiveMinimum"], json!(-1));
        assert_eq!(value["exclusiveMaximum"], json!(151));
        assert_eq!(value["default"], json!(7));
        assert!(value.get("minLength").is_none());
    }

    #[test]
    fn test_min_max_alias_wins() {
        let field = Field::new("n", 0, r#"gte:"1" min:"5" max:"9""#, SchemaKind::Number);
        let schema = FieldSchema::from_field(&field);
        assert_eq!(schema.minimum, Some(Number::from(5)));
        assert_eq!(schema.maximum, Some(Number::from(9)));
    }

    #[test]
    fn test_string_lengths_and_enum() {
        let field = Field::new("mode", 0, r#"min:"1" max:"8" oneof:"fast slow""#, SchemaKind::String);
        let value = FieldSchema::from_field(&field).to_value().unwrap();
        assert_eq!(value["minLength"], json!(1));
        assert_eq!(value["maxLength"], json!(8));
        assert_eq!(value["enum"], json!(["fast", "slow"]));
        assert!(value.get("minimum").is_none());
    }

    #[test]
    fn test_array_items() {
        let field = Field::new("tags", 0, r#"max:"3""#, SchemaKind::Array)
            .with_item_ref(Some(ItemRef::Kind(SchemaKind::String)));
        let value = FieldSchema::from_field(&field).to_value().unwrap();
        assert_eq!(value["type"], json!("array"));
        assert_eq!(value["items"], json!({"type": "string"}));
        assert_eq!(value["maxLength"], json!(3));

        let field = Field::new("steps", 0, "", SchemaKind::Array)
            .with_item_ref(Some(ItemRef::Model("demo.Step".into())));
        let value = FieldSchema::from_field(&field).to_value().unwrap();
        assert_eq!(value["items"], json!({"$ref": "#/components/schemas/demo.Step"}));

        let field = Field::new("grid", 0, "", SchemaKind::Array).with_item_ref(Some(ItemRef::Array(
            Box::new(ItemRef::Kind(SchemaKind::Integer)),
        )));
        let value = FieldSchema::from_field(&field).to_value().unwrap();
        assert_eq!(value["items"], json!({"type": "array", "items": {"type": "integer"}}));
    }

    #[test]
    fn test_array_without_item_ref_defaults_to_string() {
        let field = Field::new("raw", 0, "", SchemaKind::Array);
        let schema = FieldSchema::from_field(&field);
        assert_eq!(schema.items, Some(Items::basic(SchemaKind::String)));
    }

    #[test]
    fn test_object_reference() {
        let field = Field::new("position", 0, "", SchemaKind::Object)
            .with_item_ref(Some(ItemRef::Model("demo.Point".into())));
        let value = FieldSchema::from_field(&field).to_value().unwrap();
        assert_eq!(value["$ref"], json!("#/components/schemas/demo.Point"));
        assert_eq!(value["required"], json!(false));
        assert_eq!(value["description"], json!("position"));

        let opaque = Field::new("extra", 0, "", SchemaKind::Object);
        let value = FieldSchema::from_field(&opaque).to_value().unwrap();
        assert!(value.get("$ref").is_none());
    }

    #[test]
    fn test_model_document() {
        let meta = object("demo.Form")
            .with_description("A form")
            .with_field(Field::new("name", 0, r#"json:"user_name" binding:"required""#, SchemaKind::String))
            .with_field(Field::new("age", 1, "", SchemaKind::Integer))
            .with_field(Field::new("hidden", 2, "", SchemaKind::Integer).exported(false));
        let value = ModelSchema::from_metadata(&meta).to_value().unwrap();
        assert_eq!(value["title"], json!("Form"));
        assert_eq!(value["type"], json!("object"));
        assert_eq!(value["description"], json!("A form"));
        assert_eq!(value["required"], json!(["user_name"]));
        let properties = value["properties"].as_object().unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties["user_name"]["title"], json!("name"));
        assert!(value.get("items").is_none());
    }

    #[test]
    fn test_duplicate_property_keeps_first_member() {
        let meta = object("demo.Clash")
            .with_field(Field::new("name", 0, r#"json:"label" max:"8""#, SchemaKind::String))
            .with_field(Field::new("title", 1, r#"json:"label" binding:"required""#, SchemaKind::String));
        let value = ModelSchema::from_metadata(&meta).to_value().unwrap();
        assert_eq!(value["properties"].as_object().unwrap().len(), 1);
        assert_eq!(value["properties"]["label"]["title"], json!("name"));
        assert_eq!(value["required"], json!([]));
    }

    #[test]
    fn test_empty_metadata_renders_empty_properties() {
        let value = ModelSchema::from_metadata(&object("demo.Empty")).to_value().unwrap();
        assert_eq!(value["properties"], json!({}));
        assert_eq!(value["required"], json!([]));
    }

    #[test]
    fn test_array_metadata() {
        let meta = Metadata::new(TypeName::from_qualified("List[demo.Point]"), SchemaKind::Array)
            .with_items(ItemRef::Model("demo.Point".into()));
        let value = ModelSchema::from_metadata(&meta).to_value().unwrap();
        assert_eq!(value["type"], json!("array"));
        assert_eq!(value["items"], json!({"$ref": "#/components/schemas/demo.Point"}));
        assert!(value.get("properties").is_none());
    }

    #[test]
    fn test_schema_ref() {
        assert_eq!(
            schema_ref("demo.Point"),
            json!({"$ref": "#/components/schemas/demo.Point"})
        );
    }

    #[test]
    fn test_inner_schema() {
        let meta = object("demo.Shape")
            .with_inner_field(Field::new("x", 0, "", SchemaKind::Integer))
            .with_inner_field(Field::new("y", 1, r#"json:"why""#, SchemaKind::Integer));
        let inner = inner_schema(&meta);
        assert_eq!(inner.len(), 2);
        assert_eq!(inner["why"].kind, SchemaKind::Integer);
    }
}
