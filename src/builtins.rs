//! Built-in models
//!
//! Preset fields for the primitive scalar types, the [`BaseModel`] marker
//! and the [`ValidationError`] model every API documents.

use {
    crate::{
        descriptor::{Describe, TypeDescriptor, TypeName},
        kind::SchemaKind,
        metadata::{Field, Metadata},
        model,
        reflect::Reflector,
    },
    once_cell::sync::Lazy,
    serde::{Deserialize, Serialize},
    serde_json::Value,
    std::collections::{BTreeMap, HashMap},
};

/// Qualified-name namespace of the preset primitive records.
pub const NAMESPACE: &str = "builtin";

/// Marker embedded in user models. Never recorded as a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseModel;

impl Describe for BaseModel {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::marker(TypeName::of::<Self>())
    }
}

model! {
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ValidationError: "Validation Error" {
        #[serde(rename = "service", default, skip_serializing_if = "HashMap::is_empty")]
        pub ctx: HashMap<String, Value> => r#"json:"service" description:"Service""#,
        pub msg: String => r#"json:"msg" description:"Message" binding:"required""#,
        #[serde(rename = "type")]
        pub error_type: String => r#"json:"type" description:"Error Type" binding:"required""#,
        pub loc: Vec<String> => r#"json:"loc" description:"Location" binding:"required""#,
    }
}

impl ValidationError {
    pub fn new(loc: Vec<String>, msg: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            ctx: HashMap::new(),
            msg: msg.into(),
            error_type: error_type.into(),
            loc,
        }
    }
}

static PRESETS: Lazy<BTreeMap<&'static str, Field>> = Lazy::new(|| {
    let integer = |name: &'static str, annotation: &'static str| {
        (name, Field::new(name, 0, annotation, SchemaKind::Integer))
    };
    let number = |name: &'static str, annotation: &'static str| {
        (name, Field::new(name, 0, annotation, SchemaKind::Number))
    };

    BTreeMap::from([
        integer("int", r#"json:"int" gte:"-9223372036854775808" lte:"9223372036854775807" description:"int" default:"0""#),
        integer("int8", r#"json:"int8" gte:"-128" lte:"127" description:"int8" default:"0""#),
        integer("int16", r#"json:"int16" gte:"-32768" lte:"32767" description:"int16" default:"0""#),
        integer("int32", r#"json:"int32" gte:"-2147483648" lte:"2147483647" description:"int32" default:"0""#),
        integer("int64", r#"json:"int64" gte:"-9223372036854775808" lte:"9223372036854775807" description:"int64" default:"0""#),
        integer("uint8", r#"json:"uint8" gte:"0" lte:"255" description:"uint8""#),
        integer("uint16", r#"json:"uint16" gte:"0" lte:"65535" description:"uint16" default:"0""#),
        integer("uint32", r#"json:"uint32" gte:"0" lte:"4294967295" description:"uint32" default:"0""#),
        integer("uint64", r#"json:"uint64" gte:"0" lte:"18446744073709551615" description:"uint64" default:"0""#),
        number("float", r#"json:"float" description:"float" default:"0.0""#),
        number("float32", r#"json:"float32" description:"float32" default:"0.0""#),
        number("float64", r#"json:"float64" description:"float64" default:"0.0""#),
        (
            "string",
            Field::new(
                "string",
                0,
                r#"json:"string" min:"0" max:"255" description:"string" default:"""#,
                SchemaKind::String,
            ),
        ),
        (
            "bool",
            Field::new(
                "bool",
                0,
                r#"json:"boolean" oneof:"true false" description:"boolean" default:"false""#,
                SchemaKind::Boolean,
            ),
        ),
    ])
});

/// Preset field for a primitive such as `int32` or `string`.
pub fn field(name: &str) -> Option<Field> {
    PRESETS.get(name).cloned()
}

/// Names of every preset, sorted.
pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.keys().copied()
}

/// Register an empty `builtin.<name>` record per preset plus
/// [`ValidationError`].
pub fn seed(reflector: &Reflector) {
    for (name, preset) in PRESETS.iter() {
        let meta = Metadata::new(
            TypeName::new(*name, format!("{NAMESPACE}.{name}")),
            preset.kind(),
        )
        .with_description(preset.description());
        reflector.registry().save(meta);
    }
    reflector.reflect::<ValidationError>();
}
