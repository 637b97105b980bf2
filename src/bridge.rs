//! JSON Schema import
//!
//! Converts the document `schemars` generates for a [`JsonSchema`] type into a
//! [`TypeDescriptor`], so types that already derive `JsonSchema` can be
//! registered without declaring them through [`model!`](crate::model).
//!
//! Property constraints are translated back into annotation syntax
//! (`minimum` becomes `gte`, `maxLength` becomes `max`, and so on) so the
//! imported fields go through the same [`Constraints`](crate::annotation::Constraints)
//! path as declared ones.

use {
    crate::{
        annotation::Tags,
        descriptor::{FieldDef, Shape, StructDef, TypeDescriptor, TypeName, TypeRef},
        error::{SchemaError, SchemaResult},
    },
    schemars::JsonSchema,
    serde_json::{Map, Value},
    std::{collections::HashMap, sync::Arc},
};

const DEFS_PREFIXES: [&str; 2] = ["#/$defs/", "#/definitions/"];

/// Descriptor for `T` built from its generated JSON Schema.
pub fn describe<T: JsonSchema>() -> SchemaResult<TypeDescriptor> {
    let schema = schemars::schema_for!(T);
    describe_value(schema.as_value(), TypeName::of::<T>())
}

/// Descriptor for an arbitrary JSON Schema document. Definitions are looked
/// up under `$defs` or `definitions` and named after `name`'s module.
pub fn describe_value(schema: &Value, name: TypeName) -> SchemaResult<TypeDescriptor> {
    let defs = schema
        .get("$defs")
        .or_else(|| schema.get("definitions"))
        .and_then(Value::as_object);

    let mut importer = Importer {
        module: module_of(&name.qualified),
        root: name.clone(),
        defs,
        visiting: Vec::new(),
        done: HashMap::new(),
    };
    let descriptor = importer.import(schema, name)?;
    Ok(Arc::try_unwrap(descriptor).unwrap_or_else(|shared| (*shared).clone()))
}

// `a.b.Wrapper<a.b.X>` -> `a.b`
fn module_of(qualified: &str) -> String {
    let plain = qualified.split('<').next().unwrap_or(qualified);
    plain
        .rsplit_once('.')
        .map(|(module, _)| module.to_string())
        .unwrap_or_default()
}

struct Importer<'a> {
    module: String,
    root: TypeName,
    defs: Option<&'a Map<String, Value>>,
    visiting: Vec<String>,
    done: HashMap<String, Arc<TypeDescriptor>>,
}

impl Importer<'_> {
    fn def_name(&self, def: &str) -> TypeName {
        if self.module.is_empty() {
            TypeName::new(def, def)
        } else {
            TypeName::new(def, format!("{}.{def}", self.module))
        }
    }

    fn import(&mut self, schema: &Value, name: TypeName) -> SchemaResult<Arc<TypeDescriptor>> {
        // `true` and `{}` accept anything
        let Some(obj) = schema.as_object() else {
            return Ok(Arc::new(TypeDescriptor::new(name, Shape::Any)));
        };

        if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
            return self.resolve_ref(reference);
        }

        for key in ["anyOf", "oneOf"] {
            if let Some(branches) = obj.get(key).and_then(Value::as_array) {
                let mut concrete = branches.iter().filter(|branch| !is_null(branch));
                return match (concrete.next(), concrete.next()) {
                    (Some(only), None) => self.import(only, name),
                    _ => Ok(Arc::new(TypeDescriptor::new(name, Shape::Any))),
                };
            }
        }

        if let Some([only]) = obj.get("allOf").and_then(Value::as_array).map(Vec::as_slice) {
            return self.import(only, name);
        }

        let shape = match type_of(obj) {
            Some("object") | None if obj.contains_key("properties") => {
                Shape::Struct(self.import_struct(obj, &name)?)
            }
            Some("object") => {
                let value = match obj.get("additionalProperties") {
                    Some(Value::Object(_)) => {
                        let schema = &obj["additionalProperties"];
                        TypeRef::Shared(self.import(schema, TypeName::new("value", "value"))?)
                    }
                    _ => TypeRef::of::<Value>(),
                };
                Shape::Map {
                    key: TypeRef::of::<String>(),
                    value,
                }
            }
            Some("array") => {
                let element = match obj.get("items") {
                    Some(items) => TypeRef::Shared(self.import(items, TypeName::new("item", "item"))?),
                    None => TypeRef::of::<Value>(),
                };
                Shape::Seq { element, len: None }
            }
            Some("string") => Shape::Str,
            Some("boolean") => Shape::Bool,
            Some("integer") => integer_shape(obj.get("format").and_then(Value::as_str)),
            Some("number") => match obj.get("format").and_then(Value::as_str) {
                Some("float") => Shape::Float { bits: 32 },
                _ => Shape::Float { bits: 64 },
            },
            Some("null") => Shape::Unit,
            Some(_) | None => Shape::Any,
        };

        let mut descriptor = TypeDescriptor::new(name, shape);
        if let Some(description) = obj.get("description").and_then(Value::as_str) {
            descriptor = descriptor.with_description(description);
        }
        Ok(Arc::new(descriptor))
    }

    fn resolve_ref(&mut self, reference: &str) -> SchemaResult<Arc<TypeDescriptor>> {
        if reference == "#" {
            return Ok(Arc::new(TypeDescriptor::reference(self.root.qualified.clone())));
        }

        let def = DEFS_PREFIXES
            .iter()
            .find_map(|prefix| reference.strip_prefix(prefix))
            .ok_or_else(|| SchemaError::UnsupportedReference(reference.to_string()))?;
        let def = def.replace("~1", "/").replace("~0", "~");

        if let Some(done) = self.done.get(&def) {
            return Ok(Arc::clone(done));
        }

        let name = self.def_name(&def);
        if self.visiting.contains(&def) {
            return Ok(Arc::new(TypeDescriptor::reference(name.qualified)));
        }

        let schema = self
            .defs
            .and_then(|defs| defs.get(&def))
            .ok_or_else(|| SchemaError::UnresolvedReference(reference.to_string()))?;

        self.visiting.push(def.clone());
        let imported = self.import(schema, name);
        self.visiting.pop();

        let imported = imported?;
        self.done.insert(def, Arc::clone(&imported));
        Ok(imported)
    }

    fn import_struct(&mut self, obj: &Map<String, Value>, name: &TypeName) -> SchemaResult<StructDef> {
        let required: Vec<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut fields = Vec::new();
        if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
            for (member, property) in properties {
                let member_name = TypeName::new(member.as_str(), format!("{}.{member}", name.qualified));
                let ty = self.import(property, member_name)?;
                let annotation = annotation_for(property, required.contains(&member.as_str()));
                fields.push(FieldDef::new(member.as_str(), TypeRef::Shared(ty)).with_annotation(annotation));
            }
        }

        Ok(StructDef {
            fields,
            marker: false,
        })
    }
}

fn is_null(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

// `"type"` may be a single name or a list that includes `"null"`.
fn type_of(obj: &Map<String, Value>) -> Option<&str> {
    match obj.get("type")? {
        Value::String(name) => Some(name.as_str()),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| *name != "null"),
        _ => None,
    }
}

fn integer_shape(format: Option<&str>) -> Shape {
    let (signed, bits) = match format {
        Some("int8") => (true, 8),
        Some("int16") => (true, 16),
        Some("int32") => (true, 32),
        Some("int128") => (true, 128),
        Some("int") => (true, isize::BITS as u16),
        Some("uint8") => (false, 8),
        Some("uint16") => (false, 16),
        Some("uint32") => (false, 32),
        Some("uint64") => (false, 64),
        Some("uint128") => (false, 128),
        Some("uint") => (false, usize::BITS as u16),
        _ => (true, 64),
    };
    Shape::Integer { signed, bits }
}

// Annotation equivalent of a property's JSON Schema keywords.
fn annotation_for(property: &Value, required: bool) -> String {
    let mut tags = Tags::default();
    if required {
        tags.insert("binding", "required");
    }

    let Some(obj) = property.as_object() else {
        return tags.to_string();
    };

    if let Some(description) = obj.get("description").and_then(Value::as_str) {
        tags.insert("description", description);
    }
    if let Some(default) = obj.get("default").and_then(scalar) {
        tags.insert("default", default);
    }
    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        let values: Option<Vec<String>> = values.iter().map(scalar).collect();
        if let Some(values) = values {
            tags.insert("oneof", values.join(" "));
        }
    }

    let bounds = [
        ("minimum", "gte"),
        ("maximum", "lte"),
        ("exclusiveMinimum", "gt"),
        ("exclusiveMaximum", "lt"),
        ("minLength", "min"),
        ("maxLength", "max"),
        ("minItems", "min"),
        ("maxItems", "max"),
    ];
    for (keyword, tag) in bounds {
        if let Some(Value::Number(n)) = obj.get(keyword) {
            tags.insert(tag, n.to_string());
        }
    }

    tags.to_string()
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{annotation::Constraints, kind::SchemaKind};
    use serde_json::json;

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Point {
        x: i32,
        y: i32,
    }

    /// A named shape
    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Figure {
        /// Display name
        #[schemars(length(min = 1, max = 64))]
        name: String,
        position: Point,
        tags: Vec<String>,
        #[schemars(range(min = 1, max = 10))]
        size: u8,
        note: Option<String>,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Node {
        label: String,
        children: Vec<Node>,
    }

    fn member<'a>(descriptor: &'a TypeDescriptor, name: &str) -> &'a FieldDef {
        descriptor
            .as_struct()
            .and_then(|def| def.fields.iter().find(|f| f.name == name))
            .unwrap_or_else(|| panic!("missing member {name}"))
    }

    #[test]
    fn test_describe_struct() {
        let descriptor = describe::<Figure>().unwrap();
        assert_eq!(descriptor.name.short, "Figure");
        assert_eq!(descriptor.kind(), SchemaKind::Object);
        assert_eq!(descriptor.description.as_deref(), Some("A named shape"));
        assert_eq!(descriptor.as_struct().unwrap().fields.len(), 5);

        let name = member(&descriptor, "name");
        let constraints = Constraints::parse(&name.annotation);
        assert!(constraints.required);
        assert_eq!(constraints.description.as_deref(), Some("Display name"));
        assert_eq!(constraints.min, Some(1.into()));
        assert_eq!(constraints.max, Some(64.into()));

        let size = Constraints::parse(&member(&descriptor, "size").annotation);
        assert_eq!(size.gte, Some(1.into()));
        assert_eq!(size.lte, Some(10.into()));

        let note = member(&descriptor, "note");
        assert!(!Constraints::parse(&note.annotation).required);
        assert_eq!(note.ty.resolve().kind(), SchemaKind::String);

        let tags = member(&descriptor, "tags").ty.resolve();
        assert_eq!(tags.kind(), SchemaKind::Array);
    }

    #[test]
    fn test_defs_named_after_module() {
        let descriptor = describe::<Figure>().unwrap();
        let position = member(&descriptor, "position").ty.resolve();
        assert_eq!(position.name.short, "Point");
        assert_eq!(position.name.qualified, TypeName::of::<Point>().qualified);
        assert_eq!(position.as_struct().unwrap().fields.len(), 2);
    }

    #[test]
    fn test_recursive_type_terminates() {
        let descriptor = describe::<Node>().unwrap();
        let children = member(&descriptor, "children").ty.resolve();
        assert_eq!(children.kind(), SchemaKind::Array);
    }

    #[test]
    fn test_nullable_branches() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": {"anyOf": [{"type": "integer", "format": "int32"}, {"type": "null"}]},
                "b": {"type": ["number", "null"], "format": "float"},
                "c": {"oneOf": [{"type": "string"}, {"type": "integer"}]}
            }
        });
        let descriptor = describe_value(&schema, TypeName::from_qualified("demo.Mixed")).unwrap();
        assert_eq!(member(&descriptor, "a").ty.resolve().kind(), SchemaKind::Integer);
        assert!(matches!(
            member(&descriptor, "b").ty.resolve().shape,
            Shape::Float { bits: 32 }
        ));
        assert!(matches!(member(&descriptor, "c").ty.resolve().shape, Shape::Any));
    }

    #[test]
    fn test_enum_and_default_annotation() {
        let schema = json!({
            "type": "object",
            "required": ["mode"],
            "properties": {
                "mode": {"type": "string", "enum": ["fast", "slow"], "default": "fast"},
                "extra": {"type": "object", "additionalProperties": {"type": "integer"}}
            }
        });
        let descriptor = describe_value(&schema, TypeName::from_qualified("demo.Config")).unwrap();
        let constraints = Constraints::parse(&member(&descriptor, "mode").annotation);
        assert!(constraints.required);
        assert_eq!(constraints.one_of, ["fast", "slow"]);
        assert_eq!(constraints.default.as_deref(), Some("fast"));
        assert!(matches!(
            member(&descriptor, "extra").ty.resolve().shape,
            Shape::Map { .. }
        ));
    }

    #[test]
    fn test_bad_references() {
        let missing = json!({"$ref": "#/$defs/Missing"});
        let err = describe_value(&missing, TypeName::from_qualified("demo.X")).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference(ref r) if r == "#/$defs/Missing"));

        let remote = json!({"$ref": "https://example.com/schema.json"});
        let err = describe_value(&remote, TypeName::from_qualified("demo.X")).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedReference(_)));
        assert_eq!(err.kind(), "bad_reference");
    }

    #[test]
    fn test_module_of() {
        assert_eq!(module_of("a.b.Point"), "a.b");
        assert_eq!(module_of("a.b.Wrapper<a.b.X>"), "a.b");
        assert_eq!(module_of("Point"), "");
    }
}
