//! Metadata records
//!
//! A [`Metadata`] is the structural identity of one named type: its root
//! fields in declaration order plus the inner fields collected from nested
//! structs. Fields reference other models by qualified name only; the
//! [`Registry`](crate::registry::Registry) owns every record.

use {
    crate::{
        annotation::{self, Constraints},
        descriptor::TypeName,
        kind::SchemaKind,
    },
    once_cell::sync::OnceCell,
    serde_json::Value,
    std::collections::HashSet,
};

/// Element or target reference of an array/object field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    /// Basic element kind, e.g. the `string` of `Vec<String>`
    Kind(SchemaKind),
    /// Qualified name of a registered (or registrable) model
    Model(String),
    /// Nested sequence, e.g. `Vec<Vec<i32>>`
    Array(Box<ItemRef>),
}

impl ItemRef {
    /// Qualified model name at the bottom of this reference, if any.
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Model(name) => Some(name),
            Self::Array(inner) => inner.model(),
            Self::Kind(_) => None,
        }
    }
}

/// One recorded struct member.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    index: usize,
    annotation: String,
    kind: SchemaKind,
    item_ref: Option<ItemRef>,
    exported: bool,
    embedded: bool,
    constraints: Constraints,
    default: OnceCell<Option<Value>>,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        index: usize,
        annotation: impl Into<String>,
        kind: SchemaKind,
    ) -> Self {
        let annotation = annotation.into();
        Self {
            name: name.into(),
            index,
            constraints: Constraints::parse(&annotation),
            annotation,
            kind,
            item_ref: None,
            exported: true,
            embedded: false,
            default: OnceCell::new(),
        }
    }

    /// Attach an item reference. Ignored for basic kinds.
    pub fn with_item_ref(mut self, item_ref: Option<ItemRef>) -> Self {
        self.item_ref = if self.kind.is_basic() { None } else { item_ref };
        self
    }

    pub fn exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    pub fn embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property name in rendered documents: the `json` tag name, else the
    /// member name.
    pub fn json_name(&self) -> &str {
        self.constraints.json_name.as_deref().unwrap_or(&self.name)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn item_ref(&self) -> Option<&ItemRef> {
        self.item_ref.as_ref()
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn is_required(&self) -> bool {
        self.exported && self.constraints.required
    }

    /// Whether the member shows up as a document property. Embedded members
    /// never do.
    pub fn is_property(&self) -> bool {
        self.exported && !self.embedded
    }

    pub fn description(&self) -> &str {
        self.constraints.description_or(&self.name)
    }

    /// Default coerced to the field kind; computed on first access.
    pub fn default_value(&self) -> Option<&Value> {
        self.default
            .get_or_init(|| {
                self.constraints
                    .default
                    .as_deref()
                    .and_then(|raw| annotation::coerce_default(&self.name, raw, self.kind))
            })
            .as_ref()
    }
}

/// Structural description of one named type.
#[derive(Debug, Clone)]
pub struct Metadata {
    name: TypeName,
    description: String,
    kind: SchemaKind,
    fields: Vec<Field>,
    inner_fields: Vec<Field>,
    items: Option<ItemRef>,
}

impl Metadata {
    pub fn new(name: TypeName, kind: SchemaKind) -> Self {
        Self {
            description: name.short.clone(),
            name,
            kind,
            fields: Vec::new(),
            inner_fields: Vec::new(),
            items: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_inner_field(mut self, field: Field) -> Self {
        self.inner_fields.push(field);
        self
    }

    /// Element reference of an array-kind record such as `List[T]`.
    pub fn with_items(mut self, items: ItemRef) -> Self {
        self.items = Some(items);
        self
    }

    pub(crate) fn push_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub(crate) fn push_inner_field(&mut self, field: Field) {
        self.inner_fields.push(field);
    }

    pub(crate) fn set_kind(&mut self, kind: SchemaKind) {
        self.kind = kind;
    }

    pub(crate) fn set_items(&mut self, items: ItemRef) {
        self.items = Some(items);
    }

    /// Short type name.
    pub fn name(&self) -> &str {
        &self.name.short
    }

    /// Fully qualified name; the registry key.
    pub fn qualified_name(&self) -> &str {
        &self.name.qualified
    }

    pub fn id(&self) -> &str {
        self.qualified_name()
    }

    pub fn type_name(&self) -> &TypeName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn inner_fields(&self) -> &[Field] {
        &self.inner_fields
    }

    pub fn items(&self) -> Option<&ItemRef> {
        self.items.as_ref()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Root fields rendered as properties, in declaration order. Only the
    /// first member claiming a property name is kept.
    pub fn property_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        let mut seen = HashSet::new();
        self.fields
            .iter()
            .filter(|f| f.is_property())
            .filter(move |&f| seen.insert(f.json_name()))
    }

    /// Property names of required root fields, in declaration order.
    pub fn required(&self) -> Vec<String> {
        self.property_fields()
            .filter(|f| f.is_required())
            .map(|f| f.json_name().to_string())
            .collect()
    }
}
