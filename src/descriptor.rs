//! Type descriptors
//!
//! Rust has no runtime reflection, so every type that takes part in schema
//! derivation describes its own structure through [`Describe`]. Descriptors
//! exist for the std primitives and containers; user structs get one from
//! the [`model!`](crate::model) macro, and any `schemars::JsonSchema` type
//! can be imported through [`crate::bridge`].
//!
//! Struct members point at their types through a [`TypeRef`], which resolves
//! lazily. That keeps self-referential models (`Node { children: Vec<Node> }`)
//! finite as values.

use {
    crate::kind::SchemaKind,
    std::{
        collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
        rc::Rc,
        sync::Arc,
    },
};

/// Short and fully qualified name of a type.
///
/// The qualified name is the Rust type path with `::` replaced by `.`, which
/// keeps it usable as an OpenAPI component key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub short: String,
    pub qualified: String,
}

impl TypeName {
    pub fn new(short: impl Into<String>, qualified: impl Into<String>) -> Self {
        Self {
            short: short.into(),
            qualified: qualified.into(),
        }
    }

    /// Name of `T` as reported by `std::any::type_name`.
    pub fn of<T: ?Sized>() -> Self {
        Self::from_type_path(std::any::type_name::<T>())
    }

    /// Build a name from a Rust type path such as `demo::shapes::Point`.
    pub fn from_type_path(path: &str) -> Self {
        Self {
            short: strip_module_paths(path),
            qualified: path.replace("::", "."),
        }
    }

    /// Build a name from an already qualified, dot separated name.
    pub fn from_qualified(qualified: impl Into<String>) -> Self {
        let qualified = qualified.into();
        let short = qualified
            .rsplit('.')
            .next()
            .unwrap_or(qualified.as_str())
            .to_string();
        Self { short, qualified }
    }
}

// `alloc::vec::Vec<alloc::string::String>` -> `Vec<String>`
fn strip_module_paths(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut segment_start = 0;
    let mut chars = path.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
            continue;
        }
        out.push(c);
        if !(c.is_alphanumeric() || c == '_') {
            segment_start = out.len();
        }
    }
    out
}

/// Lazily resolved reference to a member's type.
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// Resolved by calling the type's `Describe::describe`.
    Static(fn() -> TypeDescriptor),
    /// Built at runtime, e.g. imported from a JSON Schema.
    Shared(Arc<TypeDescriptor>),
}

impl TypeRef {
    pub fn of<T: Describe + ?Sized>() -> Self {
        Self::Static(<T as Describe>::describe)
    }

    pub fn resolve(&self) -> Arc<TypeDescriptor> {
        match self {
            Self::Static(describe) => Arc::new(describe()),
            Self::Shared(descriptor) => Arc::clone(descriptor),
        }
    }
}

impl From<TypeDescriptor> for TypeRef {
    fn from(descriptor: TypeDescriptor) -> Self {
        Self::Shared(Arc::new(descriptor))
    }
}

/// Structural shape of a type.
#[derive(Debug, Clone)]
pub enum Shape {
    Bool,
    Char,
    Str,
    Integer { signed: bool, bits: u16 },
    Float { bits: u16 },
    /// Vectors, slices, fixed arrays and sets.
    Seq { element: TypeRef, len: Option<usize> },
    /// Opaque key/value container.
    Map { key: TypeRef, value: TypeRef },
    /// `Option`, `Box`, `Arc`, `Rc` and references; stripped before use.
    Pointer(TypeRef),
    Struct(StructDef),
    /// Dynamically typed value such as `serde_json::Value`.
    Any,
    Unit,
    /// Named struct described elsewhere; never expanded.
    Reference(TypeName),
}

#[derive(Debug, Clone, Default)]
pub struct StructDef {
    pub fields: Vec<FieldDef>,
    /// Base-model marker types carry no schema-visible members.
    pub marker: bool,
}

/// A declared struct member.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    /// Raw annotation in struct-tag syntax: `key:"value" key2:"value2"`.
    pub annotation: String,
    pub exported: bool,
    pub embedded: bool,
    pub ty: TypeRef,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            annotation: String::new(),
            exported: true,
            embedded: false,
            ty,
        }
    }

    pub fn of<T: Describe + ?Sized>(name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::of::<T>())
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }

    pub fn exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    pub fn embedded(self) -> Self {
        self.embedded_if(true)
    }

    pub fn embedded_if(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }
}

#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: TypeName,
    pub description: Option<String>,
    pub shape: Shape,
}

impl TypeDescriptor {
    pub fn new(name: TypeName, shape: Shape) -> Self {
        Self {
            name,
            description: None,
            shape,
        }
    }

    pub fn of_shape<T: ?Sized>(shape: Shape) -> Self {
        Self::new(TypeName::of::<T>(), shape)
    }

    pub fn structure(name: TypeName, fields: Vec<FieldDef>) -> Self {
        Self::new(
            name,
            Shape::Struct(StructDef {
                fields,
                marker: false,
            }),
        )
    }

    pub fn marker(name: TypeName) -> Self {
        Self::new(
            name,
            Shape::Struct(StructDef {
                fields: Vec::new(),
                marker: true,
            }),
        )
    }

    pub fn reference(qualified: impl Into<String>) -> Self {
        let name = TypeName::from_qualified(qualified);
        Self::new(name.clone(), Shape::Reference(name))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn kind(&self) -> SchemaKind {
        SchemaKind::classify(&self.shape)
    }

    pub fn as_struct(&self) -> Option<&StructDef> {
        match &self.shape {
            Shape::Struct(def) => Some(def),
            _ => None,
        }
    }

    /// Strip every pointer layer.
    pub fn indirect(self: Arc<Self>) -> Arc<Self> {
        let mut current = self;
        while let Shape::Pointer(target) = &current.shape {
            current = target.resolve();
        }
        current
    }
}

/// Implemented by every type that can appear in a model.
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

/// A type that can be submitted for reflection and registration.
///
/// Every method has a default derived from the descriptor; models override
/// `schema_desc` to give the document a human description.
pub trait Model: Describe {
    /// Qualified name, or the short name when `exclude_package` is set.
    fn schema_name(exclude_package: bool) -> String {
        let name = Self::describe().name;
        if exclude_package {
            name.short
        } else {
            name.qualified
        }
    }

    fn schema_desc() -> String {
        let descriptor = Self::describe();
        descriptor.description.unwrap_or(descriptor.name.short)
    }

    fn schema_type() -> SchemaKind {
        SchemaKind::Object
    }

    fn is_required() -> bool {
        true
    }
}

macro_rules! describe_scalars {
    ($($ty:ty => $shape:expr;)*) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::of_shape::<$ty>($shape)
                }
            }
        )*
    };
}

describe_scalars! {
    bool => Shape::Bool;
    char => Shape::Char;
    str => Shape::Str;
    String => Shape::Str;
    i8 => Shape::Integer { signed: true, bits: 8 };
    i16 => Shape::Integer { signed: true, bits: 16 };
    i32 => Shape::Integer { signed: true, bits: 32 };
    i64 => Shape::Integer { signed: true, bits: 64 };
    i128 => Shape::Integer { signed: true, bits: 128 };
    isize => Shape::Integer { signed: true, bits: isize::BITS as u16 };
    u8 => Shape::Integer { signed: false, bits: 8 };
    u16 => Shape::Integer { signed: false, bits: 16 };
    u32 => Shape::Integer { signed: false, bits: 32 };
    u64 => Shape::Integer { signed: false, bits: 64 };
    u128 => Shape::Integer { signed: false, bits: 128 };
    usize => Shape::Integer { signed: false, bits: usize::BITS as u16 };
    f32 => Shape::Float { bits: 32 };
    f64 => Shape::Float { bits: 64 };
    () => Shape::Unit;
    serde_json::Value => Shape::Any;
}

impl Describe for serde_json::Map<String, serde_json::Value> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::of_shape::<Self>(Shape::Map {
            key: TypeRef::of::<String>(),
            value: TypeRef::of::<serde_json::Value>(),
        })
    }
}

fn seq<C: ?Sized, T: Describe + ?Sized>(len: Option<usize>) -> TypeDescriptor {
    TypeDescriptor::of_shape::<C>(Shape::Seq {
        element: TypeRef::of::<T>(),
        len,
    })
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        seq::<Self, T>(None)
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        seq::<Self, T>(None)
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> TypeDescriptor {
        seq::<Self, T>(None)
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        seq::<Self, T>(Some(N))
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe() -> TypeDescriptor {
        seq::<Self, T>(None)
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> TypeDescriptor {
        seq::<Self, T>(None)
    }
}

fn pointer<P: ?Sized, T: Describe + ?Sized>() -> TypeDescriptor {
    TypeDescriptor::of_shape::<P>(Shape::Pointer(TypeRef::of::<T>()))
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        pointer::<Self, T>()
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe() -> TypeDescriptor {
        pointer::<Self, T>()
    }
}

impl<T: Describe + ?Sized> Describe for Arc<T> {
    fn describe() -> TypeDescriptor {
        pointer::<Self, T>()
    }
}

impl<T: Describe + ?Sized> Describe for Rc<T> {
    fn describe() -> TypeDescriptor {
        pointer::<Self, T>()
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn describe() -> TypeDescriptor {
        pointer::<Self, T>()
    }
}

fn map<M: ?Sized, K: Describe, V: Describe>() -> TypeDescriptor {
    TypeDescriptor::of_shape::<M>(Shape::Map {
        key: TypeRef::of::<K>(),
        value: TypeRef::of::<V>(),
    })
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        map::<Self, K, V>()
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        map::<Self, K, V>()
    }
}

/// Declare a struct together with its [`Describe`] and [`Model`] impls.
///
/// Each member may carry an annotation in struct-tag syntax after `=>`.
/// Members declared without a visibility are recorded as unexported, and
/// members prefixed with `@embedded` are recorded as embedded: they are
/// walked like any other member but never rendered as properties.
///
/// # Example
///
/// ```rust
/// use model_schema::model;
///
/// model! {
///     #[derive(Debug, Clone, Default)]
///     pub struct Point: "A point on the plane" {
///         pub x: i64 => r#"binding:"required" description:"abscissa""#,
///         pub y: i64 => r#"binding:"required""#,
///     }
/// }
///
/// model! {
///     pub struct Shape {
///         pub name: String => r#"validate:"required" max:"64""#,
///         pub position: Point,
///         @embedded pub origin: Point,
///     }
/// }
/// ```
#[macro_export]
macro_rules! model {
    (@tag) => { "" };
    (@tag $tag:literal) => { $tag };
    (@embed) => { false };
    (@embed embedded) => { true };
    (
        $(#[$attr:meta])*
        $svis:vis struct $name:ident $(: $desc:literal)? {
            $(
                $(#[$fattr:meta])*
                $(@$embed:ident)?
                $fvis:vis $field:ident : $fty:ty $(=> $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        $svis struct $name {
            $( $(#[$fattr])* $fvis $field: $fty, )*
        }

        impl $crate::descriptor::Describe for $name {
            fn describe() -> $crate::descriptor::TypeDescriptor {
                let fields = ::std::vec![
                    $(
                        $crate::descriptor::FieldDef::of::<$fty>(stringify!($field))
                            .with_annotation($crate::model!(@tag $($tag)?))
                            .exported(!stringify!($fvis).is_empty())
                            .embedded_if($crate::model!(@embed $($embed)?)),
                    )*
                ];
                $crate::descriptor::TypeDescriptor::structure(
                    $crate::descriptor::TypeName::of::<Self>(),
                    fields,
                )
                $( .with_description($desc) )?
            }
        }

        impl $crate::descriptor::Model for $name {}
    };
}
