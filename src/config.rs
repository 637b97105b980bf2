//! Reflection options
//!
//! Controls how far the reflector descends and which members it records.

use {
    crate::descriptor::TypeDescriptor,
    serde::{Deserialize, Serialize},
};

/// Configuration for a [`Reflector`](crate::reflect::Reflector)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectOptions {
    /// Give every nested struct its own registry entry so `$ref`s resolve
    pub register_nested: bool,

    /// Maximum nesting depth expanded into inner fields
    pub max_depth: usize,

    /// Members whose name starts with this prefix are internal
    pub private_prefix: String,

    /// Drop members declared without visibility
    pub skip_unexported: bool,

    /// Short names of base-model marker types, never recorded as members
    pub base_markers: Vec<String>,
}

impl Default for ReflectOptions {
    fn default() -> Self {
        Self {
            register_nested: true,
            max_depth: 32,
            private_prefix: "_".to_string(),
            skip_unexported: true,
            base_markers: vec!["BaseModel".to_string()],
        }
    }
}

impl ReflectOptions {
    /// Only the submitted model is registered; nested structs are
    /// flattened into inner fields but get no entry of their own.
    pub fn flat() -> Self {
        Self {
            register_nested: false,
            ..Self::default()
        }
    }

    /// Shallow expansion for untrusted or very large type graphs
    pub fn strict() -> Self {
        Self {
            max_depth: 4,
            ..Self::default()
        }
    }

    pub fn is_base_marker(&self, short_name: &str) -> bool {
        self.base_markers.iter().any(|marker| marker == short_name)
    }

    /// Marker structs, either flagged in their descriptor or named in
    /// `base_markers`.
    pub fn is_marker(&self, ty: &TypeDescriptor) -> bool {
        ty.as_struct().map_or(false, |def| def.marker) || self.is_base_marker(&ty.name.short)
    }

    pub fn is_private(&self, member: &str) -> bool {
        !self.private_prefix.is_empty() && member.starts_with(&self.private_prefix)
    }
}
