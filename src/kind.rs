//! Schema kind classification
//!
//! Maps a structural [`Shape`] onto one of the six primitive categories used
//! by JSON Schema documents.

use {
    crate::descriptor::Shape,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// One of the six schema primitive categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Integer,
    Number,
    String,
    Boolean,
    Array,
    Object,
}

impl SchemaKind {
    /// Classify a shape. Total: anything without a scalar or sequence
    /// interpretation is an object.
    pub fn classify(shape: &Shape) -> Self {
        match shape {
            Shape::Seq { .. } => Self::Array,
            Shape::Str | Shape::Char => Self::String,
            Shape::Bool => Self::Boolean,
            Shape::Integer { .. } => Self::Integer,
            Shape::Float { .. } => Self::Number,
            Shape::Pointer(inner) => Self::classify(&inner.resolve().shape),
            Shape::Struct(_) | Shape::Map { .. } | Shape::Any | Shape::Unit | Shape::Reference(_) => {
                Self::Object
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Scalar kinds never carry an item reference.
    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Integer | Self::Number | Self::String | Self::Boolean)
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Describe, TypeDescriptor};
    use std::collections::HashMap;

    fn kind_of<T: Describe + ?Sized>() -> SchemaKind {
        SchemaKind::classify(&T::describe().shape)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(kind_of::<i8>(), SchemaKind::Integer);
        assert_eq!(kind_of::<u64>(), SchemaKind::Integer);
        assert_eq!(kind_of::<usize>(), SchemaKind::Integer);
        assert_eq!(kind_of::<f32>(), SchemaKind::Number);
        assert_eq!(kind_of::<f64>(), SchemaKind::Number);
        assert_eq!(kind_of::<String>(), SchemaKind::String);
        assert_eq!(kind_of::<str>(), SchemaKind::String);
        assert_eq!(kind_of::<char>(), SchemaKind::String);
        assert_eq!(kind_of::<bool>(), SchemaKind::Boolean);
    }

    #[test]
    fn test_sequences_are_arrays() {
        assert_eq!(kind_of::<Vec<u8>>(), SchemaKind::Array);
        assert_eq!(kind_of::<[i32; 4]>(), SchemaKind::Array);
        assert_eq!(kind_of::<std::collections::BTreeSet<String>>(), SchemaKind::Array);
    }

    #[test]
    fn test_pointers_classify_their_target() {
        assert_eq!(kind_of::<Option<i32>>(), SchemaKind::Integer);
        assert_eq!(kind_of::<Box<Option<String>>>(), SchemaKind::String);
        assert_eq!(kind_of::<std::sync::Arc<Vec<bool>>>(), SchemaKind::Array);
    }

    #[test]
    fn test_opaque_fallback_is_object() {
        assert_eq!(kind_of::<HashMap<String, i32>>(), SchemaKind::Object);
        assert_eq!(kind_of::<serde_json::Value>(), SchemaKind::Object);
        assert_eq!(kind_of::<()>(), SchemaKind::Object);
        let reference = TypeDescriptor::reference("demo.Node");
        assert_eq!(SchemaKind::classify(&reference.shape), SchemaKind::Object);
    }

    #[test]
    fn test_serializes_lowercase() {
        let value = serde_json::to_value(SchemaKind::Boolean).unwrap();
        assert_eq!(value, serde_json::json!("boolean"));
        assert_eq!(SchemaKind::Array.to_string(), "array");
        assert!(SchemaKind::Number.is_basic());
        assert!(!SchemaKind::Object.is_basic());
    }
}
