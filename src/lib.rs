//! Model Schema Library
//!
//! Derives JSON-Schema/OpenAPI component documents from statically declared
//! data models. Models describe their structure through [`Describe`] (usually
//! via the [`model!`] macro), a [`Reflector`] records them in a deduplicated
//! [`Registry`], and [`schema`] renders the registered metadata.
//!
//! ```rust
//! use std::sync::Arc;
//! use model_schema::{model, Reflector, Registry};
//!
//! model! {
//!     pub struct Point {
//!         pub x: i64 => r#"binding:"required""#,
//!         pub y: i64 => r#"binding:"required""#,
//!     }
//! }
//!
//! let reflector = Reflector::new(Arc::new(Registry::new()));
//! let meta = reflector.reflect::<Point>();
//! let doc = model_schema::ModelSchema::from_metadata(&meta).to_value().unwrap();
//! assert_eq!(doc["required"], serde_json::json!(["x", "y"]));
//! ```

pub mod annotation;
pub mod bridge;
pub mod builtins;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod kind;
pub mod logging;
pub mod metadata;
pub mod qmodel;
pub mod reflect;
pub mod registry;
pub mod schema;

// Re-export key types
pub use annotation::{Constraints, Tags};
pub use builtins::{BaseModel, ValidationError};
pub use config::ReflectOptions;
pub use descriptor::{Describe, FieldDef, Model, Shape, TypeDescriptor, TypeName, TypeRef};
pub use error::{SchemaError, SchemaResult};
pub use kind::SchemaKind;
pub use metadata::{Field, ItemRef, Metadata};
pub use qmodel::QModel;
pub use reflect::Reflector;
pub use registry::Registry;
pub use schema::{Components, FieldSchema, Items, ModelSchema, REF_PREFIX};
