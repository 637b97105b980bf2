//! Test helpers for integration tests
//!
//! Shared demo models and constructors used across the reflection,
//! rendering and registry tests.

#![allow(dead_code)]

use {
    model_schema::{model, BaseModel, Model, Reflector, Registry},
    std::{collections::HashMap, sync::Arc},
};

model! {
    #[derive(Debug, Clone, Default)]
    pub struct Point: "A point on the plane" {
        pub x: i64 => r#"binding:"required""#,
        pub y: i64 => r#"binding:"required""#,
    }
}

model! {
    #[derive(Debug, Clone, Default)]
    pub struct Shape {
        pub name: String => r#"binding:"required""#,
        pub position: Point,
    }
}

model! {
    #[derive(Debug, Clone, Default)]
    pub struct Tagged {
        pub tags: Vec<String>,
    }
}

model! {
    #[derive(Debug, Clone, Default)]
    pub struct Node {
        pub name: String,
        pub children: Vec<Node>,
    }
}

model! {
    #[derive(Debug, Clone, Default)]
    pub struct Parent {
        pub label: String,
        pub child: Child,
    }
}

model! {
    #[derive(Debug, Clone, Default)]
    pub struct Child {
        pub parent: Option<Box<Parent>>,
        pub weight: f32,
    }
}

model! {
    #[derive(Debug, Clone, Default)]
    pub struct Defaults {
        pub count: i32 => r#"default:"7""#,
        pub ratio: f64 => r#"default:"0.5""#,
        pub flag: bool => r#"default:"true""#,
        pub label: String => r#"default:"hi""#,
        pub broken: i32 => r#"default:"abc""#,
    }
}

model! {
    #[derive(Debug, Clone, Default)]
    pub struct Account: "User account" {
        pub base: BaseModel,
        pub user_name: String => r#"json:"userName" validate:"required,min=1" min:"1" max:"32" description:"login name""#,
        pub age: u8 => r#"json:"age" gte:"18" lt:"130""#,
        pub role: String => r#"json:"role" oneof:"admin user guest" default:"user""#,
        pub scores: Vec<Vec<f64>> => r#"json:"scores" max:"10""#,
        pub points: Vec<Point> => r#"json:"points""#,
        pub home: Option<Point> => r#"json:"home""#,
        pub extra: HashMap<String, serde_json::Value> => r#"json:"extra""#,
        pub password: String => r#"json:"-""#,
        pub _cache: String,
        session: String,
    }
}

/// Reflector over a fresh, empty registry
pub fn reflector() -> Reflector {
    Reflector::new(Arc::new(Registry::new()))
}

/// Qualified name of `M`
pub fn name_of<M: Model>() -> String {
    M::schema_name(false)
}

/// Every `$ref` found anywhere in `value`
pub fn collect_refs(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, inner) in map {
                match (key.as_str(), inner) {
                    ("$ref", serde_json::Value::String(reference)) => out.push(reference.clone()),
                    _ => collect_refs(inner, out),
                }
            }
        }
        serde_json::Value::Array(items) => items.iter().for_each(|item| collect_refs(item, out)),
        _ => {}
    }
}
