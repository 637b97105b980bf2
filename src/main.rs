//! Component Schema Dump
//!
//! Reflects a handful of demo models and prints the resulting OpenAPI
//! `components` section.

use {
    anyhow::Result,
    model_schema::{logging, model, BaseModel, Reflector, Registry},
    std::sync::Arc,
};

model! {
    #[derive(Debug, Clone, Default)]
    pub struct PositionGeo: "Geographic position" {
        pub longitude: f64 => r#"json:"longitude" binding:"required" gte:"-180" lte:"180" description:"longitude""#,
        pub latitude: f64 => r#"json:"latitude" binding:"required" gte:"-90" lte:"90" description:"latitude""#,
    }
}

model! {
    #[derive(Debug, Clone, Default)]
    pub struct Step: "One step of an action" {
        pub base: BaseModel,
        pub click: bool => r#"json:"click" default:"false" description:"click before moving""#,
        pub position: PositionGeo => r#"json:"position" binding:"required""#,
    }
}

model! {
    #[derive(Debug, Clone, Default)]
    pub struct Action: "Ordered list of steps" {
        pub base: BaseModel,
        pub name: String => r#"json:"name" binding:"required" min:"1" max:"64""#,
        pub steps: Vec<Step> => r#"json:"steps" description:"steps to run""#,
        pub speed: u8 => r#"json:"speed" oneof:"1 2 3" default:"2""#,
    }
}

model! {
    #[derive(Debug, Clone, Default)]
    pub struct SimpleForm: "Simple form" {
        pub base: BaseModel,
        pub name: String => r#"json:"name" binding:"required" description:"user name""#,
        pub age: i32 => r#"json:"age" gte:"0" lte:"150" default:"18""#,
        pub tags: Vec<String> => r#"json:"tags""#,
        pub action: Option<Box<Action>> => r#"json:"action""#,
        pub _internal: String,
    }
}

fn main() -> Result<()> {
    // Initialize structured logging with tracing
    logging::init_tracing();

    let registry = Registry::with_builtins();
    let reflector = Reflector::new(Arc::clone(&registry));

    reflector.reflect::<SimpleForm>();
    reflector.reflect_list::<Step>();

    println!("{}", serde_json::to_string_pretty(&registry.components())?);

    Ok(())
}
