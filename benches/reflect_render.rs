//! Reflection and Rendering Benchmarks
//!
//! These benchmarks compare a cold reflection (fresh registry) with a cached
//! one, and measure rendering of single documents and whole component maps.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use model_schema::{model, ModelSchema, Reflector, Registry, Tags};
use std::sync::Arc;

model! {
    pub struct Point {
        pub x: i64 => r#"binding:"required" gte:"-1000" lte:"1000""#,
        pub y: i64 => r#"binding:"required" gte:"-1000" lte:"1000""#,
    }
}

model! {
    pub struct Route: "A route through several points" {
        pub name: String => r#"json:"name" binding:"required" min:"1" max:"64" description:"route name""#,
        pub points: Vec<Point> => r#"json:"points" max:"500""#,
        pub start: Point => r#"json:"start""#,
        pub tags: Vec<String> => r#"json:"tags""#,
        pub speed: f64 => r#"json:"speed" default:"1.5""#,
        pub mode: String => r#"json:"mode" oneof:"walk bike car" default:"walk""#,
    }
}

model! {
    pub struct Tree {
        pub label: String,
        pub children: Vec<Tree>,
        pub route: Option<Route>,
    }
}

const ANNOTATION: &str = r#"json:"user_name" binding:"required" min:"1" max:"32" default:"guest" description:"login name" oneof:"guest admin""#;

fn benchmark_annotation_parsing(c: &mut Criterion) {
    c.bench_function("tags_parse", |b| {
        b.iter(|| Tags::parse(black_box(ANNOTATION)))
    });
}

fn benchmark_reflection(c: &mut Criterion) {
    let mut group = c.benchmark_group("reflection");

    group.bench_function("cold_route", |b| {
        b.iter(|| {
            let reflector = Reflector::new(Arc::new(Registry::new()));
            black_box(reflector.reflect::<Route>())
        })
    });

    group.bench_function("cold_recursive_tree", |b| {
        b.iter(|| {
            let reflector = Reflector::new(Arc::new(Registry::new()));
            black_box(reflector.reflect::<Tree>())
        })
    });

    let reflector = Reflector::new(Arc::new(Registry::new()));
    reflector.reflect::<Route>();
    group.bench_function("cached_route", |b| {
        b.iter(|| black_box(reflector.reflect::<Route>()))
    });

    group.finish();
}

fn benchmark_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");

    let registry = Registry::with_builtins();
    let reflector = Reflector::new(Arc::clone(&registry));
    let route = reflector.reflect::<Route>();
    reflector.reflect::<Tree>();

    group.bench_function("model_document", |b| {
        b.iter(|| ModelSchema::from_metadata(black_box(&route)).to_value().unwrap())
    });

    group.bench_function("components_json", |b| {
        b.iter(|| serde_json::to_string(&registry.components()).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_annotation_parsing,
    benchmark_reflection,
    benchmark_rendering
);
criterion_main!(benches);
