//! Parameter Model Tests
//!
//! Query parameters from models and maps, path parameters from routes

use {
    model_schema::{qmodel, QModel, SchemaKind},
    serde_json::json,
    std::collections::BTreeMap,
};

mod helpers;
use helpers::*;

#[test]
fn test_query_params_from_model() {
    let params = QModel::from_model::<Account>();
    let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        ["userName", "age", "role", "scores", "points", "home", "extra"]
    );
    assert!(params.iter().all(|p| !p.in_path));

    let user = &params[0];
    assert!(user.required);
    assert_eq!(user.description(), "login name");

    let role = params[2].schema();
    assert_eq!(role["schema"]["default"], json!("user"));
    assert_eq!(params[3].kind, SchemaKind::Array);
}

#[test]
fn test_query_params_from_map() {
    let map = BTreeMap::from([("limit".to_string(), false), ("q".to_string(), true)]);
    let params = QModel::from_map(map);

    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name, "limit");
    assert!(!params[0].required);
    assert_eq!(params[1].name, "q");
    assert!(params[1].constraints().required);
    assert_eq!(params[1].schema()["required"], json!(true));
}

#[test]
fn test_path_params_from_route() {
    let params = QModel::from_path("/api/:org/repos/:repo?");
    assert_eq!(params.len(), 2);

    let org = params.iter().find(|p| p.name == "org").unwrap();
    assert!(org.required);
    assert!(org.in_path);

    let repo = params.iter().find(|p| p.name == "repo").unwrap();
    assert!(!repo.required);
    assert_eq!(
        repo.schema(),
        json!({
            "name": "repo",
            "in": "path",
            "required": false,
            "description": "field in path",
            "schema": {"title": "repo", "type": "string"}
        })
    );

    assert_eq!(qmodel::openapi_path("/api/:org/repos/:repo?"), "/api/{org}/repos/{repo}");
}

#[test]
fn test_route_without_params() {
    assert!(QModel::from_path("/health").is_empty());
    assert!(qmodel::path_params("").is_empty());
}
