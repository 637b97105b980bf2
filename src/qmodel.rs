//! Query and path parameters
//!
//! A [`QModel`] is one request parameter. Query parameters come from the
//! exported members of a model or from a `name -> required` map; path
//! parameters come from route patterns such as `/users/:id/files/:name?`.

use {
    crate::{
        annotation::{self, Constraints},
        config::ReflectOptions,
        descriptor::{Model, TypeDescriptor},
        kind::SchemaKind,
    },
    serde::{Deserialize, Serialize},
    serde_json::{json, Value},
    std::collections::BTreeMap,
};

pub const PATH_SEPARATOR: &str = "/";
pub const PATH_PARAM_PREFIX: &str = ":";
pub const OPTIONAL_PATH_PARAM_SUFFIX: &str = "?";

const REQUIRED_ANNOTATION: &str = r#"binding:"required" validate:"required""#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QModel {
    pub name: String,
    pub required: bool,
    pub in_path: bool,
    pub annotation: String,
    pub kind: SchemaKind,
}

impl QModel {
    /// Path parameter; always a string.
    pub fn path(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
            in_path: true,
            annotation: String::new(),
            kind: SchemaKind::String,
        }
    }

    /// One query parameter per exported struct member, named by its `json`
    /// tag when present. Private members and base markers are left out,
    /// as the default [`ReflectOptions`] define them.
    pub fn from_descriptor(descriptor: &TypeDescriptor) -> Vec<Self> {
        Self::from_descriptor_with(descriptor, &ReflectOptions::default())
    }

    /// Like [`QModel::from_descriptor`], with the skip rules of `options`.
    pub fn from_descriptor_with(descriptor: &TypeDescriptor, options: &ReflectOptions) -> Vec<Self> {
        let Some(def) = descriptor.as_struct() else {
            return Vec::new();
        };

        def.fields
            .iter()
            .filter(|member| member.exported || !options.skip_unexported)
            .filter(|member| !options.is_private(&member.name))
            .filter_map(|member| {
                let constraints = Constraints::parse(&member.annotation);
                let ty = member.ty.resolve().indirect();
                if constraints.skip || options.is_marker(&ty) {
                    return None;
                }
                Some(Self {
                    name: constraints
                        .json_name
                        .clone()
                        .unwrap_or_else(|| member.name.clone()),
                    required: constraints.required,
                    in_path: false,
                    annotation: member.annotation.clone(),
                    kind: ty.kind(),
                })
            })
            .collect()
    }

    pub fn from_model<M: Model>() -> Vec<Self> {
        Self::from_descriptor(&M::describe())
    }

    pub fn from_model_with<M: Model>(options: &ReflectOptions) -> Vec<Self> {
        Self::from_descriptor_with(&M::describe(), options)
    }

    /// Query parameters from `name -> required` pairs.
    pub fn from_map<I, K>(params: I) -> Vec<Self>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        params
            .into_iter()
            .map(|(name, required)| {
                let name = name.into();
                let annotation = if required {
                    format!(r#"json:"{name}" {REQUIRED_ANNOTATION}"#)
                } else {
                    format!(r#"json:"{name}""#)
                };
                Self {
                    name,
                    required,
                    in_path: false,
                    annotation,
                    kind: SchemaKind::String,
                }
            })
            .collect()
    }

    /// Path parameters declared by a route pattern.
    pub fn from_path(path: &str) -> Vec<Self> {
        path_params(path)
            .into_iter()
            .map(|(name, required)| Self::path(name, required))
            .collect()
    }

    pub fn constraints(&self) -> Constraints {
        Constraints::parse(&self.annotation)
    }

    pub fn description(&self) -> String {
        match self.constraints().description {
            Some(description) => description,
            None if self.in_path => "field in path".to_string(),
            None => "field in query".to_string(),
        }
    }

    /// OpenAPI parameter object.
    pub fn schema(&self) -> Value {
        let mut schema = json!({
            "title": self.name,
            "type": self.kind,
        });
        if let Some(default) = self
            .constraints()
            .default
            .and_then(|raw| annotation::coerce(&raw, self.kind))
        {
            schema["default"] = default;
        }

        let location = if self.in_path { "path" } else { "query" };
        json!({
            "name": self.name,
            "in": location,
            "required": self.required,
            "description": self.description(),
            "schema": schema,
        })
    }
}

/// `name -> required` for every `:name` (required) or `:name?` (optional)
/// segment of `path`.
pub fn path_params(path: &str) -> BTreeMap<String, bool> {
    path.split(PATH_SEPARATOR)
        .filter_map(|segment| segment.strip_prefix(PATH_PARAM_PREFIX))
        .map(|param| match param.strip_suffix(OPTIONAL_PATH_PARAM_SUFFIX) {
            Some(name) => (name.to_string(), false),
            None => (param.to_string(), true),
        })
        .collect()
}

/// Rewrite `:name` / `:name?` segments into OpenAPI `{name}` templates.
pub fn openapi_path(path: &str) -> String {
    path.split(PATH_SEPARATOR)
        .map(|segment| match segment.strip_prefix(PATH_PARAM_PREFIX) {
            Some(param) => {
                let name = param
                    .strip_suffix(OPTIONAL_PATH_PARAM_SUFFIX)
                    .unwrap_or(param);
                format!("{{{name}}}")
            }
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}
