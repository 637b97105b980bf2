use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    // Registry Errors
    #[error("Model not registered: {0}")]
    UnknownModel(String),

    // Import Errors
    #[error("Unresolved schema reference: {0}")]
    UnresolvedReference(String),

    #[error("Unsupported schema reference: {0}")]
    UnsupportedReference(String),

    // JSON Errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Short machine-readable tag, used as the `error` field in log events
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownModel(_) => "unknown_model",
            Self::UnresolvedReference(_) | Self::UnsupportedReference(_) => "bad_reference",
            Self::Json(_) => "json",
        }
    }
}

// Result type alias for convenience
pub type SchemaResult<T> = Result<T, SchemaError>;
