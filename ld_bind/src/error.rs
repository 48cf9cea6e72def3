use thiserror::Error;

#[derive(Debug, Error)]
pub enum LDError {
    #[error("malformed @context: expected a string, object or array, found {found}")]
    MalformedContext { found: &'static str },

    #[error("malformed context term '{term}': expected a string, object or null, found {found}")]
    MalformedContextTerm { term: String, found: &'static str },

    #[error("expected an ID, found {found}")]
    ExpectedId { found: &'static str },

    #[error("expected a string, found {found}")]
    ExpectedString { found: &'static str },

    #[error("expected an integer, found {found}")]
    ExpectedInteger { found: String },

    #[error("expected a boolean, found {found}")]
    ExpectedBoolean { found: &'static str },

    #[error("expected a double, found {found}")]
    ExpectedDouble { found: String },

    #[error("expected a URI, found {found}")]
    ExpectedUri { found: &'static str },

    #[error("fetching remote contexts is disabled (context '{url}')")]
    RemoteContextDisabled { url: String },

    #[error("type mismatch for '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: String,
        found: String,
    },

    #[error("failed to fetch context from {url}: {source}")]
    Fetch {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LDResult<T> = Result<T, LDError>;

/// Short name of a JSON value's kind, used in error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
