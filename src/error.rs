use std::fmt;

use thiserror::Error;

/// A single field-level violation of the input document schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON path to the offending value (`root` for the document itself).
    pub path: String,
    /// Human-readable description of the violated constraint.
    pub message: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .take(3)
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("JSON schema validation failed - {}", format_violations(violations))]
    InputSchemaViolation { violations: Vec<SchemaViolation> },

    #[error("unresolved {link} reference: no {entity} with id '{target}'")]
    Reference {
        /// Description of the link that failed to resolve, e.g. `datas[0].links[1]`.
        link: String,
        /// Entity class the link points into (task, connector, phenotype).
        entity: &'static str,
        /// The id that did not resolve.
        target: String,
    },

    #[error("generated markup failed schema validation: {detail}")]
    OutputSchemaViolation { detail: String },

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("request timeout: {url} after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("schema not found: {url}")]
    SchemaNotFound { url: String },

    #[error("cache error: {0}")]
    Cache(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("markup emission error: {0}")]
    Emit(String),
}

impl ConvertError {
    /// Build an input-schema error from a list of violations.
    pub fn input_violations(violations: Vec<SchemaViolation>) -> Self {
        ConvertError::InputSchemaViolation { violations }
    }
}

impl From<quick_xml::Error> for ConvertError {
    fn from(err: quick_xml::Error) -> Self {
        ConvertError::Emit(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ConvertError>;
