//! Error types for schema loading and value synthesis

use thiserror::Error;

/// Errors that can occur while loading schemas or synthesizing values
#[derive(Debug, Error)]
pub enum SynthError {
    /// Neither a document nor raw schema data was supplied, or a source file is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A schema node could not be decoded
    #[error("Invalid schema at '{path}': {reason}")]
    InvalidSchema { path: String, reason: String },

    /// The requested root schema is not in the registry
    #[error("Schema not found: '{0}'")]
    SchemaNotFound(String),

    /// A `$ref` points at a schema name absent from the registry
    #[error("Reference not found: '{reference}' (looked up '{name}')")]
    ReferenceNotFound { reference: String, name: String },

    /// A `$ref` points into another document
    #[error("External reference not supported: '{0}'")]
    ExternalReference(String),

    /// The root schema does not describe an object
    #[error("Schema '{0}' does not describe an object")]
    NotAnObject(String),

    /// Strict mode hit a type or item shape the synthesizer cannot produce
    #[error("Unsupported type '{type_name}' at '{path}'")]
    UnsupportedType { path: String, type_name: String },

    /// Constraints admit no value
    #[error("Unsatisfiable constraint at '{path}': {reason}")]
    UnsatisfiableConstraint { path: String, reason: String },

    /// A `pattern` could not be compiled into a generator
    #[error("Invalid pattern '{pattern}' at '{path}': {reason}")]
    Pattern {
        path: String,
        pattern: String,
        reason: String,
    },

    /// Recursion limit reached, usually a cyclic schema
    #[error("Maximum depth ({max_depth}) exceeded at '{path}'")]
    DepthExceeded { path: String, max_depth: usize },

    /// IO error while reading a document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for synthesis operations
pub type SynthResult<T> = Result<T, SynthError>;
