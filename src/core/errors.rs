use thiserror::Error;

/// Unified error type for the choreo library
#[derive(Debug, Error)]
pub enum ChoreoError {
    /// Errors in the declarative activity description
    #[error("Authoring error: {message}")]
    Authoring { message: String },

    /// Validation errors (duplicate ids, malformed fields)
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Execution-related errors
    #[error("Execution failed at node {node}: {message}")]
    Execution { node: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// IO errors
    #[error("IO operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("YAML parsing failed")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON handling errors
    #[error("JSON handling failed")]
    Json(#[from] serde_json::Error),
}

impl ChoreoError {
    pub fn authoring(message: impl Into<String>) -> Self {
        Self::Authoring {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn execution(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            node: node.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type alias for choreo operations
pub type Result<T> = std::result::Result<T, ChoreoError>;
