use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsonApiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No JSON:API document has been loaded")]
    NotLoaded,

    #[error("JSON:API document has no primary data")]
    MissingData,

    #[error("Relationship cycle detected at resource {resource_type}:{id}")]
    CycleDetected { resource_type: String, id: String },

    #[error("Unknown resource type: {0}")]
    UnknownType(String),

    #[error("Properties mapper failed: {0}")]
    Mapper(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, JsonApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Document,
    Mapper,
}

impl JsonApiError {
    /// Wraps an arbitrary error raised inside a properties mapper.
    pub fn mapper<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        JsonApiError::Mapper(Box::new(err))
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            JsonApiError::IoError(_) | JsonApiError::SerializationError(_) => ErrorCategory::Input,
            JsonApiError::ConfigError { .. } | JsonApiError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            JsonApiError::NotLoaded
            | JsonApiError::MissingData
            | JsonApiError::CycleDetected { .. } => ErrorCategory::Document,
            JsonApiError::UnknownType(_) | JsonApiError::Mapper(_) => ErrorCategory::Mapper,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            JsonApiError::IoError(_) => "Check that the input path exists and is readable",
            JsonApiError::SerializationError(_) => "Make sure the input is valid JSON",
            JsonApiError::ConfigError { .. } | JsonApiError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags"
            }
            JsonApiError::NotLoaded => "Load a document before calling build()",
            JsonApiError::MissingData => "Add a top-level 'data' member to the document",
            JsonApiError::CycleDetected { .. } => {
                "Remove the relationship cycle from 'included' or use the shallow cycle policy"
            }
            JsonApiError::UnknownType(_) => "Register the resource type with the properties mapper",
            JsonApiError::Mapper(_) => "Inspect the properties mapper implementation",
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => 1,
            ErrorCategory::Document | ErrorCategory::Mapper => 2,
        }
    }
}
