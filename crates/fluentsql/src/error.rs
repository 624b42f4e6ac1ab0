//! Error types for fluentsql

use thiserror::Error;

/// Result type alias for fluentsql operations
pub type FluentResult<T> = Result<T, FluentError>;

/// Boxed error raised by an executor implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for statement construction and execution
#[derive(Debug, Error)]
pub enum FluentError {
    /// Missing or invalid setup (e.g. no executor bound)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A field reference could not be mapped to a column
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Statement failed a construction-time check
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cached entity metadata was re-bound to a different descriptor
    #[error("Reassignment conflict for '{key}': cached as {cached}, requested as {requested}")]
    Conflict {
        key: String,
        cached: String,
        requested: String,
    },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error raised by the executor, passed through untouched
    #[error("Execution error: {0}")]
    Execution(#[source] BoxError),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl FluentError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a resolution error
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Wrap an executor-side error
    pub fn execution<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Execution(Box::new(err))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is a resolution error
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }
}

impl From<serde_json::Error> for FluentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for FluentError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Execution(Box::new(err))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for FluentError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
