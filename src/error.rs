//! Error types for the disposition engine.
//!
//! Evaluation itself never fails: malformed sender addresses and unknown verdict
//! labels are logged and tolerated. Errors only arise while building the
//! configuration at startup and at the transport boundary (decoding events,
//! reading input).

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the disposition engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or inconsistent configuration. Fatal at startup.
    #[error("Configuration error: {message}")]
    Config {
        /// Detailed error message
        message: String,
        /// Configuration key that caused the error
        key: Option<String>,
    },

    /// Error while parsing a configuration value
    #[error("Parse error: {message}")]
    Parse {
        /// Detailed error message
        message: String,
        /// Line number where error occurred, if applicable
        line: Option<usize>,
    },

    /// Failure loading configuration sources (file or environment)
    #[error("Settings error: {0}")]
    Settings(#[from] ::config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error (unexpected condition)
    #[error("Internal error: {message}")]
    Internal {
        /// Detailed error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: None,
        }
    }

    /// Create a configuration error attributed to a configuration key.
    pub fn config_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
            line: None,
        }
    }

    /// Create a parse error with line context.
    pub fn parse_at(message: impl Into<String>, line: usize) -> Self {
        Error::Parse {
            message: message.into(),
            line: Some(line),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// The configuration key this error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::Config { key, .. } => key.as_deref(),
            _ => None,
        }
    }

    /// Check if this error is recoverable.
    ///
    /// Configuration problems never are: the process must not start with a
    /// partially built policy.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. } | Error::Serialization(_) | Error::Io(_)
        )
    }

    /// Get the error category for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config",
            Error::Parse { .. } => "parse",
            Error::Settings(_) => "settings",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Internal { .. } => "internal",
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Attribute a configuration error to the given key.
    fn with_key(self, key: impl Into<String>) -> Result<T>;
}

impl<T> ErrorContext<T> for Result<T> {
    fn with_key(self, key: impl Into<String>) -> Result<T> {
        self.map_err(|e| match e {
            Error::Config { message, .. } => Error::Config {
                message,
                key: Some(key.into()),
            },
            other => other,
        })
    }
}
