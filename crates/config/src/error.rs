//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
///
/// Configuration problems are fatal at startup and nowhere else; nothing in
/// the running service re-reads configuration from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - required field empty or absent
    #[error("'{field}' is required and must not be empty")]
    MissingField {
        /// Field name
        field: &'static str,
    },

    /// Validation error - invalid value
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// Neither output is enabled
    #[error("no outputs are enabled - enable network.stream or network.datagram")]
    NoOutputsEnabled,
}

impl ConfigError {
    /// Create a MissingField error
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_error() {
        let err = ConfigError::missing_field("api_key");
        assert!(err.to_string().contains("api_key"));
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::invalid_value("network.stream.port", "port must be nonzero");
        assert!(err.to_string().contains("network.stream.port"));
        assert!(err.to_string().contains("nonzero"));
    }

    #[test]
    fn test_no_outputs_enabled_error() {
        let err = ConfigError::NoOutputsEnabled;
        assert!(err.to_string().contains("no outputs"));
    }
}
