//! Configuration-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or validating store configuration.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ConfigError {
    /// Required setting absent
    #[error("Missing required setting: {key}")]
    Missing {
        /// Environment key that was looked up
        key: String,
    },

    /// Setting present but not parsable
    #[error("Config parse error: {message}")]
    ParseError {
        /// Description of the parse failure
        message: String,
    },

    /// Config validation error (invalid values)
    #[error("Config validation error for {field}: {message}")]
    ValidationError {
        /// Name of the field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },
}

impl ConfigError {
    /// Collapse validator output into a single error.
    pub fn from_validation_errors(errors: &validator::ValidationErrors) -> Self {
        let field =
            errors.field_errors().keys().next().map(|key| key.to_string()).unwrap_or_default();
        Self::ValidationError { field, message: errors.to_string() }
    }
}
