//! Error types for the authorization engine.

use thiserror::Error;

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Errors that can occur while loading rules or deciding a request.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A condition is malformed, or evaluating one of its expressions failed.
    #[error("Invalid conditional: {0}")]
    InvalidConditional(String),

    /// The decision for an `authorize` call was DENY.
    #[error("Not authorized to {action} {resource}")]
    AuthorizationFailed { action: String, resource: String },

    /// No authorization decision was recorded for the current context.
    #[error("Authorization was not performed")]
    AuthorizationNotPerformed,

    /// Rule document could not be parsed.
    #[error("Failed to parse rules: {0}")]
    ParseError(String),

    /// Rule document validation failed.
    #[error("Rule validation error: {0}")]
    ValidationError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Engine configuration is incomplete or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Reading a rule or configuration file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for AuthzError {
    fn from(err: serde_json::Error) -> Self {
        AuthzError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for AuthzError {
    fn from(err: serde_yaml::Error) -> Self {
        AuthzError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for AuthzError {
    fn from(err: std::io::Error) -> Self {
        AuthzError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_failed_message() {
        let err = AuthzError::AuthorizationFailed {
            action: "read".to_string(),
            resource: "com::app::Document".to_string(),
        };
        assert_eq!(err.to_string(), "Not authorized to read com::app::Document");
    }

    #[test]
    fn test_yaml_error_maps_to_parse_error() {
        let err: AuthzError = serde_yaml::from_str::<Vec<String>>("{ not: [a list")
            .unwrap_err()
            .into();
        assert!(matches!(err, AuthzError::ParseError(_)));
    }
}
