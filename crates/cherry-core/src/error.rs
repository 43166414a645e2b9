//! Error types for Cherry Servers operations.
//!
//! A single error enum covers the whole request path: request construction,
//! transport failures, non-success HTTP statuses, model validation and the
//! polling timeouts raised by [`crate::backoff`].

use thiserror::Error;

/// Main error type for Cherry Servers operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// HTTP verb outside the supported set (GET, POST, PUT, PATCH, DELETE)
    #[error("Invalid method {0}")]
    InvalidMethod(String),

    /// Request descriptor is malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The API answered with a non-success status code
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Raw response body, kept for diagnostics
        body: String,
    },

    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// A single HTTP call exceeded its timeout
    #[error("Request timed out: {0}")]
    RequestTimeout(String),

    /// A response or request payload does not fit its schema
    #[error("Validation error: {0}")]
    Validation(String),

    /// Waiting for a resource to reach the `deployed` status timed out
    #[error("Deployment timeout: {0}")]
    DeploymentTimeout(String),

    /// Waiting for a resource condition timed out
    #[error("Resource timeout: {0}")]
    ResourceTimeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Operation is only available for baremetal servers
    #[error("Only baremetal servers support {0}")]
    NotBaremetal(String),
}

/// Specialized result type for Cherry Servers operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidMethod(_) => "INVALID_METHOD",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::HttpStatus { .. } => "HTTP_STATUS",
            Self::Network(_) => "NETWORK_ERROR",
            Self::RequestTimeout(_) => "REQUEST_TIMEOUT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DeploymentTimeout(_) => "DEPLOYMENT_TIMEOUT",
            Self::ResourceTimeout(_) => "RESOURCE_TIMEOUT",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::NotBaremetal(_) => "NOT_BAREMETAL",
        }
    }

    /// Returns the HTTP status code carried by this error, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the API reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 404, .. })
    }

    /// Returns true for any kind of timeout, HTTP or polling.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::RequestTimeout(_) | Self::DeploymentTimeout(_) | Self::ResourceTimeout(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout(err.to_string())
        } else if err.is_decode() {
            Self::Validation(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::InvalidMethod("HEAD".to_string()).error_code(),
            "INVALID_METHOD"
        );
        assert_eq!(
            Error::HttpStatus {
                status: 500,
                body: String::new()
            }
            .error_code(),
            "HTTP_STATUS"
        );
        assert_eq!(
            Error::Network("test".to_string()).error_code(),
            "NETWORK_ERROR"
        );
        assert_eq!(
            Error::Validation("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            Error::DeploymentTimeout("test".to_string()).error_code(),
            "DEPLOYMENT_TIMEOUT"
        );
        assert_eq!(
            Error::ResourceTimeout("test".to_string()).error_code(),
            "RESOURCE_TIMEOUT"
        );
        assert_eq!(
            Error::NotBaremetal("test".to_string()).error_code(),
            "NOT_BAREMETAL"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidMethod("OPTIONS".to_string());
        assert_eq!(err.to_string(), "Invalid method OPTIONS");

        let err = Error::HttpStatus {
            status: 404,
            body: "{\"message\":\"not found\"}".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: {\"message\":\"not found\"}");

        let err = Error::DeploymentTimeout("timeout waiting for Server to deploy".to_string());
        assert_eq!(
            err.to_string(),
            "Deployment timeout: timeout waiting for Server to deploy"
        );
    }

    #[test]
    fn test_status_helpers() {
        let not_found = Error::HttpStatus {
            status: 404,
            body: String::new(),
        };
        assert_eq!(not_found.status_code(), Some(404));
        assert!(not_found.is_not_found());

        let conflict = Error::HttpStatus {
            status: 409,
            body: String::new(),
        };
        assert!(!conflict.is_not_found());
        assert_eq!(Error::Network("down".to_string()).status_code(), None);
    }

    #[test]
    fn test_is_timeout() {
        assert!(Error::RequestTimeout("t".to_string()).is_timeout());
        assert!(Error::DeploymentTimeout("t".to_string()).is_timeout());
        assert!(Error::ResourceTimeout("t".to_string()).is_timeout());
        assert!(!Error::Network("t".to_string()).is_timeout());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let cherry_err: Error = err.into();
        assert!(matches!(cherry_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let cherry_err: Error = err.into();
        assert!(matches!(cherry_err, Error::Validation(_)));
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::Validation("test".to_string());
        let err2 = Error::Validation("test".to_string());
        let err3 = Error::Validation("other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
