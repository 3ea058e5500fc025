use std::fmt;
use thiserror::Error;

use crate::envelope::Violation;

/// The base error type for all Ridebook errors.
///
/// Integration crates keep their own error enums and implement
/// `From<SpecificError> for RidebookError`; handlers only ever see this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RidebookError {
    /// Transport-level failure talking to a remote service (connect, DNS, TLS, reset)
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// A remote call did not answer in time
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// A remote payload could not be understood
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No usable credential, or the remote refused the ones we have
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Client-supplied data is malformed
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        violations: Vec<Violation>,
    },

    /// Error returned by an external service with an HTTP-like status code
    #[error("External service error: {service_name} - {message} (Status: {status_code})")]
    ExternalServiceError {
        service_name: String,
        status_code: u16,
        message: String,
    },

    /// A referenced resource does not exist
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to rate limiting
    #[error("Rate limited: {0}")]
    RateLimitError(String),

    /// Anything else
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for RidebookError {
    fn status_code(&self) -> u16 {
        crate::envelope::categorize(self).http_status()
    }
}

// Common error conversions
impl From<reqwest::Error> for RidebookError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RidebookError::TimeoutError(err.to_string())
        } else if err.is_decode() {
            RidebookError::ParseError(err.to_string())
        } else {
            RidebookError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RidebookError {
    fn from(err: serde_json::Error) -> Self {
        RidebookError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for RidebookError {
    fn from(err: std::io::Error) -> Self {
        RidebookError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> RidebookError {
    RidebookError::ConfigError(message.to_string())
}

/// Builds a validation error; `violations` must describe at least one field.
pub fn validation_error<T: fmt::Display>(message: T, violations: Vec<Violation>) -> RidebookError {
    RidebookError::ValidationError {
        message: message.to_string(),
        violations,
    }
}

pub fn not_found<T: fmt::Display>(message: T) -> RidebookError {
    RidebookError::NotFoundError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(
    service_name: &str,
    status_code: u16,
    message: T,
) -> RidebookError {
    RidebookError::ExternalServiceError {
        service_name: service_name.to_string(),
        status_code,
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> RidebookError {
    RidebookError::InternalError(message.to_string())
}
