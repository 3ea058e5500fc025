//! Error translation into the uniform envelope returned to callers.
//!
//! Every fault that reaches an HTTP boundary goes through [`translate`]. The
//! envelope carries one of five categories, a caller-safe message and, for
//! validation failures only, per-field violations. Remote error bodies are
//! never copied into it.

use serde::{Deserialize, Serialize};

use crate::error::RidebookError;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Status codes at or above this value are treated as remote-side faults.
const REMOTE_SERVER_ERROR_FLOOR: u16 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Client-supplied data is malformed; user-fixable.
    Validation,
    /// The referenced entity does not exist on the platform.
    NotFound,
    /// A local dependency is not configured or credentials are missing.
    Unavailable,
    /// The platform failed or answered with something we cannot use.
    Internal,
    /// Network faults and anything uncaught.
    System,
}

impl ErrorCategory {
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCategory::Validation => 400,
            ErrorCategory::NotFound => 404,
            ErrorCategory::Unavailable => 503,
            ErrorCategory::Internal => 502,
            ErrorCategory::System => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "VALIDATION",
            ErrorCategory::NotFound => "NOT_FOUND",
            ErrorCategory::Unavailable => "UNAVAILABLE",
            ErrorCategory::Internal => "INTERNAL",
            ErrorCategory::System => "SYSTEM",
        }
    }

    fn public_message(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "Some of the submitted details are invalid.",
            ErrorCategory::NotFound => "The requested service or time slot could not be found.",
            ErrorCategory::Unavailable => {
                "Booking is temporarily unavailable. Please try again later."
            }
            ErrorCategory::Internal => {
                "The scheduling service could not complete the request. Please try again later."
            }
            ErrorCategory::System => "An unexpected error occurred. Please try again later.",
        }
    }
}

/// A single field-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Violation {
    #[cfg_attr(feature = "openapi", schema(example = "email"))]
    pub field: String,
    #[cfg_attr(feature = "openapi", schema(example = "email is required"))]
    pub description: String,
    #[cfg_attr(feature = "openapi", schema(example = "required"))]
    pub rule: String,
}

impl Violation {
    pub fn new(field: &str, description: impl Into<String>, rule: &str) -> Self {
        Self {
            field: field.to_string(),
            description: description.into(),
            rule: rule.to_string(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, format!("{field} is required"), "required")
    }

    pub fn format(field: &str, description: impl Into<String>) -> Self {
        Self::new(field, description, "format")
    }
}

/// Standardized error returned to callers. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorEnvelope {
    category: ErrorCategory,
    message: String,
    violations: Vec<Violation>,
}

impl ErrorEnvelope {
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn http_status(&self) -> u16 {
        self.category.http_status()
    }
}

impl From<&RidebookError> for ErrorEnvelope {
    fn from(fault: &RidebookError) -> Self {
        translate(fault)
    }
}

/// Maps a fault onto the local taxonomy.
pub fn categorize(fault: &RidebookError) -> ErrorCategory {
    match fault {
        RidebookError::ValidationError { .. } => ErrorCategory::Validation,
        RidebookError::NotFoundError(_) => ErrorCategory::NotFound,
        RidebookError::ConfigError(_) | RidebookError::AuthError(_) => ErrorCategory::Unavailable,
        RidebookError::ExternalServiceError { status_code, .. } => match *status_code {
            400 | 422 => ErrorCategory::Validation,
            401 | 403 => ErrorCategory::Unavailable,
            404 | 410 => ErrorCategory::NotFound,
            code if code >= REMOTE_SERVER_ERROR_FLOOR => ErrorCategory::Internal,
            _ => ErrorCategory::Internal,
        },
        RidebookError::ParseError(_) | RidebookError::RateLimitError(_) => {
            ErrorCategory::Internal
        }
        RidebookError::HttpError(_)
        | RidebookError::TimeoutError(_)
        | RidebookError::InternalError(_) => ErrorCategory::System,
    }
}

/// Translates any fault into an [`ErrorEnvelope`].
///
/// Pure: the same fault always yields an identical envelope. Only locally
/// produced validation messages are passed through; every other message is
/// the category's generic text.
pub fn translate(fault: &RidebookError) -> ErrorEnvelope {
    let category = categorize(fault);

    let (message, violations) = match fault {
        RidebookError::ValidationError {
            message,
            violations,
        } => {
            let violations = if violations.is_empty() {
                vec![Violation::new("request", message.clone(), "invalid")]
            } else {
                violations.clone()
            };
            (message.clone(), violations)
        }
        RidebookError::ExternalServiceError { .. } if category == ErrorCategory::Validation => (
            category.public_message().to_string(),
            vec![Violation::new(
                "request",
                "The scheduling platform rejected the submitted details.",
                "remote_validation",
            )],
        ),
        _ => (category.public_message().to_string(), Vec::new()),
    };

    ErrorEnvelope {
        category,
        message,
        violations,
    }
}
