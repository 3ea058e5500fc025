use ridebook_common::{external_service_error, HttpStatusCode, RidebookError};
use thiserror::Error;

const SERVICE_NAME: &str = "Scheduling platform";

/// Platform-specific error types.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Transport failure (connect, TLS, timeout)
    #[error("Platform request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error status returned by the platform
    #[error("Platform returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Failed to parse platform response: {0}")]
    ParseError(String),

    /// No credential strategy could be applied to an authenticated call
    #[error("No platform credentials available")]
    MissingCredentials,

    /// Missing or incomplete platform configuration
    #[error("Platform configuration error: {0}")]
    ConfigError(String),
}

impl PlatformError {
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        PlatformError::ApiError {
            status_code,
            message: message.into(),
        }
    }

    /// Only a 403 lets the credential chain move on to the next strategy.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, PlatformError::ApiError { status_code: 403, .. })
    }

    /// The platform no longer accepts the session behind the call.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PlatformError::ApiError { status_code: 401, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::ApiError { status_code: 404, .. })
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        PlatformError::ParseError(err.to_string())
    }
}

/// Convert PlatformError to RidebookError
impl From<PlatformError> for RidebookError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::RequestError(e) => RidebookError::from(e),
            PlatformError::ApiError {
                status_code: 429,
                message,
            } => RidebookError::RateLimitError(format!("{}: {}", SERVICE_NAME, message)),
            PlatformError::ApiError {
                status_code,
                message,
            } => external_service_error(SERVICE_NAME, status_code, message),
            PlatformError::ParseError(msg) => {
                RidebookError::ParseError(format!("Platform response parse error: {}", msg))
            }
            PlatformError::MissingCredentials => {
                RidebookError::AuthError("No platform credentials available".to_string())
            }
            PlatformError::ConfigError(msg) => RidebookError::ConfigError(msg),
        }
    }
}

impl HttpStatusCode for PlatformError {
    fn status_code(&self) -> u16 {
        match self {
            PlatformError::RequestError(_) => 500,
            PlatformError::ApiError { status_code, .. } => *status_code,
            PlatformError::ParseError(_) => 502,
            PlatformError::MissingCredentials => 503,
            PlatformError::ConfigError(_) => 503,
        }
    }
}
