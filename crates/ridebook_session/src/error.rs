use ridebook_common::RidebookError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// The credential could not be serialized for the cookie
    #[error("Failed to encode session credential: {0}")]
    Encode(#[from] serde_json::Error),

    /// The cookie value is not a credential we wrote
    #[error("Failed to decode session cookie: {0}")]
    Decode(String),

    /// The signing key cannot be used for HMAC
    #[error("Invalid session signing key: {0}")]
    Key(String),

    /// The Set-Cookie value is not a valid header
    #[error("Invalid Set-Cookie header: {0}")]
    Header(String),
}

impl From<SessionError> for RidebookError {
    fn from(err: SessionError) -> Self {
        RidebookError::InternalError(err.to_string())
    }
}
