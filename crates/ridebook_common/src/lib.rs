// --- File: crates/ridebook_common/src/lib.rs ---

// Declare modules within this crate
pub mod envelope; // Error translation into the caller-facing envelope
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared session types

// Re-export error types and utilities for easier access
pub use error::{
    config_error, external_service_error, internal_error, not_found, validation_error,
    HttpStatusCode, RidebookError,
};

pub use envelope::{categorize, translate, ErrorCategory, ErrorEnvelope, Violation};

// Re-export HTTP utilities for easier access
pub use http::{
    client::create_client, handle_json_result, json_rejection_error, require_json,
    IntoHttpResponse,
};

pub use logging::{init, init_with_level, log_error};

pub use models::{CredentialKind, SessionCredential};
