// --- File: crates/ridebook_session/src/lib.rs ---
pub mod context;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod manager;
#[cfg(test)]
mod manager_test;
pub mod routes;
pub mod store;

// Re-export for the feature crates and the backend
pub use context::SessionContext;
pub use error::SessionError;
pub use manager::{
    is_member_session_active, SessionInstruction, SessionManager, SessionResolution,
};
pub use routes::routes;
pub use store::{CookiePolicy, CredentialStore, SigningKey};
