// --- File: crates/ridebook_common/src/http/client.rs ---
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sent with every outbound request.
pub const USER_AGENT: &str = concat!("ridebook/", env!("CARGO_PKG_VERSION"));

/// Creates a new HTTP client with custom configuration.
///
/// The backend builds one client at startup and hands it to every integration,
/// so connection pools are shared without a process-wide static.
///
/// # Arguments
///
/// * `timeout_secs` - The timeout in seconds for the client, `0` selects the default
/// * `follow_redirects` - Whether the client should follow redirects
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, ReqwestError> {
    let timeout = if timeout_secs == 0 {
        DEFAULT_TIMEOUT_SECS
    } else {
        timeout_secs
    };

    Client::builder()
        .timeout(Duration::from_secs(timeout))
        .user_agent(USER_AGENT)
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}
