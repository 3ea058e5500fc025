// --- File: crates/ridebook_config/src/models.rs ---

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

/// Reads a typed value that may also be given as text. Environment overrides
/// are never parsed by the loader, so `RIDEBOOK__SERVER__PORT=8080` arrives
/// as `"8080"` while ids keep their exact digits.
fn parsed<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + DeserializeOwned,
    T::Err: Display,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().parse().map_err(D::Error::custom),
        other => T::deserialize(other).map_err(D::Error::custom),
    }
}

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    #[serde(deserialize_with = "parsed")]
    pub port: u16,
}

// --- Scheduling Platform Config ---
// Holds the platform endpoint and credentials. Secrets can be given as
// "secret_from_env" and are resolved by env_vars::inject_env_vars.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlatformConfig {
    pub base_url: String, // Mandatory
    /// Client identifier used for anonymous (visitor) token issuance.
    pub client_id: String,
    /// Elevated server-only API key. Optional; elevated calls fall back to the session token.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Account id sent alongside the elevated API key.
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default = "default_timeout_secs", deserialize_with = "parsed")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

// --- Checkout Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CheckoutConfig {
    /// Base URL the platform redirects back to after payment, e.g. https://example.com
    pub callback_base_url: String,
    #[serde(default = "default_post_flow_path")]
    pub post_flow_path: String,
    #[serde(default = "default_thank_you_path")]
    pub thank_you_path: String,
    /// Request a checkout session right after a booking is created.
    #[serde(default = "default_true", deserialize_with = "parsed")]
    pub chain_after_booking: bool,
}

fn default_post_flow_path() -> String {
    "/booking".to_string()
}

fn default_thank_you_path() -> String {
    "/booking/thank-you".to_string()
}

fn default_true() -> bool {
    true
}

impl CheckoutConfig {
    pub fn post_flow_url(&self) -> String {
        join_url(&self.callback_base_url, &self.post_flow_path)
    }

    pub fn thank_you_url(&self) -> String {
        join_url(&self.callback_base_url, &self.thank_you_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// --- Session Cookie Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Upper bound for the cookie lifetime. Clamped to 24h by the credential store.
    #[serde(default = "default_max_age_secs", deserialize_with = "parsed")]
    pub max_age_secs: i64,
    #[serde(default = "default_true", deserialize_with = "parsed")]
    pub secure: bool,
    /// HMAC key for the session cookie; may be "secret_from_env". Without one
    /// a random key is used for the life of the process.
    #[serde(default)]
    pub signing_key: Option<String>,
}

fn default_cookie_name() -> String {
    "ridebook_session".to_string()
}

fn default_max_age_secs() -> i64 {
    86_400
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age_secs: default_max_age_secs(),
            secure: true,
            signing_key: None,
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // Platform config is mandatory, everything else depends on it
    pub platform: PlatformConfig,

    // --- Optional sections ---
    #[serde(default)]
    pub checkout: Option<CheckoutConfig>,
    #[serde(default)]
    pub session: SessionConfig,
}
