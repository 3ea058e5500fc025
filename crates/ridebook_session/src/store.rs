// --- File: crates/ridebook_session/src/store.rs ---
//! Per-exchange credential store backed by an httpOnly cookie.
//!
//! A store is opened from the request headers, updated by the session
//! manager and turned into at most one `Set-Cookie` header for the response.
//! It is never shared between requests.

use axum::http::{header, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use hmac::{Hmac, Mac};
use once_cell::sync::Lazy;
use ridebook_common::SessionCredential;
use ridebook_config::SessionConfig;
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::SessionError;
use crate::manager::SessionInstruction;

type HmacSha256 = Hmac<Sha256>;

/// Hard ceiling for the cookie lifetime, whatever the config says.
pub const MAX_COOKIE_AGE_SECS: i64 = 24 * 60 * 60;

/// Separates the encoded credential from its signature in the cookie value.
const SIGNATURE_SEPARATOR: char = '.';

static PROCESS_KEY: Lazy<SigningKey> = Lazy::new(|| {
    warn!("No session signing key configured, using a per-process key");
    let mut bytes = Uuid::new_v4().as_bytes().to_vec();
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    SigningKey(bytes.into())
});

/// HMAC key for session cookies. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Arc<[u8]>);

impl SigningKey {
    pub fn new(secret: &str) -> Self {
        Self(secret.as_bytes().into())
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.0).map_err(|e| SessionError::Key(e.to_string()))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Cookie attributes, read once from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub cookie_name: String,
    pub max_age_secs: i64,
    pub secure: bool,
    pub signing_key: SigningKey,
}

impl CookiePolicy {
    pub fn from_config(config: &SessionConfig) -> Self {
        let signing_key = match config.signing_key.as_deref().filter(|k| !k.is_empty()) {
            Some(secret) => SigningKey::new(secret),
            None => PROCESS_KEY.clone(),
        };
        Self {
            cookie_name: config.cookie_name.clone(),
            max_age_secs: config.max_age_secs.clamp(0, MAX_COOKIE_AGE_SECS),
            secure: config.secure,
            signing_key,
        }
    }
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

/// `base64(json).base64(hmac)`; the credential kind cannot be altered
/// without the key.
pub fn encode_credential(
    credential: &SessionCredential,
    key: &SigningKey,
) -> Result<String, SessionError> {
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(credential)?);
    let mut mac = key.mac()?;
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{payload}{SIGNATURE_SEPARATOR}{signature}"))
}

pub fn decode_credential(value: &str, key: &SigningKey) -> Result<SessionCredential, SessionError> {
    let (payload, signature) = value
        .trim_matches('"')
        .split_once(SIGNATURE_SEPARATOR)
        .ok_or_else(|| SessionError::Decode("unsigned session cookie".to_string()))?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| SessionError::Decode(e.to_string()))?;

    let mut mac = key.mac()?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| SessionError::Decode("session cookie signature mismatch".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| SessionError::Decode(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| SessionError::Decode(e.to_string()))
}

fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else {
            continue;
        };
        for cookie in Cookie::split_parse(raw).flatten() {
            if cookie.name() == name {
                return Some(cookie.value().to_string());
            }
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Store(SessionCredential),
    Clear,
}

#[derive(Debug)]
pub struct CredentialStore {
    policy: CookiePolicy,
    current: Option<SessionCredential>,
    pending: Option<Pending>,
}

impl CredentialStore {
    pub fn empty(policy: CookiePolicy) -> Self {
        Self {
            policy,
            current: None,
            pending: None,
        }
    }

    /// Reads the credential from the request. Undecodable cookies count as absent.
    pub fn from_headers(policy: CookiePolicy, headers: &HeaderMap) -> Self {
        let current = read_cookie(headers, &policy.cookie_name).and_then(|value| {
            decode_credential(&value, &policy.signing_key)
                .map_err(|e| debug!("Ignoring session cookie: {}", e))
                .ok()
        });
        Self {
            policy,
            current,
            pending: None,
        }
    }

    pub fn current(&self) -> Option<&SessionCredential> {
        self.current.as_ref()
    }

    /// Whether the response needs a `Set-Cookie`.
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    pub fn apply(&mut self, instruction: SessionInstruction) {
        match instruction {
            SessionInstruction::Keep => {}
            SessionInstruction::Store(credential) => {
                self.current = Some(credential.clone());
                self.pending = Some(Pending::Store(credential));
            }
            SessionInstruction::Clear => {
                self.current = None;
                self.pending = Some(Pending::Clear);
            }
        }
    }

    /// Seconds the cookie may live: time to expiry, capped by the policy.
    fn max_age(&self, credential: &SessionCredential, now: DateTime<Utc>) -> i64 {
        let until_expiry = credential
            .expires_at
            .map(|at| (at - now).num_seconds())
            .unwrap_or(MAX_COOKIE_AGE_SECS);
        until_expiry
            .min(self.policy.max_age_secs)
            .min(MAX_COOKIE_AGE_SECS)
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.policy.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .secure(self.policy.secure)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::ZERO)
            .build()
    }

    /// The cookie to send back, if the credential changed during this exchange.
    pub fn outgoing_cookie(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<Cookie<'static>>, SessionError> {
        let cookie = match &self.pending {
            None => return Ok(None),
            Some(Pending::Clear) => self.removal_cookie(),
            Some(Pending::Store(credential)) => {
                let max_age = self.max_age(credential, now);
                if max_age <= 0 {
                    self.removal_cookie()
                } else {
                    let value = encode_credential(credential, &self.policy.signing_key)?;
                    Cookie::build((self.policy.cookie_name.clone(), value))
                        .path("/")
                        .http_only(true)
                        .secure(self.policy.secure)
                        .same_site(SameSite::Lax)
                        .max_age(CookieDuration::seconds(max_age))
                        .build()
                }
            }
        };
        Ok(Some(cookie))
    }

    pub fn set_cookie_header(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<HeaderValue>, SessionError> {
        self.outgoing_cookie(now)?
            .map(|cookie| {
                HeaderValue::from_str(&cookie.to_string())
                    .map_err(|e| SessionError::Header(e.to_string()))
            })
            .transpose()
    }
}
