use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use ridebook_common::log_error;
use ridebook_config::SessionConfig;
use ridebook_platform::SchedulingPlatform;
use std::sync::Arc;

use crate::manager::SessionManager;
use crate::store::{CookiePolicy, CredentialStore};

/// Shared by every router that needs a session: opens the per-request store
/// and writes it back onto the response.
#[derive(Clone)]
pub struct SessionContext {
    manager: Arc<SessionManager>,
    policy: CookiePolicy,
}

impl SessionContext {
    pub fn new(platform: Arc<dyn SchedulingPlatform>, config: &SessionConfig) -> Self {
        Self {
            manager: Arc::new(SessionManager::new(platform)),
            policy: CookiePolicy::from_config(config),
        }
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn shared_manager(&self) -> Arc<SessionManager> {
        self.manager.clone()
    }

    pub fn open(&self, headers: &HeaderMap) -> CredentialStore {
        CredentialStore::from_headers(self.policy.clone(), headers)
    }

    /// Adds the store's `Set-Cookie`, if any, to the response.
    pub fn finish(&self, store: &CredentialStore, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        match store.set_cookie_header(Utc::now()) {
            Ok(Some(value)) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Ok(None) => {}
            Err(e) => log_error(e, "Failed to write session cookie"),
        }
        response
    }
}
