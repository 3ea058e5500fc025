// --- File: crates/ridebook_session/src/manager.rs ---
//! Session credential lifecycle.
//!
//! [`SessionManager::resolve_credential`] is a function of the incoming
//! credential and the authentication signal. It returns the credential to use
//! for this request plus an instruction for the credential store; it never
//! touches cookies itself.
//!
//! Token issuance fails open: a platform fault is logged and the request
//! continues without a fresh credential. The first call that actually needs
//! one then fails with `UNAVAILABLE`.

use chrono::{DateTime, Duration, Utc};
use ridebook_common::SessionCredential;
use ridebook_platform::{IssuedToken, PlatformError, SchedulingPlatform};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::store::CredentialStore;

/// Visitor credentials this close to expiry are replaced.
pub const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Upper bound for the lifetime of any visitor credential we hand out.
pub const MAX_VISITOR_LIFETIME_HOURS: i64 = 24;

/// What the credential store should do with the response cookie.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInstruction {
    Keep,
    Store(SessionCredential),
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionResolution {
    pub credential: Option<SessionCredential>,
    pub instruction: SessionInstruction,
}

impl SessionResolution {
    fn keep(credential: Option<SessionCredential>) -> Self {
        Self {
            credential,
            instruction: SessionInstruction::Keep,
        }
    }

    fn store(credential: SessionCredential) -> Self {
        Self {
            credential: Some(credential.clone()),
            instruction: SessionInstruction::Store(credential),
        }
    }

    fn clear() -> Self {
        Self {
            credential: None,
            instruction: SessionInstruction::Clear,
        }
    }
}

/// The authentication signal: an unexpired member credential.
pub fn is_member_session_active(credential: Option<&SessionCredential>, now: DateTime<Utc>) -> bool {
    credential.is_some_and(|c| c.is_member() && !c.is_expired(now))
}

pub struct SessionManager {
    platform: Arc<dyn SchedulingPlatform>,
}

impl SessionManager {
    pub fn new(platform: Arc<dyn SchedulingPlatform>) -> Self {
        Self { platform }
    }

    pub async fn resolve_credential(
        &self,
        existing: Option<SessionCredential>,
        is_authenticated: bool,
    ) -> SessionResolution {
        self.resolve_at(existing, is_authenticated, Utc::now()).await
    }

    pub async fn resolve_at(
        &self,
        existing: Option<SessionCredential>,
        is_authenticated: bool,
        now: DateTime<Utc>,
    ) -> SessionResolution {
        if is_authenticated {
            debug!("Authenticated session, credential left untouched");
            return SessionResolution::keep(existing);
        }

        match existing {
            Some(credential) if credential.is_member() => {
                debug!("Member credential without an authenticated session, switching to visitor");
                match self.issue_visitor(None, now).await {
                    Some(visitor) => SessionResolution::store(visitor),
                    None => SessionResolution::clear(),
                }
            }
            Some(credential)
                if !credential.expires_within(now, Duration::minutes(REFRESH_MARGIN_MINUTES)) =>
            {
                SessionResolution::keep(Some(credential))
            }
            Some(credential) => {
                debug!("Visitor credential near expiry, replacing it");
                match self
                    .issue_visitor(credential.refresh_token.as_deref(), now)
                    .await
                {
                    Some(visitor) => SessionResolution::store(visitor),
                    None if !credential.is_expired(now) => SessionResolution::keep(Some(credential)),
                    None => SessionResolution::clear(),
                }
            }
            None => match self.issue_visitor(None, now).await {
                Some(visitor) => SessionResolution::store(visitor),
                None => SessionResolution::keep(None),
            },
        }
    }

    /// Resolves the store's credential and applies the outcome to it.
    pub async fn resolve(&self, store: &mut CredentialStore) -> Option<SessionCredential> {
        let now = Utc::now();
        let existing = store.current().cloned();
        let authenticated = is_member_session_active(existing.as_ref(), now);
        let resolution = self.resolve_at(existing, authenticated, now).await;
        store.apply(resolution.instruction);
        resolution.credential
    }

    /// Forces the deauthentication transition: whatever the store holds is
    /// replaced by a fresh visitor credential, or cleared if none can be issued.
    pub async fn logout(&self, store: &mut CredentialStore) -> Option<SessionCredential> {
        let now = Utc::now();
        let resolution = match self.issue_visitor(None, now).await {
            Some(visitor) => SessionResolution::store(visitor),
            None => SessionResolution::clear(),
        };
        store.apply(resolution.instruction);
        resolution.credential
    }

    /// Passes a platform result through. A 401 answered to a member credential
    /// means the member was logged out remotely, so the store goes through the
    /// logout transition before the error is returned.
    pub async fn settle<T>(
        &self,
        store: &mut CredentialStore,
        used: Option<&SessionCredential>,
        result: Result<T, PlatformError>,
    ) -> Result<T, PlatformError> {
        if let Err(err) = &result {
            if err.is_unauthorized() && used.is_some_and(SessionCredential::is_member) {
                info!("Platform rejected the member session, switching to visitor");
                self.logout(store).await;
            }
        }
        result
    }

    /// Refresh grant first when possible, then a new anonymous token.
    async fn issue_visitor(
        &self,
        refresh_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<SessionCredential> {
        if let Some(refresh_token) = refresh_token {
            match self.platform.refresh_visitor_token(refresh_token).await {
                Ok(token) => return Some(visitor_credential(token, now)),
                Err(e) => warn!("Visitor token refresh failed, requesting a new token: {}", e),
            }
        }

        match self.platform.issue_visitor_token().await {
            Ok(token) => Some(visitor_credential(token, now)),
            Err(e) => {
                warn!("Visitor token issuance failed, continuing without a credential: {}", e);
                None
            }
        }
    }
}

/// Builds the visitor credential with its lifetime clamped to the ceiling.
fn visitor_credential(mut token: IssuedToken, now: DateTime<Utc>) -> SessionCredential {
    let max_secs = MAX_VISITOR_LIFETIME_HOURS * 60 * 60;
    token.expires_in_secs = token.expires_in_secs.map(|secs| secs.min(max_secs));
    let mut credential = token.into_visitor_credential(now);
    if let Some(ceiling) = now.checked_add_signed(Duration::hours(MAX_VISITOR_LIFETIME_HOURS)) {
        credential.expires_at = Some(credential.expires_at.map_or(ceiling, |at| at.min(ceiling)));
    }
    credential
}
