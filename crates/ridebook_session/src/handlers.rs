// --- File: crates/ridebook_session/src/handlers.rs ---
use axum::{extract::State, http::HeaderMap, response::Response, Json};
use chrono::{DateTime, Utc};
use ridebook_common::{CredentialKind, SessionCredential};
use serde::Serialize;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::context::SessionContext;
use crate::manager::is_member_session_active;

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub success: bool,
    /// True while an unexpired member credential is held.
    pub authenticated: bool,
    /// Absent when no credential could be obtained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CredentialKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionStatusResponse {
    fn from_credential(credential: Option<&SessionCredential>) -> Self {
        Self {
            success: true,
            authenticated: is_member_session_active(credential, Utc::now()),
            kind: credential.map(|c| c.kind),
            expires_at: credential.and_then(|c| c.expires_at),
        }
    }
}

/// Resolves the caller's session, issuing or refreshing a visitor credential
/// when needed. The token itself never leaves the httpOnly cookie.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session state", body = SessionStatusResponse)
    ),
    tag = "Session"
))]
pub async fn session_status_handler(
    State(session): State<SessionContext>,
    headers: HeaderMap,
) -> Response {
    let mut store = session.open(&headers);
    let credential = session.manager().resolve(&mut store).await;
    let body = SessionStatusResponse::from_credential(credential.as_ref());
    session.finish(&store, Json(body))
}

/// Drops the current credential and starts a fresh visitor session.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/session/logout",
    responses(
        (status = 200, description = "Session reset to a visitor credential, or cleared", body = SessionStatusResponse)
    ),
    tag = "Session"
))]
pub async fn logout_handler(State(session): State<SessionContext>, headers: HeaderMap) -> Response {
    let mut store = session.open(&headers);
    let credential = session.manager().logout(&mut store).await;
    let body = SessionStatusResponse::from_credential(credential.as_ref());
    session.finish(&store, Json(body))
}
