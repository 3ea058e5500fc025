// --- File: crates/ridebook_common/src/models.rs ---
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Who a session credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// Anonymous token issued without an end-user login.
    Visitor,
    /// Token of a logged-in member, managed by the platform.
    Member,
}

/// The one session credential a client carries between requests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    pub kind: CredentialKind,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionCredential {
    pub fn visitor(
        token: impl Into<String>,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            kind: CredentialKind::Visitor,
            token: token.into(),
            refresh_token,
            expires_at,
        }
    }

    pub fn member(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            kind: CredentialKind::Member,
            token: token.into(),
            refresh_token: None,
            expires_at,
        }
    }

    pub fn is_member(&self) -> bool {
        self.kind == CredentialKind::Member
    }

    /// A credential without an expiry never expires locally.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// True when the credential is expired or will be within `margin`.
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at.is_some_and(|at| at <= now + margin)
    }
}

// Tokens end up in logs through `{:?}`; keep them out.
impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("kind", &self.kind)
            .field("token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_checks() {
        let now = Utc::now();
        let cred = SessionCredential::visitor("tok", None, Some(now + Duration::minutes(3)));

        assert!(!cred.is_expired(now));
        assert!(cred.expires_within(now, Duration::minutes(5)));
        assert!(!cred.expires_within(now, Duration::minutes(1)));
        assert!(cred.is_expired(now + Duration::minutes(3)));
    }

    #[test]
    fn test_credential_without_expiry_never_expires() {
        let cred = SessionCredential::member("tok", None);
        assert!(!cred.is_expired(Utc::now()));
        assert!(!cred.expires_within(Utc::now(), Duration::hours(48)));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let cred = SessionCredential::visitor("super-secret", Some("refresh-secret".into()), None);
        let printed = format!("{:?}", cred);
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("refresh-secret"));
        assert!(printed.contains("Visitor"));
    }

    #[test]
    fn test_serialized_shape() {
        let cred = SessionCredential::member("tok", None);
        let json = serde_json::to_value(&cred).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "member", "token": "tok" }));
    }
}
