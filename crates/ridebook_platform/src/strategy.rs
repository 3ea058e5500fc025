//! Ordered credential strategies for platform calls.
//!
//! A call is tried with each strategy in turn. Only a 403 moves on to the
//! next one; every other outcome, success or failure, ends the chain.

use reqwest::RequestBuilder;
use ridebook_common::SessionCredential;
use std::future::Future;
use tracing::warn;

use crate::error::PlatformError;

/// Header carrying the account id next to the elevated API key.
pub const ACCOUNT_ID_HEADER: &str = "X-Account-Id";

/// Whether a call needs server-only privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Visitor-level calls: session first, API key as fallback.
    Visitor,
    /// Server-only calls: API key first, session as fallback.
    Elevated,
}

#[derive(Clone, PartialEq, Eq)]
pub enum CredentialStrategy {
    ApiKey {
        key: String,
        account_id: Option<String>,
    },
    Session(String),
}

impl CredentialStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            CredentialStrategy::ApiKey { .. } => "api_key",
            CredentialStrategy::Session(_) => "session",
        }
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            CredentialStrategy::ApiKey { key, account_id } => {
                let request = request.header(reqwest::header::AUTHORIZATION, key);
                match account_id {
                    Some(id) => request.header(ACCOUNT_ID_HEADER, id),
                    None => request,
                }
            }
            CredentialStrategy::Session(token) => request.bearer_auth(token),
        }
    }
}

impl std::fmt::Debug for CredentialStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Builds the ordered strategy list for one call.
pub fn plan(
    api_key: Option<&CredentialStrategy>,
    session: Option<&SessionCredential>,
    privilege: Privilege,
) -> Vec<CredentialStrategy> {
    let session = session.map(|cred| CredentialStrategy::Session(cred.token.clone()));
    let api_key = api_key.cloned();

    let ordered = match privilege {
        Privilege::Elevated => [api_key, session],
        Privilege::Visitor => [session, api_key],
    };
    ordered.into_iter().flatten().collect()
}

/// Runs `attempt` with each strategy until one does not answer 403.
pub async fn run_with_fallback<T, F, Fut>(
    strategies: Vec<CredentialStrategy>,
    operation: &str,
    mut attempt: F,
) -> Result<T, PlatformError>
where
    F: FnMut(CredentialStrategy) -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    let total = strategies.len();
    for (index, strategy) in strategies.into_iter().enumerate() {
        let label = strategy.label();
        match attempt(strategy).await {
            Err(err) if err.is_forbidden() && index + 1 < total => {
                warn!(
                    "{} forbidden with {} credentials, trying next strategy",
                    operation, label
                );
            }
            outcome => return outcome,
        }
    }
    Err(PlatformError::MissingCredentials)
}
