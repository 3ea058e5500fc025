#[cfg(test)]
mod tests {
    use crate::manager::{
        is_member_session_active, SessionInstruction, SessionManager, MAX_VISITOR_LIFETIME_HOURS,
    };
    use crate::store::{CookiePolicy, CredentialStore};
    use chrono::{Duration, Utc};
    use ridebook_common::SessionCredential;
    use ridebook_platform::mock::{MockFault, MockPlatform, Operation};
    use ridebook_platform::PlatformError;
    use std::sync::Arc;

    fn manager(mock: &Arc<MockPlatform>) -> SessionManager {
        SessionManager::new(mock.clone())
    }

    #[tokio::test]
    async fn test_authenticated_member_is_returned_unchanged() {
        let mock = Arc::new(MockPlatform::new());
        let member = SessionCredential::member("member-tok", Some(Utc::now() + Duration::minutes(1)));

        let resolution = manager(&mock)
            .resolve_credential(Some(member.clone()), true)
            .await;

        assert_eq!(resolution.credential, Some(member));
        assert_eq!(resolution.instruction, SessionInstruction::Keep);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_gets_a_visitor_token() {
        let mock = Arc::new(MockPlatform::new());
        let now = Utc::now();

        let resolution = manager(&mock).resolve_at(None, false, now).await;

        let credential = resolution.credential.expect("visitor credential");
        assert!(!credential.is_member());
        assert_eq!(credential.token, "visitor-token-1");
        assert_eq!(resolution.instruction, SessionInstruction::Store(credential));
        assert_eq!(mock.count(Operation::IssueToken), 1);
    }

    #[tokio::test]
    async fn test_visitor_lifetime_is_capped_at_a_day() {
        let mock = Arc::new(MockPlatform::new().with_token_ttl_secs(7 * 24 * 60 * 60));
        let now = Utc::now();

        let credential = manager(&mock)
            .resolve_at(None, false, now)
            .await
            .credential
            .unwrap();

        assert_eq!(
            credential.expires_at,
            Some(now + Duration::hours(MAX_VISITOR_LIFETIME_HOURS))
        );
    }

    #[tokio::test]
    async fn test_unbounded_token_lifetime_is_clamped() {
        let mock = Arc::new(MockPlatform::new().with_token_ttl_secs(i64::MAX));
        let now = Utc::now();

        let resolution = manager(&mock).resolve_at(None, false, now).await;

        let credential = resolution.credential.expect("visitor credential");
        assert_eq!(
            credential.expires_at,
            Some(now + Duration::hours(MAX_VISITOR_LIFETIME_HOURS))
        );
    }

    #[tokio::test]
    async fn test_non_positive_token_lifetime_gets_the_ceiling() {
        let mock = Arc::new(MockPlatform::new().with_token_ttl_secs(-1));
        let now = Utc::now();

        let credential = manager(&mock)
            .resolve_at(None, false, now)
            .await
            .credential
            .unwrap();

        assert_eq!(
            credential.expires_at,
            Some(now + Duration::hours(MAX_VISITOR_LIFETIME_HOURS))
        );
    }

    #[tokio::test]
    async fn test_authenticated_member_survives_failing_token_endpoint() {
        let mock = Arc::new(MockPlatform::new());
        mock.fail(Operation::IssueToken, MockFault::Status(401));
        mock.fail(Operation::RefreshToken, MockFault::Status(401));
        let member = SessionCredential::member("member-tok", Some(Utc::now() + Duration::hours(1)));

        let resolution = manager(&mock)
            .resolve_credential(Some(member.clone()), true)
            .await;

        assert_eq!(resolution.credential, Some(member));
        assert_eq!(resolution.instruction, SessionInstruction::Keep);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_platform_401_logs_out_member() {
        let mock = Arc::new(MockPlatform::new());
        let mut store = CredentialStore::empty(CookiePolicy::default());
        let member = SessionCredential::member("member-tok", Some(Utc::now() + Duration::hours(1)));
        store.apply(SessionInstruction::Store(member.clone()));

        let result: Result<(), PlatformError> = manager(&mock)
            .settle(&mut store, Some(&member), Err(PlatformError::api(401, "logged out")))
            .await;

        assert!(result.is_err());
        assert!(store.current().is_some_and(|c| !c.is_member()));
        assert_eq!(mock.count(Operation::IssueToken), 1);
    }

    #[tokio::test]
    async fn test_platform_401_on_visitor_leaves_store_alone() {
        let mock = Arc::new(MockPlatform::new());
        let mut store = CredentialStore::empty(CookiePolicy::default());
        let visitor = SessionCredential::visitor("v", None, Some(Utc::now() + Duration::hours(1)));
        store.apply(SessionInstruction::Store(visitor.clone()));

        let result: Result<(), PlatformError> = manager(&mock)
            .settle(&mut store, Some(&visitor), Err(PlatformError::api(401, "expired")))
            .await;

        assert!(result.is_err());
        assert_eq!(store.current(), Some(&visitor));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_other_member_failures_keep_the_session() {
        let mock = Arc::new(MockPlatform::new());
        let mut store = CredentialStore::empty(CookiePolicy::default());
        let member = SessionCredential::member("member-tok", None);
        store.apply(SessionInstruction::Store(member.clone()));

        let _ = manager(&mock)
            .settle::<()>(&mut store, Some(&member), Err(PlatformError::api(403, "denied")))
            .await;

        assert_eq!(store.current(), Some(&member));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_visitor_is_kept_without_remote_calls() {
        let mock = Arc::new(MockPlatform::new());
        let now = Utc::now();
        let visitor = SessionCredential::visitor("v", None, Some(now + Duration::hours(2)));

        let resolution = manager(&mock)
            .resolve_at(Some(visitor.clone()), false, now)
            .await;

        assert_eq!(resolution.credential, Some(visitor));
        assert_eq!(resolution.instruction, SessionInstruction::Keep);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_expiring_visitor_uses_refresh_grant_first() {
        let mock = Arc::new(MockPlatform::new());
        let now = Utc::now();
        let visitor = SessionCredential::visitor(
            "old",
            Some("refresh-old".into()),
            Some(now + Duration::minutes(2)),
        );

        let resolution = manager(&mock).resolve_at(Some(visitor), false, now).await;

        assert!(matches!(resolution.instruction, SessionInstruction::Store(_)));
        assert_eq!(mock.count(Operation::RefreshToken), 1);
        assert_eq!(mock.count(Operation::IssueToken), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_falls_back_to_new_token() {
        let mock = Arc::new(MockPlatform::new());
        mock.fail(Operation::RefreshToken, MockFault::Status(400));
        let now = Utc::now();
        let visitor = SessionCredential::visitor("old", Some("stale".into()), Some(now));

        let resolution = manager(&mock).resolve_at(Some(visitor), false, now).await;

        assert!(matches!(resolution.instruction, SessionInstruction::Store(_)));
        assert_eq!(mock.count(Operation::RefreshToken), 1);
        assert_eq!(mock.count(Operation::IssueToken), 1);
    }

    #[tokio::test]
    async fn test_issuance_network_fault_fails_open_without_credential() {
        let mock = Arc::new(MockPlatform::new());
        mock.fail(Operation::IssueToken, MockFault::Network);

        let resolution = manager(&mock).resolve_credential(None, false).await;

        assert!(resolution.credential.is_none());
        assert_eq!(resolution.instruction, SessionInstruction::Keep);
    }

    #[tokio::test]
    async fn test_issuance_failure_keeps_still_valid_visitor() {
        let mock = Arc::new(MockPlatform::new());
        mock.fail(Operation::IssueToken, MockFault::Network);
        let now = Utc::now();
        let visitor = SessionCredential::visitor("v", None, Some(now + Duration::minutes(3)));

        let resolution = manager(&mock)
            .resolve_at(Some(visitor.clone()), false, now)
            .await;

        assert_eq!(resolution.credential, Some(visitor));
        assert_eq!(resolution.instruction, SessionInstruction::Keep);
    }

    #[tokio::test]
    async fn test_issuance_failure_drops_expired_visitor() {
        let mock = Arc::new(MockPlatform::new());
        mock.fail(Operation::IssueToken, MockFault::Status(503));
        let now = Utc::now();
        let visitor = SessionCredential::visitor("v", None, Some(now - Duration::minutes(1)));

        let resolution = manager(&mock).resolve_at(Some(visitor), false, now).await;

        assert!(resolution.credential.is_none());
        assert_eq!(resolution.instruction, SessionInstruction::Clear);
    }

    #[tokio::test]
    async fn test_logged_out_member_is_replaced_by_visitor() {
        let mock = Arc::new(MockPlatform::new());
        let now = Utc::now();
        let member = SessionCredential::member("member-tok", Some(now + Duration::hours(1)));

        let resolution = manager(&mock).resolve_at(Some(member), false, now).await;

        let credential = resolution.credential.expect("visitor credential");
        assert!(!credential.is_member());
        assert_eq!(resolution.instruction, SessionInstruction::Store(credential));
    }

    #[tokio::test]
    async fn test_logged_out_member_is_cleared_when_issuance_fails() {
        let mock = Arc::new(MockPlatform::new());
        mock.fail(Operation::IssueToken, MockFault::Network);
        let member = SessionCredential::member("member-tok", None);

        let resolution = manager(&mock).resolve_credential(Some(member), false).await;

        assert!(resolution.credential.is_none());
        assert_eq!(resolution.instruction, SessionInstruction::Clear);
    }

    #[tokio::test]
    async fn test_resolve_applies_instruction_to_store() {
        let mock = Arc::new(MockPlatform::new());
        let mut store = CredentialStore::empty(CookiePolicy::default());

        let credential = manager(&mock).resolve(&mut store).await;

        assert!(credential.is_some());
        assert_eq!(store.current(), credential.as_ref());
        assert!(store.is_dirty());
    }

    #[tokio::test]
    async fn test_logout_replaces_member_in_store() {
        let mock = Arc::new(MockPlatform::new());
        let mut store = CredentialStore::empty(CookiePolicy::default());
        store.apply(SessionInstruction::Store(SessionCredential::member("m", None)));

        let credential = manager(&mock).logout(&mut store).await;

        assert!(credential.is_some_and(|c| !c.is_member()));
        assert!(store.current().is_some_and(|c| !c.is_member()));
    }

    #[test]
    fn test_member_session_signal() {
        let now = Utc::now();
        let active = SessionCredential::member("m", Some(now + Duration::minutes(10)));
        let expired = SessionCredential::member("m", Some(now - Duration::minutes(10)));
        let visitor = SessionCredential::visitor("v", None, None);

        assert!(is_member_session_active(Some(&active), now));
        assert!(!is_member_session_active(Some(&expired), now));
        assert!(!is_member_session_active(Some(&visitor), now));
        assert!(!is_member_session_active(None, now));
    }
}
