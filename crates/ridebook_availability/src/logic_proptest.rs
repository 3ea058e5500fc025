#[cfg(test)]
mod tests {
    use crate::logic::{validate_query, AvailabilityEngine};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use proptest::prelude::*;
    use ridebook_common::{translate, ErrorCategory};
    use ridebook_platform::mock::MockPlatform;
    use ridebook_platform::{AvailabilityQuery, DEFAULT_LOCATION_TYPE};
    use ridebook_session::{CookiePolicy, CredentialStore, SessionManager};
    use std::sync::Arc;

    fn local(offset_minutes: i64) -> NaiveDateTime {
        let base = NaiveDate::from_ymd_opt(2025, 7, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        base + Duration::minutes(offset_minutes)
    }

    fn query(start: NaiveDateTime, end: NaiveDateTime) -> AvailabilityQuery {
        AvailabilityQuery {
            service_id: "svc-airport".to_string(),
            start_local: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            end_local: end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: "Europe/Berlin".to_string(),
            location_type: DEFAULT_LOCATION_TYPE.to_string(),
            resource_ids: None,
        }
    }

    proptest! {
        #[test]
        fn start_not_before_end_is_always_rejected(
            start in 0i64..100_000,
            back in 0i64..10_000,
        ) {
            let q = query(local(start), local(start - back));
            let err = validate_query(&q).unwrap_err();
            let envelope = translate(&err);
            prop_assert_eq!(envelope.category(), ErrorCategory::Validation);
            prop_assert!(envelope.violations().iter().any(|v| v.rule == "after_start"));
        }

        #[test]
        fn well_formed_windows_pass(start in 0i64..100_000, length in 1i64..10_000) {
            prop_assert!(validate_query(&query(local(start), local(start + length))).is_ok());
        }

        #[test]
        fn rejected_windows_never_reach_the_platform(
            start in 0i64..100_000,
            back in 0i64..10_000,
        ) {
            let mock = Arc::new(MockPlatform::new());
            let engine =
                AvailabilityEngine::new(mock.clone(), Arc::new(SessionManager::new(mock.clone())));
            let mut store = CredentialStore::empty(CookiePolicy::default());
            let q = query(local(start), local(start - back));

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let result = runtime.block_on(engine.query_slot(&q, &mut store));

            prop_assert!(result.is_err());
            prop_assert!(mock.calls().is_empty());
        }
    }
}
