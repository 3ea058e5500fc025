// --- File: crates/ridebook_availability/src/logic.rs ---
//! Availability query engine.
//!
//! Queries are shape-checked locally and then passed to the platform as
//! given: local timestamps are never converted here, the platform does all
//! timezone arithmetic. Any violation is reported before a remote call,
//! including token issuance, is made.

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use ridebook_common::{not_found, validation_error, RidebookError, Violation};
use ridebook_platform::{
    AvailabilityQuery, AvailabilitySlot, SchedulingPlatform, ServiceSummary,
};
use ridebook_session::{CredentialStore, SessionManager};
use std::sync::Arc;
use tracing::{debug, info};

/// Parses a naive local timestamp, `YYYY-MM-DDTHH:MM[:SS[.fff]]`, no offset.
pub fn parse_local_timestamp(value: &str) -> Option<NaiveDateTime> {
    value
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
}

pub fn is_iana_time_zone(value: &str) -> bool {
    value.parse::<Tz>().is_ok()
}

/// Checks an availability query; violations are listed in field order.
pub fn validate_query(query: &AvailabilityQuery) -> Result<(), RidebookError> {
    let mut violations = Vec::new();

    let required = [
        ("serviceId", &query.service_id),
        ("startLocal", &query.start_local),
        ("endLocal", &query.end_local),
        ("timeZone", &query.time_zone),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            violations.push(Violation::required(field));
        }
    }

    let start = parse_timestamp_field("startLocal", &query.start_local, &mut violations);
    let end = parse_timestamp_field("endLocal", &query.end_local, &mut violations);

    if !query.time_zone.trim().is_empty() && !is_iana_time_zone(&query.time_zone) {
        violations.push(Violation::format(
            "timeZone",
            format!("'{}' is not an IANA time zone", query.time_zone),
        ));
    }

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            violations.push(Violation::new(
                "endLocal",
                "endLocal must be after startLocal",
                "after_start",
            ));
        }
    }

    if let Some(ids) = &query.resource_ids {
        if ids.iter().any(|id| id.trim().is_empty()) {
            violations.push(Violation::format(
                "resourceIds",
                "resource ids must not be empty",
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(validation_error("Invalid availability query", violations))
    }
}

fn parse_timestamp_field(
    field: &str,
    value: &str,
    violations: &mut Vec<Violation>,
) -> Option<NaiveDateTime> {
    if value.trim().is_empty() {
        return None;
    }
    let parsed = parse_local_timestamp(value);
    if parsed.is_none() {
        violations.push(Violation::format(
            field,
            format!("{field} must be a local timestamp like 2025-07-01T09:00:00"),
        ));
    }
    parsed
}

pub struct AvailabilityEngine {
    platform: Arc<dyn SchedulingPlatform>,
    sessions: Arc<SessionManager>,
}

impl AvailabilityEngine {
    pub fn new(platform: Arc<dyn SchedulingPlatform>, sessions: Arc<SessionManager>) -> Self {
        Self { platform, sessions }
    }

    /// The slot the platform reports for the query window.
    pub async fn query_slot(
        &self,
        query: &AvailabilityQuery,
        store: &mut CredentialStore,
    ) -> Result<AvailabilitySlot, RidebookError> {
        validate_query(query)?;
        let credential = self.sessions.resolve(store).await;

        let result = self
            .platform
            .get_slot_availability(query, credential.as_ref())
            .await;
        let slot = self
            .sessions
            .settle(store, credential.as_ref(), result)
            .await?;

        match slot {
            Some(slot) => {
                debug!(
                    "Slot {} - {} for {}: available={}",
                    slot.start_date, slot.end_date, query.service_id, slot.is_available
                );
                Ok(slot)
            }
            None => Err(not_found(format!(
                "No slot for service {} from {} to {}",
                query.service_id, query.start_local, query.end_local
            ))),
        }
    }

    /// All slots in the query window. An empty list means no availability.
    pub async fn query_range(
        &self,
        query: &AvailabilityQuery,
        store: &mut CredentialStore,
    ) -> Result<Vec<AvailabilitySlot>, RidebookError> {
        validate_query(query)?;
        let credential = self.sessions.resolve(store).await;

        let result = self
            .platform
            .query_availability(query, credential.as_ref())
            .await;
        let slots = self
            .sessions
            .settle(store, credential.as_ref(), result)
            .await?;
        info!(
            "{} slot(s) for service {} between {} and {} ({})",
            slots.len(),
            query.service_id,
            query.start_local,
            query.end_local,
            query.time_zone
        );
        Ok(slots)
    }

    pub async fn list_services(
        &self,
        store: &mut CredentialStore,
    ) -> Result<Vec<ServiceSummary>, RidebookError> {
        let credential = self.sessions.resolve(store).await;
        let result = self.platform.query_services(credential.as_ref()).await;
        Ok(self
            .sessions
            .settle(store, credential.as_ref(), result)
            .await?)
    }
}
