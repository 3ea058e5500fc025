// --- File: crates/ridebook_booking/src/logic.rs ---
//! Booking orchestration.
//!
//! A booking attempt moves through
//! `Received -> Validated -> Mapped -> Authenticated -> RemoteCreated
//! [-> CheckoutRequested] -> Done`; any stage may end in `Failed`. Each
//! transition is logged at debug with the attempt id. Nothing is retried.

use ridebook_availability::logic::validate_query;
use ridebook_common::{
    config_error, translate, validation_error, ErrorCategory, RidebookError, SessionCredential,
    Violation,
};
use ridebook_config::CheckoutConfig;
use ridebook_platform::{
    BookingRecord, CheckoutSession, CheckoutSessionRequest, CheckoutTarget, FormReceipt,
    FormSubmission, RemoteBookingPayload, SchedulingPlatform,
};
use ridebook_session::{CredentialStore, SessionManager};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::mapping::map;
use crate::models::{BookingConfirmation, BookingResult};
use crate::validation::normalize_or_fault;

/// Longest booking id or form namespace accepted.
const MAX_IDENTIFIER_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStage {
    Received,
    Validated,
    Mapped,
    Authenticated,
    RemoteCreated,
    CheckoutRequested,
    Done,
    Failed(ErrorCategory),
}

impl fmt::Display for BookingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStage::Received => write!(f, "Received"),
            BookingStage::Validated => write!(f, "Validated"),
            BookingStage::Mapped => write!(f, "Mapped"),
            BookingStage::Authenticated => write!(f, "Authenticated"),
            BookingStage::RemoteCreated => write!(f, "RemoteCreated"),
            BookingStage::CheckoutRequested => write!(f, "CheckoutRequested"),
            BookingStage::Done => write!(f, "Done"),
            BookingStage::Failed(category) => write!(f, "Failed({})", category.as_str()),
        }
    }
}

/// One booking attempt and the stage it has reached.
struct Attempt {
    id: Uuid,
    stage: BookingStage,
}

impl Attempt {
    fn start() -> Self {
        let id = Uuid::new_v4();
        debug!("Booking attempt {}: {}", id, BookingStage::Received);
        Self {
            id,
            stage: BookingStage::Received,
        }
    }

    fn enter(&mut self, stage: BookingStage) {
        debug!("Booking attempt {}: {} -> {}", self.id, self.stage, stage);
        self.stage = stage;
    }
}

/// Accepted identifiers: ASCII letters, digits, `-`, `_` and `.`.
fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_IDENTIFIER_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn check_identifier(field: &str, value: &str, message: &str) -> Result<(), RidebookError> {
    let violation = if value.trim().is_empty() {
        Violation::required(field)
    } else if !is_identifier(value) {
        Violation::format(
            field,
            format!("{field} may only contain letters, digits, '-', '_' and '.'"),
        )
    } else {
        return Ok(());
    };
    Err(validation_error(message, vec![violation]))
}

pub struct BookingOrchestrator {
    platform: Arc<dyn SchedulingPlatform>,
    sessions: Arc<SessionManager>,
    checkout: Option<CheckoutConfig>,
}

impl BookingOrchestrator {
    pub fn new(
        platform: Arc<dyn SchedulingPlatform>,
        sessions: Arc<SessionManager>,
        checkout: Option<CheckoutConfig>,
    ) -> Self {
        Self {
            platform,
            sessions,
            checkout,
        }
    }

    /// Validates, maps and creates a booking, then optionally chains a
    /// checkout session. Faults are translated into the failure envelope.
    pub async fn create_booking(
        &self,
        raw: &Map<String, Value>,
        store: &mut CredentialStore,
    ) -> BookingResult {
        let mut attempt = Attempt::start();
        match self.run_booking(&mut attempt, raw, store).await {
            Ok(confirmation) => {
                attempt.enter(BookingStage::Done);
                info!(
                    "Booking {} created for service {} (attempt {})",
                    confirmation.booking_id, confirmation.service_id, attempt.id
                );
                BookingResult::Success(confirmation)
            }
            Err(fault) => {
                let envelope = translate(&fault);
                attempt.enter(BookingStage::Failed(envelope.category()));
                if envelope.category() == ErrorCategory::Validation {
                    debug!("Booking attempt {} rejected: {}", attempt.id, fault);
                } else {
                    error!("Booking attempt {} failed: {}", attempt.id, fault);
                }
                BookingResult::Failure(envelope)
            }
        }
    }

    async fn run_booking(
        &self,
        attempt: &mut Attempt,
        raw: &Map<String, Value>,
        store: &mut CredentialStore,
    ) -> Result<BookingConfirmation, RidebookError> {
        let booking = normalize_or_fault(raw)?;
        attempt.enter(BookingStage::Validated);

        let payload = map(&booking);
        attempt.enter(BookingStage::Mapped);

        let credential = self.sessions.resolve(store).await;
        if credential.is_none() {
            debug!(
                "Booking attempt {} continues without a session credential",
                attempt.id
            );
        }
        attempt.enter(BookingStage::Authenticated);

        let result = self
            .platform
            .create_booking(&payload, credential.as_ref())
            .await;
        let record = self
            .sessions
            .settle(store, credential.as_ref(), result)
            .await?;
        attempt.enter(BookingStage::RemoteCreated);

        let checkout_url = self
            .chain_checkout(attempt, &record, credential.as_ref())
            .await;
        Ok(confirmation(record, &payload, checkout_url))
    }

    /// Requests a checkout session for a fresh booking when configured to.
    /// A failure here leaves the booking in place without a checkout URL.
    async fn chain_checkout(
        &self,
        attempt: &mut Attempt,
        record: &BookingRecord,
        credential: Option<&SessionCredential>,
    ) -> Option<String> {
        let checkout = self.checkout.as_ref().filter(|c| c.chain_after_booking)?;
        attempt.enter(BookingStage::CheckoutRequested);

        let request = checkout_request(
            checkout,
            CheckoutTarget::Booking {
                booking_id: record.booking_id.clone(),
            },
        );
        match self
            .platform
            .create_checkout_session(&request, credential)
            .await
        {
            Ok(session) => Some(session.url),
            Err(e) => {
                warn!(
                    "Checkout for booking {} failed, returning booking without it (attempt {}): {}",
                    record.booking_id, attempt.id, e
                );
                None
            }
        }
    }

    /// Creates a checkout session for an existing booking or directly for a slot.
    pub async fn create_checkout(
        &self,
        target: CheckoutTarget,
        store: &mut CredentialStore,
    ) -> Result<CheckoutSession, RidebookError> {
        match &target {
            CheckoutTarget::Booking { booking_id } => {
                check_identifier("bookingId", booking_id, "Invalid checkout request")?
            }
            CheckoutTarget::Slot(query) => validate_query(query)?,
        }
        let checkout = self
            .checkout
            .as_ref()
            .ok_or_else(|| config_error("Checkout callbacks are not configured"))?;

        let request = checkout_request(checkout, target);
        let credential = self.sessions.resolve(store).await;
        let result = self
            .platform
            .create_checkout_session(&request, credential.as_ref())
            .await;
        let session = self
            .sessions
            .settle(store, credential.as_ref(), result)
            .await?;
        info!("Checkout session created: {:?}", session.session_id);
        Ok(session)
    }

    /// Current state of a booking on the platform.
    pub async fn get_booking(
        &self,
        booking_id: &str,
        store: &mut CredentialStore,
    ) -> Result<BookingRecord, RidebookError> {
        check_identifier("bookingId", booking_id, "Invalid booking id")?;
        let credential = self.sessions.resolve(store).await;
        let result = self
            .platform
            .get_booking(booking_id, credential.as_ref())
            .await;
        Ok(self
            .sessions
            .settle(store, credential.as_ref(), result)
            .await?)
    }

    /// Forwards a form submission to the platform's form service.
    pub async fn submit_form(
        &self,
        namespace: &str,
        fields: Map<String, Value>,
        store: &mut CredentialStore,
    ) -> Result<FormReceipt, RidebookError> {
        let mut violations = Vec::new();
        if namespace.trim().is_empty() {
            violations.push(Violation::required("namespace"));
        } else if !is_identifier(namespace) {
            violations.push(Violation::format(
                "namespace",
                "namespace may only contain letters, digits, '-', '_' and '.'",
            ));
        }
        if fields.is_empty() {
            violations.push(Violation::new(
                "fields",
                "at least one field is required",
                "required",
            ));
        }
        if !violations.is_empty() {
            return Err(validation_error("Invalid form submission", violations));
        }

        let submission = FormSubmission {
            namespace: namespace.to_string(),
            fields,
        };
        let credential = self.sessions.resolve(store).await;
        let result = self
            .platform
            .submit_form(&submission, credential.as_ref())
            .await;
        let receipt = self
            .sessions
            .settle(store, credential.as_ref(), result)
            .await?;
        info!(
            "Form submission {} stored in {}",
            receipt.submission_id, namespace
        );
        Ok(receipt)
    }
}

fn checkout_request(checkout: &CheckoutConfig, target: CheckoutTarget) -> CheckoutSessionRequest {
    CheckoutSessionRequest {
        target,
        post_flow_url: checkout.post_flow_url(),
        thank_you_url: checkout.thank_you_url(),
    }
}

fn confirmation(
    record: BookingRecord,
    payload: &RemoteBookingPayload,
    checkout_url: Option<String>,
) -> BookingConfirmation {
    let slot = &payload.booked_entity.slot;
    BookingConfirmation {
        booking_id: record.booking_id,
        status: record.status,
        service_id: record.service_id.unwrap_or_else(|| slot.service_id.clone()),
        start_date: record.start_date.unwrap_or_else(|| slot.start_date.clone()),
        end_date: record.end_date.unwrap_or_else(|| slot.end_date.clone()),
        checkout_url,
    }
}
