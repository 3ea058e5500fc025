//! Scripted in-memory platform for tests.
//!
//! Every call is recorded. Operations succeed with synthetic data unless a
//! fault has been scripted for them with [`MockPlatform::fail`].

use reqwest::Client;
use ridebook_common::SessionCredential;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::PlatformError;
use crate::models::{
    AvailabilityQuery, AvailabilitySlot, BookingRecord, CheckoutSession, CheckoutSessionRequest,
    FormReceipt, FormSubmission, IssuedToken, RemoteBookingPayload, ServiceSummary,
};
use crate::service::{BoxFuture, SchedulingPlatform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    IssueToken,
    RefreshToken,
    QueryServices,
    QueryAvailability,
    GetSlot,
    CreateBooking,
    GetBooking,
    CreateCheckout,
    SubmitForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    /// The platform answers with this HTTP status.
    Status(u16),
    /// The request never reaches the platform.
    Network,
    /// The platform answers 200 with an unusable body.
    Malformed,
}

impl MockFault {
    fn to_error(self) -> PlatformError {
        match self {
            MockFault::Status(code) => PlatformError::api(code, format!("scripted status {code}")),
            MockFault::Network => network_error(),
            MockFault::Malformed => PlatformError::ParseError("scripted malformed body".into()),
        }
    }
}

/// A genuine transport error: the URL has no host, so nothing is sent.
fn network_error() -> PlatformError {
    match Client::new().get("http://").build() {
        Err(err) => PlatformError::RequestError(err),
        Ok(_) => PlatformError::ConfigError("expected an invalid request".into()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: Operation,
    /// Token of the session credential passed along, if any.
    pub session_token: Option<String>,
}

#[derive(Default)]
struct State {
    calls: Vec<RecordedCall>,
    faults: HashMap<Operation, MockFault>,
    slots: Vec<AvailabilitySlot>,
    services: Vec<ServiceSummary>,
    bookings: HashMap<String, BookingRecord>,
    booking_payloads: Vec<RemoteBookingPayload>,
    checkout_requests: Vec<CheckoutSessionRequest>,
    form_submissions: Vec<FormSubmission>,
    counter: u32,
}

pub struct MockPlatform {
    state: Mutex<State>,
    has_api_key: bool,
    token_ttl_secs: i64,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    /// A platform without an elevated API key: authenticated calls need a session.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            has_api_key: false,
            token_ttl_secs: 4 * 60 * 60,
        }
    }

    /// Authenticated calls succeed even without a session.
    pub fn with_api_key(mut self) -> Self {
        self.has_api_key = true;
        self
    }

    pub fn with_token_ttl_secs(mut self, secs: i64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    pub fn with_slots(self, slots: Vec<AvailabilitySlot>) -> Self {
        self.lock().slots = slots;
        self
    }

    pub fn with_services(self, services: Vec<ServiceSummary>) -> Self {
        self.lock().services = services;
        self
    }

    /// Scripts every future call of `operation` to fail with `fault`.
    pub fn fail(&self, operation: Operation, fault: MockFault) {
        self.lock().faults.insert(operation, fault);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn booking_payloads(&self) -> Vec<RemoteBookingPayload> {
        self.lock().booking_payloads.clone()
    }

    pub fn checkout_requests(&self) -> Vec<CheckoutSessionRequest> {
        self.lock().checkout_requests.clone()
    }

    pub fn form_submissions(&self) -> Vec<FormSubmission> {
        self.lock().form_submissions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records the call and returns the scripted fault, if any.
    fn enter(
        &self,
        state: &mut State,
        operation: Operation,
        session: Option<&SessionCredential>,
        needs_credential: bool,
    ) -> Result<u32, PlatformError> {
        state.calls.push(RecordedCall {
            operation,
            session_token: session.map(|s| s.token.clone()),
        });
        if needs_credential && session.is_none() && !self.has_api_key {
            return Err(PlatformError::MissingCredentials);
        }
        if let Some(fault) = state.faults.get(&operation) {
            return Err(fault.to_error());
        }
        state.counter += 1;
        Ok(state.counter)
    }

    fn token(&self, operation: Operation) -> Result<IssuedToken, PlatformError> {
        let mut state = self.lock();
        let n = self.enter(&mut state, operation, None, false)?;
        Ok(IssuedToken {
            access_token: format!("visitor-token-{n}"),
            refresh_token: Some(format!("refresh-token-{n}")),
            expires_in_secs: Some(self.token_ttl_secs),
        })
    }
}

impl SchedulingPlatform for MockPlatform {
    fn issue_visitor_token(&self) -> BoxFuture<'_, IssuedToken, PlatformError> {
        let result = self.token(Operation::IssueToken);
        Box::pin(async move { result })
    }

    fn refresh_visitor_token(
        &self,
        _refresh_token: &str,
    ) -> BoxFuture<'_, IssuedToken, PlatformError> {
        let result = self.token(Operation::RefreshToken);
        Box::pin(async move { result })
    }

    fn query_services(
        &self,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, Vec<ServiceSummary>, PlatformError> {
        let mut state = self.lock();
        let result = self
            .enter(&mut state, Operation::QueryServices, session, true)
            .map(|_| state.services.clone());
        drop(state);
        Box::pin(async move { result })
    }

    fn query_availability(
        &self,
        _query: &AvailabilityQuery,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, Vec<AvailabilitySlot>, PlatformError> {
        let mut state = self.lock();
        let result = self
            .enter(&mut state, Operation::QueryAvailability, session, true)
            .map(|_| state.slots.clone());
        drop(state);
        Box::pin(async move { result })
    }

    fn get_slot_availability(
        &self,
        query: &AvailabilityQuery,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, Option<AvailabilitySlot>, PlatformError> {
        let mut state = self.lock();
        let result = self
            .enter(&mut state, Operation::GetSlot, session, true)
            .map(|_| {
                state
                    .slots
                    .iter()
                    .find(|s| s.start_date == query.start_local && s.end_date == query.end_local)
                    .cloned()
            });
        drop(state);
        Box::pin(async move { result })
    }

    fn create_booking(
        &self,
        payload: &RemoteBookingPayload,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, BookingRecord, PlatformError> {
        let mut state = self.lock();
        state.booking_payloads.push(payload.clone());
        let result = self
            .enter(&mut state, Operation::CreateBooking, session, true)
            .map(|n| {
                let slot = &payload.booked_entity.slot;
                let record = BookingRecord {
                    booking_id: format!("bk-{n}"),
                    status: "CREATED".to_string(),
                    service_id: Some(slot.service_id.clone()),
                    start_date: Some(slot.start_date.clone()),
                    end_date: Some(slot.end_date.clone()),
                };
                state
                    .bookings
                    .insert(record.booking_id.clone(), record.clone());
                record
            });
        drop(state);
        Box::pin(async move { result })
    }

    fn get_booking(
        &self,
        booking_id: &str,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, BookingRecord, PlatformError> {
        let mut state = self.lock();
        let result = self
            .enter(&mut state, Operation::GetBooking, session, true)
            .and_then(|_| {
                state
                    .bookings
                    .get(booking_id)
                    .cloned()
                    .ok_or_else(|| PlatformError::api(404, "booking not found"))
            });
        drop(state);
        Box::pin(async move { result })
    }

    fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, CheckoutSession, PlatformError> {
        let mut state = self.lock();
        state.checkout_requests.push(request.clone());
        let result = self
            .enter(&mut state, Operation::CreateCheckout, session, true)
            .map(|n| CheckoutSession {
                session_id: Some(format!("rs-{n}")),
                url: format!("https://checkout.example/rs-{n}"),
            });
        drop(state);
        Box::pin(async move { result })
    }

    fn submit_form(
        &self,
        submission: &FormSubmission,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, FormReceipt, PlatformError> {
        let mut state = self.lock();
        state.form_submissions.push(submission.clone());
        let result = self
            .enter(&mut state, Operation::SubmitForm, session, true)
            .map(|n| FormReceipt {
                submission_id: format!("sub-{n}"),
                status: Some("CONFIRMED".to_string()),
            });
        drop(state);
        Box::pin(async move { result })
    }
}
