//! Service abstraction for the remote scheduling/commerce platform.
//!
//! The backend constructs one implementation at startup and injects it as
//! `Arc<dyn SchedulingPlatform>`; tests use [`crate::mock::MockPlatform`].

use ridebook_common::SessionCredential;
use std::future::Future;
use std::pin::Pin;

use crate::error::PlatformError;
use crate::models::{
    AvailabilityQuery, AvailabilitySlot, BookingRecord, CheckoutSession, CheckoutSessionRequest,
    FormReceipt, FormSubmission, IssuedToken, RemoteBookingPayload, ServiceSummary,
};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Operations offered by the scheduling platform.
///
/// `session` is the caller's current credential, if any. Implementations
/// decide which credential strategies apply to each call.
pub trait SchedulingPlatform: Send + Sync {
    /// Issue a new anonymous visitor token.
    fn issue_visitor_token(&self) -> BoxFuture<'_, IssuedToken, PlatformError>;

    /// Exchange a visitor refresh token for a new access token.
    fn refresh_visitor_token(&self, refresh_token: &str)
        -> BoxFuture<'_, IssuedToken, PlatformError>;

    /// Query the bookable service catalog.
    fn query_services(
        &self,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, Vec<ServiceSummary>, PlatformError>;

    /// Query all slots inside the query window.
    fn query_availability(
        &self,
        query: &AvailabilityQuery,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, Vec<AvailabilitySlot>, PlatformError>;

    /// Check one exact slot. `None` means the platform does not know the slot.
    fn get_slot_availability(
        &self,
        query: &AvailabilityQuery,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, Option<AvailabilitySlot>, PlatformError>;

    /// Create a booking.
    fn create_booking(
        &self,
        payload: &RemoteBookingPayload,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, BookingRecord, PlatformError>;

    /// Fetch a booking by id.
    fn get_booking(
        &self,
        booking_id: &str,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, BookingRecord, PlatformError>;

    /// Create a checkout redirect session.
    fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, CheckoutSession, PlatformError>;

    /// Ingest a form submission into a namespace.
    fn submit_form(
        &self,
        submission: &FormSubmission,
        session: Option<&SessionCredential>,
    ) -> BoxFuture<'_, FormReceipt, PlatformError>;
}
