// --- File: crates/ridebook_booking/src/models.rs ---
use ridebook_common::{ErrorEnvelope, Violation};
use serde::Serialize;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A pickup, destination or billing address as the client sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// E.164 when the input had enough digits.
    pub phone: String,
}

/// Naive local timestamps; at least one of `start` and `end` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub start: Option<String>,
    pub end: Option<String>,
    pub timezone: Option<String>,
}

/// A booking submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBooking {
    pub service_id: String,
    pub contact: Contact,
    pub schedule: Schedule,
    pub pickup: Address,
    pub destination: Address,
    pub billing: Option<Address>,
    pub add_ons: Vec<String>,
    pub special_items: Vec<String>,
    pub notes: Option<String>,
    pub passengers: Option<u32>,
    pub resource_id: Option<String>,
    pub location_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Offending field names, missing fields first.
    pub errors: Vec<String>,
    pub violations: Vec<Violation>,
}

/// A booking the platform accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    #[cfg_attr(feature = "openapi", schema(example = "bk-7f3a"))]
    pub booking_id: String,
    #[cfg_attr(feature = "openapi", schema(example = "CREATED"))]
    pub status: String,
    pub service_id: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(example = "https://checkout.example/rs-1"))]
    pub checkout_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingResult {
    Success(BookingConfirmation),
    Failure(ErrorEnvelope),
}

impl BookingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BookingResult::Success(_))
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        match self {
            BookingResult::Success(confirmation) => Some(confirmation),
            BookingResult::Failure(_) => None,
        }
    }

    pub fn envelope(&self) -> Option<&ErrorEnvelope> {
        match self {
            BookingResult::Success(_) => None,
            BookingResult::Failure(envelope) => Some(envelope),
        }
    }
}
