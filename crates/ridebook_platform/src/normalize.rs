//! Normalization of platform responses into strict entities.
//!
//! Each response body is deserialized once into a lenient `Raw*` shape and
//! converted here; nothing else in the workspace reads platform JSON.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::PlatformError;
use crate::models::{
    AvailabilitySlot, BookingRecord, CheckoutSession, FormReceipt, IssuedToken, ServicePrice,
    ServiceSummary,
};

const UNKNOWN_STATUS: &str = "UNKNOWN";

fn parse<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, PlatformError> {
    serde_json::from_str(body)
        .map_err(|e| PlatformError::ParseError(format!("{} response: {}", what, e)))
}

fn missing(what: &str, field: &str) -> PlatformError {
    PlatformError::ParseError(format!("{} response is missing `{}`", what, field))
}

// --- Token ---

#[derive(Deserialize)]
struct RawToken {
    #[serde(alias = "accessToken")]
    access_token: Option<String>,
    #[serde(alias = "refreshToken")]
    refresh_token: Option<String>,
    #[serde(alias = "expiresIn")]
    expires_in: Option<i64>,
}

pub fn token(body: &str) -> Result<IssuedToken, PlatformError> {
    let raw: RawToken = parse(body, "token")?;
    let access_token = raw
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("token", "access_token"))?;
    Ok(IssuedToken {
        access_token,
        refresh_token: raw.refresh_token.filter(|t| !t.is_empty()),
        expires_in_secs: raw.expires_in,
    })
}

// --- Services ---

#[derive(Deserialize)]
struct RawServices {
    #[serde(default)]
    services: Vec<RawService>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawService {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    schedule: Option<RawSchedule>,
    payment: Option<RawPayment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchedule {
    availability_constraints: Option<RawConstraints>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConstraints {
    #[serde(default)]
    session_durations: Vec<u32>,
}

#[derive(Deserialize)]
struct RawPayment {
    fixed: Option<RawFixed>,
}

#[derive(Deserialize)]
struct RawFixed {
    price: Option<RawMoney>,
}

#[derive(Deserialize)]
struct RawMoney {
    value: Option<String>,
    currency: Option<String>,
}

pub fn services(body: &str) -> Result<Vec<ServiceSummary>, PlatformError> {
    let raw: RawServices = parse(body, "services")?;
    let summaries = raw
        .services
        .into_iter()
        .filter_map(|service| {
            let Some(id) = service.id else {
                debug!("Skipping service without id");
                return None;
            };
            let price = service
                .payment
                .and_then(|p| p.fixed)
                .and_then(|f| f.price)
                .and_then(|m| match (m.value, m.currency) {
                    (Some(value), Some(currency)) => Some(ServicePrice { value, currency }),
                    _ => None,
                });
            let duration_minutes = service
                .schedule
                .and_then(|s| s.availability_constraints)
                .and_then(|c| c.session_durations.into_iter().next());
            Some(ServiceSummary {
                name: service.name.unwrap_or_else(|| id.clone()),
                id,
                description: service.description,
                duration_minutes,
                price,
            })
        })
        .collect();
    Ok(summaries)
}

// --- Availability ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAvailability {
    #[serde(default)]
    availability_entries: Vec<RawEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSingleSlot {
    availability_entry: Option<RawEntry>,
}

#[derive(Deserialize)]
struct RawEntry {
    slot: Option<RawSlot>,
    bookable: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSlot {
    start_date: Option<String>,
    end_date: Option<String>,
    resource: Option<RawResource>,
}

#[derive(Deserialize)]
struct RawResource {
    id: Option<String>,
}

fn entry(raw: RawEntry) -> Result<AvailabilitySlot, PlatformError> {
    let slot = raw.slot.ok_or_else(|| missing("availability", "slot"))?;
    Ok(AvailabilitySlot {
        start_date: slot
            .start_date
            .ok_or_else(|| missing("availability", "slot.startDate"))?,
        end_date: slot
            .end_date
            .ok_or_else(|| missing("availability", "slot.endDate"))?,
        is_available: raw.bookable.unwrap_or(false),
        resource_id: slot.resource.and_then(|r| r.id),
    })
}

/// Zero entries is a valid answer: no availability in the window.
pub fn availability(body: &str) -> Result<Vec<AvailabilitySlot>, PlatformError> {
    let raw: RawAvailability = parse(body, "availability")?;
    raw.availability_entries.into_iter().map(entry).collect()
}

pub fn slot(body: &str) -> Result<Option<AvailabilitySlot>, PlatformError> {
    let raw: RawSingleSlot = parse(body, "slot availability")?;
    raw.availability_entry.map(entry).transpose()
}

// --- Bookings ---

#[derive(Deserialize)]
struct RawBookingEnvelope {
    booking: Option<RawBooking>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBooking {
    id: Option<String>,
    status: Option<String>,
    booked_entity: Option<RawBookedEntity>,
}

#[derive(Deserialize)]
struct RawBookedEntity {
    slot: Option<RawBookedSlot>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBookedSlot {
    service_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

pub fn booking(body: &str) -> Result<BookingRecord, PlatformError> {
    let raw: RawBookingEnvelope = parse(body, "booking")?;
    let booking = raw.booking.ok_or_else(|| missing("booking", "booking"))?;
    let booking_id = booking
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| missing("booking", "booking.id"))?;
    let slot = booking.booked_entity.and_then(|e| e.slot);
    let (service_id, start_date, end_date) = match slot {
        Some(s) => (s.service_id, s.start_date, s.end_date),
        None => (None, None, None),
    };
    Ok(BookingRecord {
        booking_id,
        status: booking
            .status
            .unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
        service_id,
        start_date,
        end_date,
    })
}

// --- Checkout ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRedirectEnvelope {
    redirect_session: Option<RawRedirectSession>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRedirectSession {
    id: Option<String>,
    full_url: Option<String>,
}

pub fn checkout_session(body: &str) -> Result<CheckoutSession, PlatformError> {
    let raw: RawRedirectEnvelope = parse(body, "checkout")?;
    let session = raw
        .redirect_session
        .ok_or_else(|| missing("checkout", "redirectSession"))?;
    let url = session
        .full_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| missing("checkout", "redirectSession.fullUrl"))?;
    Ok(CheckoutSession {
        session_id: session.id,
        url,
    })
}

// --- Forms ---

#[derive(Deserialize)]
struct RawSubmissionEnvelope {
    submission: Option<RawSubmission>,
}

#[derive(Deserialize)]
struct RawSubmission {
    id: Option<String>,
    status: Option<String>,
}

pub fn form_receipt(body: &str) -> Result<FormReceipt, PlatformError> {
    let raw: RawSubmissionEnvelope = parse(body, "form submission")?;
    let submission = raw
        .submission
        .ok_or_else(|| missing("form submission", "submission"))?;
    Ok(FormReceipt {
        submission_id: submission
            .id
            .ok_or_else(|| missing("form submission", "submission.id"))?,
        status: submission.status,
    })
}
