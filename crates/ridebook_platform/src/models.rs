// --- File: crates/ridebook_platform/src/models.rs ---
//! Strict entities exchanged with the scheduling platform.
//!
//! Outbound payloads serialize in the platform's camelCase schema. Inbound
//! data only reaches these types through [`crate::normalize`].

use chrono::{DateTime, Duration, Utc};
use ridebook_common::SessionCredential;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Location type used when the caller does not name one; rides are picked up
/// at the customer's address.
pub const DEFAULT_LOCATION_TYPE: &str = "CUSTOMER";

/// Payment option requested for every booking; the checkout session collects it.
pub const DEFAULT_PAYMENT_OPTION: &str = "ONLINE";

pub fn default_location_type() -> String {
    DEFAULT_LOCATION_TYPE.to_string()
}

// --- Tokens ---

/// A token freshly issued by the platform's token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in_secs: Option<i64>,
}

impl IssuedToken {
    /// Converts the token into a visitor credential expiring relative to `now`.
    /// A lifetime that does not fit a timestamp is dropped.
    pub fn into_visitor_credential(self, now: DateTime<Utc>) -> SessionCredential {
        let expires_at = self
            .expires_in_secs
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));
        SessionCredential::visitor(self.access_token, self.refresh_token, expires_at)
    }
}

// --- Catalog ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ServicePrice {
    #[cfg_attr(feature = "openapi", schema(example = "85.00"))]
    pub value: String,
    #[cfg_attr(feature = "openapi", schema(example = "CAD"))]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<ServicePrice>,
}

// --- Availability ---

/// Availability query with naive local timestamps (`YYYY-MM-DDTHH:MM:SS`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    #[serde(default, alias = "service_id")]
    #[cfg_attr(feature = "openapi", schema(example = "svc-airport-transfer"))]
    pub service_id: String,
    #[serde(default, alias = "start_local")]
    #[cfg_attr(feature = "openapi", schema(example = "2025-07-01T09:00:00"))]
    pub start_local: String,
    #[serde(default, alias = "end_local")]
    #[cfg_attr(feature = "openapi", schema(example = "2025-07-01T10:00:00"))]
    pub end_local: String,
    #[serde(default, alias = "time_zone")]
    #[cfg_attr(feature = "openapi", schema(example = "America/Winnipeg"))]
    pub time_zone: String,
    #[serde(default = "default_location_type", alias = "location_type")]
    pub location_type: String,
    #[serde(default, alias = "resource_ids", skip_serializing_if = "Option::is_none")]
    pub resource_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub start_date: String,
    pub end_date: String,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

// --- Booking creation payload ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBookingPayload {
    pub booked_entity: BookedEntity,
    pub contact_details: ContactDetails,
    pub total_participants: u32,
    pub additional_fields: Vec<AdditionalField>,
    pub selected_payment_option: String,
    pub send_sms_reminder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedEntity {
    pub slot: BookedSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlot {
    pub service_id: String,
    pub start_date: String,
    pub end_date: String,
    pub timezone: String,
    pub location: SlotLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotLocation {
    pub location_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalField {
    pub id: String,
    pub value: String,
}

// --- Booking records ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[cfg_attr(feature = "openapi", schema(example = "bk-7f3a"))]
    pub booking_id: String,
    #[cfg_attr(feature = "openapi", schema(example = "CREATED"))]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

// --- Checkout ---

/// What a checkout session pays for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(untagged)]
pub enum CheckoutTarget {
    /// An already created booking.
    Booking {
        #[serde(rename = "bookingId", alias = "booking_id")]
        booking_id: String,
    },
    /// Direct checkout of an available slot.
    Slot(AvailabilityQuery),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    pub target: CheckoutTarget,
    pub post_flow_url: String,
    pub thank_you_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub url: String,
}

// --- Forms ---

#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub namespace: String,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FormReceipt {
    pub submission_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
