// --- File: crates/ridebook_booking/src/validation.rs ---
//! Validation and normalization of raw booking submissions.
//!
//! Submissions are free-form JSON objects. Both snake_case and camelCase keys
//! are accepted, and address fields may be a plain string or an object with a
//! `formatted` member.

use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use ridebook_common::{translate, validation_error, ErrorEnvelope, RidebookError, Violation};
use serde_json::{Map, Value};

use crate::models::{Address, Contact, NormalizedBooking, Schedule, ValidationResult};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

const SERVICE_ID: &[&str] = &["service_id", "serviceId"];
const FIRST_NAME: &[&str] = &["first_name", "firstName"];
const LAST_NAME: &[&str] = &["last_name", "lastName"];
const EMAIL: &[&str] = &["email"];
const PHONE: &[&str] = &["phone"];
const START_DATE: &[&str] = &["start_date", "startDate"];
const END_DATE: &[&str] = &["end_date", "endDate"];
const TIMEZONE: &[&str] = &["timezone", "timeZone", "time_zone"];
const PICKUP_ADDRESS: &[&str] = &["pickup_address", "pickupAddress"];
const DESTINATION_ADDRESS: &[&str] = &["destination_address", "destinationAddress"];
const BILLING_ADDRESS: &[&str] = &["billing_address", "billingAddress"];
const ADD_ONS: &[&str] = &["add_ons", "addOns"];
const SPECIAL_ITEMS: &[&str] = &["special_items", "specialItems"];
const NOTES: &[&str] = &["notes"];
const PASSENGERS: &[&str] = &["passengers", "passenger_count", "passengerCount"];
const RESOURCE_ID: &[&str] = &["resource_id", "resourceId"];
const LOCATION_TYPE: &[&str] = &["location_type", "locationType"];

/// Normalizes a phone number towards E.164.
///
/// Input starting with `+` keeps the `+` and its digits. Otherwise 11 digits
/// with a leading `1` and anything longer than 10 digits get a `+`, and
/// exactly 10 digits get `+1`. Shorter input is returned unmodified.
pub fn normalize_phone_e164(phone: &str) -> String {
    let trimmed = phone.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if trimmed.starts_with('+') {
        return format!("+{digits}");
    }
    match digits.len() {
        11 if digits.starts_with('1') => format!("+{digits}"),
        10 => format!("+1{digits}"),
        n if n > 10 => format!("+{digits}"),
        _ => phone.to_string(),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// The first non-blank value under any of `names`, as text.
fn text(raw: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match raw.get(*name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn address(raw: &Map<String, Value>, names: &[&str]) -> Option<Address> {
    names.iter().find_map(|name| {
        let formatted = match raw.get(*name) {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Object(block)) => block
                .get("formatted")
                .or_else(|| block.get("formattedAddress"))
                .and_then(Value::as_str),
            _ => None,
        }?;
        let formatted = formatted.trim();
        if formatted.is_empty() {
            None
        } else {
            Some(Address {
                formatted: formatted.to_string(),
            })
        }
    })
}

/// A list of labels; entries may be strings or objects with a `name`.
fn labels(raw: &Map<String, Value>, names: &[&str]) -> Vec<String> {
    let entries = names
        .iter()
        .find_map(|name| raw.get(*name).and_then(Value::as_array));
    entries
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Object(obj) => obj
                        .get("name")
                        .and_then(Value::as_str)
                        .map(|s| s.trim().to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Passenger count; `Err(())` when present but not a positive integer.
fn passengers(raw: &Map<String, Value>) -> Result<Option<u32>, ()> {
    let Some(value) = PASSENGERS
        .iter()
        .find_map(|name| raw.get(*name).filter(|v| !v.is_null()))
    else {
        return Ok(None);
    };
    let count = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match count.and_then(|c| u32::try_from(c).ok()) {
        Some(c) if c > 0 => Ok(Some(c)),
        _ => Err(()),
    }
}

/// Checks a raw submission.
///
/// Missing required fields come first, one entry each in the fixed field
/// order; format problems of present fields follow, also in field order.
pub fn validate(raw: &Map<String, Value>) -> ValidationResult {
    let mut missing = Vec::new();
    let mut malformed = Vec::new();

    for (field, names) in [
        ("service_id", SERVICE_ID),
        ("first_name", FIRST_NAME),
        ("last_name", LAST_NAME),
        ("email", EMAIL),
        ("phone", PHONE),
    ] {
        if text(raw, names).is_none() {
            missing.push(Violation::required(field));
        }
    }
    if text(raw, START_DATE).is_none() && text(raw, END_DATE).is_none() {
        missing.push(Violation::required("start_date"));
    }
    for (field, names) in [
        ("pickup_address", PICKUP_ADDRESS),
        ("destination_address", DESTINATION_ADDRESS),
    ] {
        if address(raw, names).is_none() {
            missing.push(Violation::required(field));
        }
    }

    if let Some(email) = text(raw, EMAIL) {
        if !is_valid_email(&email) {
            malformed.push(Violation::format("email", "email is not a valid address"));
        }
    }
    if let Some(zone) = text(raw, TIMEZONE) {
        if zone.parse::<Tz>().is_err() {
            malformed.push(Violation::format(
                "timezone",
                format!("'{zone}' is not an IANA time zone"),
            ));
        }
    }
    if passengers(raw).is_err() {
        malformed.push(Violation::format(
            "passengers",
            "passengers must be a positive whole number",
        ));
    }

    let violations: Vec<Violation> = missing.into_iter().chain(malformed).collect();
    ValidationResult {
        is_valid: violations.is_empty(),
        errors: violations.iter().map(|v| v.field.clone()).collect(),
        violations,
    }
}

impl ValidationResult {
    /// The validation fault, if the submission was rejected.
    pub fn into_error(self) -> Option<RidebookError> {
        if self.is_valid {
            None
        } else {
            Some(validation_error("Invalid booking request", self.violations))
        }
    }
}

/// Validates, then builds the normalized booking.
pub fn normalize(raw: &Map<String, Value>) -> Result<NormalizedBooking, ErrorEnvelope> {
    normalize_or_fault(raw).map_err(|fault| translate(&fault))
}

pub(crate) fn normalize_or_fault(
    raw: &Map<String, Value>,
) -> Result<NormalizedBooking, RidebookError> {
    if let Some(fault) = validate(raw).into_error() {
        return Err(fault);
    }
    build(raw).ok_or_else(|| {
        validation_error(
            "Invalid booking request",
            vec![Violation::new("body", "booking could not be read", "invalid")],
        )
    })
}

fn build(raw: &Map<String, Value>) -> Option<NormalizedBooking> {
    let phone = text(raw, PHONE)?;
    Some(NormalizedBooking {
        service_id: text(raw, SERVICE_ID)?,
        contact: Contact {
            first_name: text(raw, FIRST_NAME)?,
            last_name: text(raw, LAST_NAME)?,
            email: text(raw, EMAIL)?,
            phone: normalize_phone_e164(&phone),
        },
        schedule: Schedule {
            start: text(raw, START_DATE),
            end: text(raw, END_DATE),
            timezone: text(raw, TIMEZONE),
        },
        pickup: address(raw, PICKUP_ADDRESS)?,
        destination: address(raw, DESTINATION_ADDRESS)?,
        billing: address(raw, BILLING_ADDRESS),
        add_ons: labels(raw, ADD_ONS),
        special_items: labels(raw, SPECIAL_ITEMS),
        notes: text(raw, NOTES),
        passengers: passengers(raw).ok().flatten(),
        resource_id: text(raw, RESOURCE_ID),
        location_type: text(raw, LOCATION_TYPE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn complete() -> Map<String, Value> {
        raw(json!({
            "service_id": "svc1",
            "first_name": "A",
            "last_name": "B",
            "email": "a@b.com",
            "phone": "2045551234",
            "start_date": "2025-07-01T09:00:00",
            "pickup_address": "1 Main St, Winnipeg",
            "destination_address": "YWG Airport"
        }))
    }

    #[test]
    fn test_phone_normalization_cases() {
        assert_eq!(normalize_phone_e164("2045551234"), "+12045551234");
        assert_eq!(normalize_phone_e164("(204) 555-1234"), "+12045551234");
        assert_eq!(normalize_phone_e164("1-204-555-1234"), "+12045551234");
        assert_eq!(normalize_phone_e164("+44 20 7946 0958"), "+442079460958");
        assert_eq!(normalize_phone_e164("442079460958"), "+442079460958");
        assert_eq!(normalize_phone_e164("555-1234"), "555-1234");
    }

    #[test]
    fn test_complete_submission_is_valid() {
        let result = validate(&complete());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_missing_email_is_reported() {
        let mut submission = complete();
        submission.remove("email");
        let result = validate(&submission);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["email"]);
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let mut submission = complete();
        submission.insert("first_name".into(), json!("   "));
        submission.insert("pickup_address".into(), json!({ "formatted": "" }));
        let result = validate(&submission);
        assert_eq!(result.errors, vec!["first_name", "pickup_address"]);
    }

    #[test]
    fn test_end_date_alone_satisfies_the_schedule() {
        let mut submission = complete();
        submission.remove("start_date");
        submission.insert("endDate".into(), json!("2025-07-01T10:00:00"));
        assert!(validate(&submission).is_valid);

        submission.remove("endDate");
        assert_eq!(validate(&submission).errors, vec!["start_date"]);
    }

    #[test]
    fn test_format_errors_follow_missing_fields() {
        let mut submission = complete();
        submission.remove("service_id");
        submission.insert("email".into(), json!("not-an-email"));
        submission.insert("timezone".into(), json!("Nowhere/Land"));
        let result = validate(&submission);
        assert_eq!(result.errors, vec!["service_id", "email", "timezone"]);
        assert_eq!(result.violations[0].rule, "required");
        assert_eq!(result.violations[1].rule, "format");
        assert_eq!(result.violations[2].rule, "format");
    }

    #[test]
    fn test_short_phone_passes_through_unmodified() {
        let mut submission = complete();
        submission.insert("phone".into(), json!("555-1234"));
        assert!(validate(&submission).is_valid);

        let booking = normalize(&submission).unwrap();
        assert_eq!(booking.contact.phone, "555-1234");
    }

    #[test]
    fn test_camel_case_and_address_objects_are_accepted() {
        let submission = raw(json!({
            "serviceId": "svc1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.org",
            "phone": "+1 204 555 1234",
            "startDate": "2025-07-01T09:00:00",
            "timeZone": "America/Winnipeg",
            "pickupAddress": { "formatted": "1 Main St", "placeId": "p1" },
            "destinationAddress": { "formattedAddress": "YWG Airport" },
            "addOns": ["child seat", { "name": "extra luggage" }],
            "passengerCount": "3"
        }));

        let booking = normalize(&submission).unwrap();
        assert_eq!(booking.service_id, "svc1");
        assert_eq!(booking.contact.phone, "+12045551234");
        assert_eq!(booking.pickup.formatted, "1 Main St");
        assert_eq!(booking.destination.formatted, "YWG Airport");
        assert_eq!(booking.schedule.timezone.as_deref(), Some("America/Winnipeg"));
        assert_eq!(booking.add_ons, vec!["child seat", "extra luggage"]);
        assert_eq!(booking.passengers, Some(3));
    }

    #[test]
    fn test_unknown_time_zone_and_bad_passenger_count() {
        let mut submission = complete();
        submission.insert("timezone".into(), json!("Nowhere/Land"));
        submission.insert("passengers".into(), json!(0));
        let result = validate(&submission);
        assert_eq!(result.errors, vec!["timezone", "passengers"]);
    }

    #[test]
    fn test_normalize_returns_validation_envelope() {
        let mut submission = complete();
        submission.remove("phone");
        let envelope = normalize(&submission).unwrap_err();
        assert_eq!(envelope.category(), ridebook_common::ErrorCategory::Validation);
        assert_eq!(envelope.violations()[0].field, "phone");
    }
}
