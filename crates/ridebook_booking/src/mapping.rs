// --- File: crates/ridebook_booking/src/mapping.rs ---
//! Maps a normalized booking onto the platform's booking payload.

use ridebook_platform::{
    default_location_type, AdditionalField, BookedEntity, BookedSlot, ContactDetails,
    RemoteBookingPayload, SlotLocation, DEFAULT_PAYMENT_OPTION,
};

use crate::models::NormalizedBooking;

/// Used when the submission names no time zone.
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_PARTICIPANTS: u32 = 1;

/// Builds the platform payload. Pure; every nested object the platform
/// requires is filled in, with defaults where the submission is silent.
///
/// A missing start or end takes the value of the other one.
pub fn map(booking: &NormalizedBooking) -> RemoteBookingPayload {
    let schedule = &booking.schedule;
    let start_date = schedule
        .start
        .clone()
        .or_else(|| schedule.end.clone())
        .unwrap_or_default();
    let end_date = schedule.end.clone().unwrap_or_else(|| start_date.clone());

    RemoteBookingPayload {
        booked_entity: BookedEntity {
            slot: BookedSlot {
                service_id: booking.service_id.clone(),
                start_date,
                end_date,
                timezone: schedule
                    .timezone
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
                location: SlotLocation {
                    location_type: booking
                        .location_type
                        .clone()
                        .unwrap_or_else(default_location_type),
                    formatted_address: Some(booking.pickup.formatted.clone()),
                },
                resource_id: booking.resource_id.clone(),
            },
        },
        contact_details: ContactDetails {
            first_name: booking.contact.first_name.clone(),
            last_name: booking.contact.last_name.clone(),
            email: booking.contact.email.clone(),
            phone: booking.contact.phone.clone(),
        },
        total_participants: booking.passengers.unwrap_or(DEFAULT_PARTICIPANTS),
        additional_fields: additional_fields(booking),
        selected_payment_option: DEFAULT_PAYMENT_OPTION.to_string(),
        send_sms_reminder: false,
    }
}

fn additional_fields(booking: &NormalizedBooking) -> Vec<AdditionalField> {
    let mut fields = vec![
        field("pickup_address", &booking.pickup.formatted),
        field("destination_address", &booking.destination.formatted),
    ];
    if let Some(billing) = &booking.billing {
        fields.push(field("billing_address", &billing.formatted));
    }
    if !booking.add_ons.is_empty() {
        fields.push(field("add_ons", &booking.add_ons.join(", ")));
    }
    if !booking.special_items.is_empty() {
        fields.push(field("special_items", &booking.special_items.join(", ")));
    }
    if let Some(notes) = &booking.notes {
        fields.push(field("notes", notes));
    }
    fields
}

fn field(id: &str, value: &str) -> AdditionalField {
    AdditionalField {
        id: id.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, Contact, Schedule};
    use ridebook_platform::DEFAULT_LOCATION_TYPE;

    fn booking() -> NormalizedBooking {
        NormalizedBooking {
            service_id: "svc1".to_string(),
            contact: Contact {
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                email: "a@b.com".to_string(),
                phone: "+12045551234".to_string(),
            },
            schedule: Schedule {
                start: Some("2025-07-01T09:00:00".to_string()),
                end: None,
                timezone: None,
            },
            pickup: Address {
                formatted: "1 Main St".to_string(),
            },
            destination: Address {
                formatted: "YWG Airport".to_string(),
            },
            billing: None,
            add_ons: vec![],
            special_items: vec![],
            notes: None,
            passengers: None,
            resource_id: None,
            location_type: None,
        }
    }

    #[test]
    fn test_defaults_are_synthesized() {
        let payload = map(&booking());
        let slot = &payload.booked_entity.slot;
        assert_eq!(slot.start_date, "2025-07-01T09:00:00");
        assert_eq!(slot.end_date, "2025-07-01T09:00:00");
        assert_eq!(slot.timezone, DEFAULT_TIMEZONE);
        assert_eq!(slot.location.location_type, DEFAULT_LOCATION_TYPE);
        assert_eq!(slot.location.formatted_address.as_deref(), Some("1 Main St"));
        assert_eq!(payload.total_participants, 1);
        assert_eq!(payload.selected_payment_option, "ONLINE");
        assert_eq!(payload.contact_details.phone, "+12045551234");
        let ids: Vec<&str> = payload.additional_fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["pickup_address", "destination_address"]);
    }

    #[test]
    fn test_start_falls_back_to_end() {
        let mut b = booking();
        b.schedule.start = None;
        b.schedule.end = Some("2025-07-01T10:00:00".to_string());
        let slot = map(&b).booked_entity.slot;
        assert_eq!(slot.start_date, "2025-07-01T10:00:00");
        assert_eq!(slot.end_date, "2025-07-01T10:00:00");
    }

    #[test]
    fn test_optional_details_become_additional_fields() {
        let mut b = booking();
        b.billing = Some(Address {
            formatted: "2 Side St".to_string(),
        });
        b.add_ons = vec!["child seat".to_string(), "cooler".to_string()];
        b.notes = Some("Gate 4".to_string());
        b.passengers = Some(3);
        b.schedule.timezone = Some("America/Winnipeg".to_string());

        let payload = map(&b);
        assert_eq!(payload.total_participants, 3);
        assert_eq!(payload.booked_entity.slot.timezone, "America/Winnipeg");
        let add_ons = payload
            .additional_fields
            .iter()
            .find(|f| f.id == "add_ons")
            .unwrap();
        assert_eq!(add_ons.value, "child seat, cooler");
        assert_eq!(payload.additional_fields.len(), 5);
    }

    #[test]
    fn test_mapping_is_pure() {
        let b = booking();
        assert_eq!(map(&b), map(&b));
    }
}
