#[cfg(test)]
mod tests {
    use crate::validation::{normalize_phone_e164, validate};
    use proptest::prelude::*;
    use proptest::sample::subsequence;
    use serde_json::{json, Map, Value};

    const REQUIRED: [&str; 8] = [
        "service_id",
        "first_name",
        "last_name",
        "email",
        "phone",
        "start_date",
        "pickup_address",
        "destination_address",
    ];

    fn complete() -> Map<String, Value> {
        let mut raw = Map::new();
        raw.insert("service_id".into(), json!("svc1"));
        raw.insert("first_name".into(), json!("A"));
        raw.insert("last_name".into(), json!("B"));
        raw.insert("email".into(), json!("a@b.com"));
        raw.insert("phone".into(), json!("2045551234"));
        raw.insert("start_date".into(), json!("2025-07-01T09:00:00"));
        raw.insert("pickup_address".into(), json!("1 Main St"));
        raw.insert("destination_address".into(), json!("YWG Airport"));
        raw
    }

    proptest! {
        #[test]
        fn ten_digit_numbers_get_country_code_one(digits in "[0-9]{10}") {
            prop_assert_eq!(normalize_phone_e164(&digits), format!("+1{}", digits));
        }

        #[test]
        fn plus_prefixed_numbers_keep_their_digits(
            digits in "[0-9]{1,15}",
            noise in prop::collection::vec(prop::sample::select(vec![' ', '-', '(', ')', '.']), 0..6),
        ) {
            let mut input = String::from("+");
            for (i, c) in digits.chars().enumerate() {
                if let Some(n) = noise.get(i) {
                    input.push(*n);
                }
                input.push(c);
            }
            prop_assert_eq!(normalize_phone_e164(&input), format!("+{}", digits));
        }

        #[test]
        fn every_missing_field_is_reported_in_order(
            removed in subsequence(REQUIRED.to_vec(), 0..=REQUIRED.len()),
        ) {
            let mut raw = complete();
            for field in &removed {
                raw.remove(*field);
            }

            let result = validate(&raw);
            let expected: Vec<String> = removed.iter().map(|f| f.to_string()).collect();
            prop_assert_eq!(result.is_valid, removed.is_empty());
            prop_assert_eq!(result.errors, expected);
        }
    }
}
