use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::catalog::DEFAULT_PRODUCT;

pub const VALID_FEEDBACK: &str = "Details valid. Please review carefully and press Confirm Order.";

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("valid email pattern")
    })
}

/// Outcome of validating one candidate field set. Accepted and rejected
/// entries are kept in canonical slot order; validation never fails, it only
/// rejects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    accepted: Vec<(&'static str, Value)>,
    rejected: Vec<(&'static str, String)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn accepted(&self) -> &[(&'static str, Value)] {
        &self.accepted
    }

    pub fn rejected(&self) -> &[(&'static str, String)] {
        &self.rejected
    }

    pub fn accepted_updates(&self) -> Map<String, Value> {
        self.accepted.iter().map(|(slot, value)| (slot.to_string(), value.clone())).collect()
    }

    pub fn rejected_slots(&self) -> Vec<&'static str> {
        self.rejected.iter().map(|(slot, _)| *slot).collect()
    }

    pub fn feedback_message(&self) -> String {
        if self.is_valid() {
            return VALID_FEEDBACK.to_string();
        }

        let mut message = String::from("The following details need correction:\n\n");
        for (slot, reason) in &self.rejected {
            message.push_str(&format!("❌ **{}**: {reason}\n", display_name(slot)));
        }
        message.push_str("\nPlease correct these fields in the form below.");
        message
    }

    fn accept(&mut self, slot: &'static str, value: Value) {
        self.accepted.push((slot, value));
    }

    fn reject(&mut self, slot: &'static str, reason: impl Into<String>) {
        self.rejected.push((slot, reason.into()));
    }
}

/// Validates a candidate order field set. Rules apply per field and are
/// independent of each other; malformed values become rejections.
pub fn validate_order_fields(data: &Map<String, Value>) -> ValidationReport {
    let mut report = ValidationReport::default();

    let name = text_field(data, "full_name").trim().to_string();
    if name.chars().count() < 2 {
        report.reject("full_name", "Must be at least 2 characters");
    } else {
        report.accept("full_name", Value::String(name));
    }

    let email = text_field(data, "email").trim().to_string();
    if email_re().is_match(&email) {
        report.accept("email", Value::String(email));
    } else {
        report.reject("email", "Invalid email format");
    }

    // The digit count gates acceptance, but the stored value stays exactly as
    // the caller wrote it.
    let phone = text_field(data, "phone");
    let digit_count = phone.chars().filter(char::is_ascii_digit).count();
    if digit_count < 10 {
        report.reject("phone", format!("Must be at least 10 digits (found {digit_count})"));
    } else {
        report.accept("phone", Value::String(phone));
    }

    let address = text_field(data, "address").trim().to_string();
    if address.chars().count() < 5 {
        report.reject("address", "Must be at least 5 characters");
    } else {
        report.accept("address", Value::String(address));
    }

    let product = data
        .get("product_interest")
        .cloned()
        .unwrap_or_else(|| Value::String(DEFAULT_PRODUCT.to_string()));
    report.accept("product_interest", product);

    match coerce_quantity(data.get("quantity")) {
        Some(quantity) if quantity >= 1 => report.accept("quantity", Value::from(quantity)),
        Some(_) => report.reject("quantity", "Must be at least 1"),
        None => report.reject("quantity", "Must be a number"),
    }

    report
}

fn text_field(data: &Map<String, Value>, key: &str) -> String {
    match data.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn coerce_quantity(value: Option<&Value>) -> Option<i64> {
    match value {
        None | Some(Value::Null) => Some(1),
        Some(Value::Number(number)) => {
            number.as_i64().or_else(|| number.as_f64().map(|float| float as i64))
        }
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        Some(_) => None,
    }
}

fn display_name(slot: &str) -> String {
    slot.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::{validate_order_fields, VALID_FEEDBACK};

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().expect("fixture must be a json object").clone()
    }

    fn complete_payload() -> Map<String, Value> {
        fields(json!({
            "full_name": "Alice Carter",
            "email": "alice@example.com",
            "phone": "555-123-4567",
            "address": "12345 Main Street",
            "product_interest": "Artisan Oak Table",
            "quantity": 2
        }))
    }

    #[test]
    fn complete_payload_is_accepted_with_fixed_prompt() {
        let report = validate_order_fields(&complete_payload());

        assert!(report.is_valid());
        assert_eq!(report.accepted().len(), 6);
        assert_eq!(report.feedback_message(), VALID_FEEDBACK);
    }

    #[test]
    fn ten_digit_phone_is_accepted_verbatim() {
        let report = validate_order_fields(&fields(json!({"phone": "555-123-4567"})));

        let phone = report
            .accepted()
            .iter()
            .find(|(slot, _)| *slot == "phone")
            .map(|(_, value)| value.clone());
        assert_eq!(phone, Some(Value::String("555-123-4567".to_string())));
    }

    #[test]
    fn short_phone_is_rejected_with_digit_count() {
        let report = validate_order_fields(&fields(json!({"phone": "12345"})));

        let reason = report
            .rejected()
            .iter()
            .find(|(slot, _)| *slot == "phone")
            .map(|(_, reason)| reason.clone())
            .expect("phone should be rejected");
        assert_eq!(reason, "Must be at least 10 digits (found 5)");
    }

    #[test]
    fn email_rules_accept_minimal_and_reject_plain_text() {
        let accepted = validate_order_fields(&fields(json!({"email": "a@b.co"})));
        assert!(!accepted.rejected_slots().contains(&"email"));

        let rejected = validate_order_fields(&fields(json!({"email": "not-an-email"})));
        assert!(rejected.rejected_slots().contains(&"email"));
    }

    #[test]
    fn single_character_name_is_rejected() {
        let report = validate_order_fields(&fields(json!({"full_name": "A"})));
        assert!(report.rejected_slots().contains(&"full_name"));
    }

    #[test]
    fn missing_product_defaults_to_catalog_item() {
        let report = validate_order_fields(&Map::new());

        let product = report
            .accepted()
            .iter()
            .find(|(slot, _)| *slot == "product_interest")
            .map(|(_, value)| value.clone());
        assert_eq!(product, Some(Value::String("The Cloud Sofa".to_string())));
    }

    #[test]
    fn quantity_coerces_numeric_strings_and_rejects_words() {
        let coerced = validate_order_fields(&fields(json!({"quantity": "3"})));
        assert!(!coerced.rejected_slots().contains(&"quantity"));

        let zero = validate_order_fields(&fields(json!({"quantity": 0})));
        let zero_reason = zero
            .rejected()
            .iter()
            .find(|(slot, _)| *slot == "quantity")
            .map(|(_, reason)| reason.as_str());
        assert_eq!(zero_reason, Some("Must be at least 1"));

        let word = validate_order_fields(&fields(json!({"quantity": "several"})));
        let word_reason = word
            .rejected()
            .iter()
            .find(|(slot, _)| *slot == "quantity")
            .map(|(_, reason)| reason.as_str());
        assert_eq!(word_reason, Some("Must be a number"));
    }

    #[test]
    fn revalidating_accepted_fields_is_stable() {
        let first = validate_order_fields(&complete_payload());
        let second = validate_order_fields(&first.accepted_updates());

        assert!(second.is_valid());
        assert_eq!(first.accepted(), second.accepted());
    }

    #[test]
    fn feedback_lists_rejections_with_display_names() {
        let report = validate_order_fields(&fields(json!({
            "full_name": "A",
            "email": "bad",
            "phone": "1234567890",
            "address": "12345 Main",
            "quantity": 1
        })));

        let message = report.feedback_message();
        assert!(message.starts_with("The following details need correction:"));
        assert!(message.contains("❌ **Full Name**: Must be at least 2 characters"));
        assert!(message.contains("❌ **Email**: Invalid email format"));
        assert!(!message.contains("Phone"));
        assert!(message.ends_with("Please correct these fields in the form below."));
    }
}
