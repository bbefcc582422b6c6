use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Map, Value};

/// The slots a session must fill before an order can be submitted, in
/// canonical order.
pub const REQUIRED_SLOTS: [&str; 6] =
    ["full_name", "email", "phone", "address", "product_interest", "quantity"];

/// Per-session order slots. Unknown keys from extractor output are kept in a
/// side map so nothing a model emitted is silently dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderDraft {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub product_interest: Option<String>,
    pub quantity: Option<i64>,
    pub extra: Map<String, Value>,
}

impl OrderDraft {
    pub fn merge(&mut self, updates: &Map<String, Value>) {
        for (key, value) in updates {
            self.set(key, value);
        }
    }

    pub fn clear_slots(&mut self, slots: &[&str]) {
        for slot in slots {
            self.set(slot, &Value::Null);
        }
    }

    pub fn missing_slots(&self) -> Vec<&'static str> {
        REQUIRED_SLOTS.into_iter().filter(|slot| self.slot_value(slot).is_null()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_slots().is_empty()
    }

    /// JSON view with all six slots always present (null when unset) plus any
    /// extra keys.
    pub fn snapshot(&self) -> Value {
        let mut map = Map::new();
        for slot in REQUIRED_SLOTS {
            map.insert(slot.to_string(), self.slot_value(slot));
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }

    fn set(&mut self, key: &str, value: &Value) {
        match key {
            "full_name" => self.full_name = text_slot(value),
            "email" => self.email = text_slot(value),
            "phone" => self.phone = text_slot(value),
            "address" => self.address = text_slot(value),
            "product_interest" => self.product_interest = text_slot(value),
            "quantity" => self.quantity = integer_slot(value),
            _ => {
                self.extra.insert(key.to_string(), value.clone());
            }
        }
    }

    fn slot_value(&self, slot: &str) -> Value {
        match slot {
            "full_name" => option_value(&self.full_name),
            "email" => option_value(&self.email),
            "phone" => option_value(&self.phone),
            "address" => option_value(&self.address),
            "product_interest" => option_value(&self.product_interest),
            "quantity" => self.quantity.map(Value::from).unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

fn option_value(slot: &Option<String>) -> Value {
    slot.clone().map(Value::String).unwrap_or(Value::Null)
}

fn text_slot(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

// A non-coercible quantity unsets the slot rather than smuggling free text
// into a numeric field.
fn integer_slot(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            number.as_i64().or_else(|| number.as_f64().map(|float| float as i64))
        }
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Shared per-session draft store. All mutation happens under one lock, so a
/// snapshot taken after a merge always observes that merge, and overlapping
/// requests for one session cannot corrupt its draft.
#[derive(Debug, Default)]
pub struct SessionStore {
    drafts: Mutex<HashMap<String, OrderDraft>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, session_id: &str) -> OrderDraft {
        self.with_draft(session_id, |draft| draft.clone())
    }

    pub fn state_json(&self, session_id: &str) -> Value {
        self.with_draft(session_id, |draft| draft.snapshot())
    }

    pub fn merge(&self, session_id: &str, updates: &Map<String, Value>) {
        self.with_draft(session_id, |draft| draft.merge(updates));
    }

    pub fn clear_slots(&self, session_id: &str, slots: &[&str]) {
        self.with_draft(session_id, |draft| draft.clear_slots(slots));
    }

    pub fn missing_slots(&self, session_id: &str) -> Vec<&'static str> {
        self.with_draft(session_id, |draft| draft.missing_slots())
    }

    pub fn is_complete(&self, session_id: &str) -> bool {
        self.with_draft(session_id, |draft| draft.is_complete())
    }

    pub fn reset(&self, session_id: &str) {
        let mut drafts = match self.drafts.lock() {
            Ok(drafts) => drafts,
            Err(poisoned) => poisoned.into_inner(),
        };
        drafts.remove(session_id);
    }

    fn with_draft<T>(&self, session_id: &str, action: impl FnOnce(&mut OrderDraft) -> T) -> T {
        let mut drafts = match self.drafts.lock() {
            Ok(drafts) => drafts,
            Err(poisoned) => poisoned.into_inner(),
        };
        let draft = drafts.entry(session_id.to_string()).or_default();
        action(draft)
    }
}
