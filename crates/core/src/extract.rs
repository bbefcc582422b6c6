use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Sentinel an assistant reply embeds to open the order form.
pub const ACTION_SHOW_FORM: &str = "ACTION_SHOW_FORM";
/// Sentinel an assistant reply embeds to submit the collected order.
pub const ACTION_SUBMIT_ORDER: &str = "ACTION_SUBMIT_ORDER";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionFlags {
    pub show_form: bool,
    pub submit_order: bool,
}

fn json_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid json block pattern")
    })
}

fn code_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```\w*.*?```").expect("valid code block pattern"))
}

fn blank_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid blank run pattern"))
}

/// Parses the first ```json fenced block into a field map. Malformed JSON and
/// non-object payloads both yield `None`; a missing block is not an error.
pub fn json_block(text: &str) -> Option<Map<String, Value>> {
    let captures = json_block_re().captures(text)?;
    let payload = captures.get(1)?.as_str();
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}

/// Removes every fenced code block, whatever the language tag.
pub fn strip_code_blocks(text: &str) -> String {
    code_block_re().replace_all(text, "").trim().to_string()
}

/// Case-sensitive literal scan for the two control sentinels.
pub fn action_flags(text: &str) -> ActionFlags {
    ActionFlags {
        show_form: text.contains(ACTION_SHOW_FORM),
        submit_order: text.contains(ACTION_SUBMIT_ORDER),
    }
}

/// Text safe to show a user: code blocks gone, sentinels removed, blank-line
/// runs collapsed to at most one empty line.
pub fn clean_display_text(text: &str) -> String {
    let without_blocks = code_block_re().replace_all(text, "");
    let without_sentinels =
        without_blocks.replace(ACTION_SHOW_FORM, "").replace(ACTION_SUBMIT_ORDER, "");
    blank_run_re().replace_all(&without_sentinels, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{action_flags, clean_display_text, json_block, strip_code_blocks};

    #[test]
    fn first_fenced_json_object_is_parsed() {
        let text = "Here you go:\n```json\n{\"full_name\": \"Alice\", \"quantity\": 2}\n```\nDone.";
        let fields = json_block(text).expect("block should parse");

        assert_eq!(fields.get("full_name"), Some(&Value::String("Alice".to_string())));
        assert_eq!(fields.get("quantity"), Some(&json!(2)));
    }

    #[test]
    fn malformed_json_yields_none() {
        assert_eq!(json_block("```json\n{\"full_name\": \n```"), None);
        assert_eq!(json_block("no block at all"), None);
    }

    #[test]
    fn only_the_first_block_is_read() {
        let text = "```json\n{\"a\": 1}\n```\n```json\n{\"b\": 2}\n```";
        let fields = json_block(text).expect("block should parse");
        assert!(fields.contains_key("a"));
        assert!(!fields.contains_key("b"));
    }

    #[test]
    fn code_blocks_of_any_language_are_stripped() {
        let text = "Before\n```python\nprint('hi')\n```\nAfter\n```\nraw\n```";
        let stripped = strip_code_blocks(text);
        assert!(!stripped.contains("print"));
        assert!(!stripped.contains("raw"));
        assert!(stripped.contains("Before"));
        assert!(stripped.contains("After"));
    }

    #[test]
    fn sentinels_are_detected_case_sensitively() {
        let flags = action_flags("Thanks! ACTION_SUBMIT_ORDER");
        assert!(flags.submit_order);
        assert!(!flags.show_form);

        let lowercase = action_flags("thanks! action_submit_order");
        assert!(!lowercase.submit_order);
    }

    #[test]
    fn display_text_drops_sentinels_and_trims() {
        assert_eq!(clean_display_text("Thanks! ACTION_SUBMIT_ORDER"), "Thanks!");
    }

    #[test]
    fn blank_line_runs_collapse_to_one_empty_line() {
        let cleaned = clean_display_text("a\n\n\n\n\nb");
        assert_eq!(cleaned, "a\n\nb");
    }
}
