use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use metrobot_core::catalog::ProductCatalog;
use metrobot_core::domain::chat::{ChatTurn, TurnMeta, TurnResult};
use metrobot_core::extract::{self, ACTION_SHOW_FORM};
use metrobot_core::session::SessionStore;
use metrobot_core::validation::{validate_order_fields, VALID_FEEDBACK};

use crate::llm::{LlmClient, LlmError};
use crate::prompts;

pub const SUBMIT_REPLY: &str = "Order confirmed! Processing now...";
pub const DEGRADED_REPLY: &str = "System Error. Please try again.";

/// Classified turn failure. Callers decide how to degrade; the fixed-text
/// fallback lives in [`OrderAgent::degraded_turn`].
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("llm provider failure: {0}")]
    Provider(#[from] LlmError),
}

/// Per-turn conversation orchestrator. Holds no turn state of its own; every
/// decision is recomputed from the session draft.
pub struct OrderAgent {
    llm: Arc<dyn LlmClient>,
    sessions: Arc<SessionStore>,
    catalog: ProductCatalog,
    temperature: f32,
    max_tokens: u32,
}

impl OrderAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        sessions: Arc<SessionStore>,
        catalog: ProductCatalog,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self { llm, sessions, catalog, temperature, max_tokens }
    }

    /// Runs one turn. A fenced JSON payload in the user text is intercepted
    /// and validated without consulting the LLM; anything else becomes an AI
    /// turn over the prior history.
    pub async fn process_message(
        &self,
        session_id: &str,
        user_text: &str,
        history: &[ChatTurn],
    ) -> Result<TurnResult, AgentError> {
        if user_text.contains("```json") {
            if let Some(fields) = extract::json_block(user_text) {
                return Ok(self.handle_form_payload(session_id, fields));
            }
        }

        self.handle_ai_turn(session_id, history).await
    }

    /// The fixed degraded reply for a failed turn: no form, no submission.
    pub fn degraded_turn() -> TurnResult {
        TurnResult { response_text: DEGRADED_REPLY.to_string(), ..TurnResult::default() }
    }

    fn handle_form_payload(&self, session_id: &str, fields: Map<String, Value>) -> TurnResult {
        let report = validate_order_fields(&fields);

        // Valid slots persist immediately so partial progress survives;
        // rejected slots are overwritten to unset instead of keeping stale
        // values.
        let accepted = report.accepted_updates();
        if !accepted.is_empty() {
            self.sessions.merge(session_id, &accepted);
        }
        let rejected = report.rejected_slots();
        if !rejected.is_empty() {
            self.sessions.clear_slots(session_id, &rejected);
        }

        if !report.is_valid() {
            return TurnResult {
                response_text: report.feedback_message(),
                updates: fields,
                show_form: true,
                ..TurnResult::default()
            };
        }

        let confirmed = fields.get("confirmed").map(truthy).unwrap_or(false);
        if !confirmed {
            return TurnResult {
                response_text: VALID_FEEDBACK.to_string(),
                updates: fields,
                show_form: true,
                meta: Some(TurnMeta::confirm()),
                ..TurnResult::default()
            };
        }

        // The only path that submits.
        TurnResult {
            response_text: SUBMIT_REPLY.to_string(),
            updates: fields,
            should_submit: true,
            final_data: Some(self.sessions.state_json(session_id)),
            ..TurnResult::default()
        }
    }

    async fn handle_ai_turn(
        &self,
        session_id: &str,
        history: &[ChatTurn],
    ) -> Result<TurnResult, AgentError> {
        let state = self.sessions.state_json(session_id);
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatTurn::system(prompts::system_prompt(&state)));
        messages.extend_from_slice(history);

        let raw_reply = self.llm.complete(&messages, self.temperature, self.max_tokens).await?;

        // Slot values the model emits merge without a validation gate; the
        // confirm round-trip re-validates every slot before submission.
        let mut updates = Map::new();
        if raw_reply.contains("```json") {
            if let Some(fields) = extract::json_block(&raw_reply) {
                self.sessions.merge(session_id, &fields);
                updates = fields;
            }
        }

        let mut response_text = extract::strip_code_blocks(&raw_reply);
        if let Some(product) = self.catalog.detect_selection(&response_text) {
            let mut product_update = Map::new();
            product_update
                .insert("product_interest".to_string(), Value::String(product.to_string()));
            self.sessions.merge(session_id, &product_update);

            if !response_text.contains(ACTION_SHOW_FORM) {
                response_text.push(' ');
                response_text.push_str(ACTION_SHOW_FORM);
            }
        }

        let actions = extract::action_flags(&response_text);
        let final_data =
            actions.submit_order.then(|| self.sessions.state_json(session_id));

        Ok(TurnResult {
            response_text: extract::clean_display_text(&response_text),
            updates,
            show_form: actions.show_form,
            should_submit: actions.submit_order,
            final_data,
            meta: None,
        })
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|number| number != 0.0).unwrap_or(false),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
