use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use metrobot_agent::OrderAgent;
use metrobot_core::domain::chat::{ChatRole, TurnMeta};
use metrobot_core::domain::order::OrderData;
use metrobot_db::{ConversationLog, OrderStore};

use crate::bootstrap::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub state: Value,
    pub should_submit: bool,
    pub show_form: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<TurnMeta>,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/api/chat", post(chat)).with_state(state)
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Json<ChatReply> {
    let correlation_id = Uuid::new_v4().to_string();
    let session_id = request.session_id.as_str();

    state.conversations.append(session_id, ChatRole::User, &request.message);
    let history = state.conversations.history(session_id);

    let turn = match state.agent.process_message(session_id, &request.message, &history).await {
        Ok(turn) => turn,
        Err(cause) => {
            // Provider trouble degrades to a fixed reply; the cause stays in
            // the logs, never in the response.
            error!(
                event_name = "chat.turn_degraded",
                correlation_id = %correlation_id,
                session_id = %session_id,
                error = %cause,
                "turn degraded after provider failure"
            );
            OrderAgent::degraded_turn()
        }
    };

    state.conversations.append(session_id, ChatRole::Assistant, &turn.response_text);

    let mut reply_text = turn.response_text.clone();
    if turn.should_submit {
        if let Some(order_id) = persist_submission(&state, &turn.final_data, &correlation_id).await
        {
            info!(
                event_name = "chat.order_submitted",
                correlation_id = %correlation_id,
                session_id = %session_id,
                order_id = order_id,
                "order submitted from chat"
            );
            reply_text.push_str(&format!(
                "\n\n[SYSTEM]: Order successfully submitted to system! (Order ID: {order_id})"
            ));
        }
    }

    Json(ChatReply {
        response: reply_text,
        state: state.sessions.state_json(session_id),
        should_submit: turn.should_submit,
        show_form: turn.show_form,
        meta: turn.meta,
    })
}

// A sink failure is logged and the turn still answers without the
// confirmation suffix.
async fn persist_submission(
    state: &AppState,
    final_data: &Option<Value>,
    correlation_id: &str,
) -> Option<i64> {
    let snapshot = final_data.as_ref()?;
    let order: OrderData = match serde_json::from_value(snapshot.clone()) {
        Ok(order) => order,
        Err(cause) => {
            warn!(
                event_name = "chat.submission_incomplete",
                correlation_id = %correlation_id,
                error = %cause,
                "submission snapshot did not decode into an order"
            );
            return None;
        }
    };

    match state.orders.add(order).await {
        Ok(order_id) => Some(order_id.0),
        Err(cause) => {
            error!(
                event_name = "chat.order_persist_failed",
                correlation_id = %correlation_id,
                error = %cause,
                "order persistence failed; reply returned without confirmation"
            );
            None
        }
    }
}
