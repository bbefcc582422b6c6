use axum::http::StatusCode;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info};

use metrobot_core::domain::order::{Order, OrderData};
use metrobot_core::validation::validate_order_fields;
use metrobot_db::OrderStore;

use crate::bootstrap::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
    pub order_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RejectionBody {
    pub error: String,
    pub rejections: Vec<FieldRejection>,
}

#[derive(Debug, Serialize)]
pub struct FieldRejection {
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/submit_order", post(submit_order))
        .route("/api/orders", get(list_orders))
        .with_state(state)
}

/// Direct submission path. The payload is re-validated with the same engine
/// the chat flow uses; accepted values (trimmed name, defaulted product) are
/// what gets stored.
async fn submit_order(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<SubmitResponse>, (StatusCode, Json<RejectionBody>)> {
    let report = validate_order_fields(&payload);
    if !report.is_valid() {
        let rejections = report
            .rejected()
            .iter()
            .map(|(field, reason)| FieldRejection {
                field: field.to_string(),
                reason: reason.clone(),
            })
            .collect();
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(RejectionBody { error: "order validation failed".to_string(), rejections }),
        ));
    }

    let order: OrderData = serde_json::from_value(Value::Object(report.accepted_updates()))
        .map_err(|cause| {
            error!(
                event_name = "orders.accepted_fields_undecodable",
                error = %cause,
                "accepted field set did not decode into an order"
            );
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(RejectionBody {
                    error: "order validation failed".to_string(),
                    rejections: Vec::new(),
                }),
            )
        })?;

    match state.orders.add(order).await {
        Ok(order_id) => {
            info!(
                event_name = "orders.submitted",
                order_id = order_id.0,
                "order submitted directly"
            );
            Ok(Json(SubmitResponse {
                message: "Order processed successfully".to_string(),
                order_id: order_id.0,
            }))
        }
        Err(cause) => {
            error!(
                event_name = "orders.persist_failed",
                error = %cause,
                "order persistence failed"
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RejectionBody {
                    error: "order could not be stored".to_string(),
                    rejections: Vec::new(),
                }),
            ))
        }
    }
}

/// Debug listing of everything the sink holds.
async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, (StatusCode, Json<ErrorBody>)> {
    match state.orders.list_all().await {
        Ok(orders) => Ok(Json(orders)),
        Err(cause) => {
            error!(event_name = "orders.list_failed", error = %cause, "order listing failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { error: "orders could not be listed".to_string() }),
            ))
        }
    }
}
