use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::AppState;
use crate::error::{ApiError, ApiResult};

/// GET / - endpoint directory
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "API GLPI Tickets",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "todos_tickets": "/tickets/{user_id}/{ano}",
            "tickets_abertos": "/tickets/aberto/{user_id}/{ano}",
            "tickets_fechados": "/tickets/fechado/{user_id}/{ano}",
            "tickets_vinculo": "/ticketvinculo/{user_id}",
            "tickets_user": "/ticketuser/{id}?status=aberto|fechado",
            "debug_ticket": "/debug/ticket/{ticket_id}",
            "debug_user_tickets": "/debug/user/{user_id}/tickets",
            "health": "/health"
        }
    }))
}

/// GET /health - database round trip
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.tickets.ping().await.map_err(|e| {
        tracing::warn!("Health check failed: {}", e);
        ApiError::service_unavailable(format!("database unavailable: {}", e))
    })?;

    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}

/// Fallback for paths no route matches
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

/// Fallback for a known path requested with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method Not Allowed")
}
