use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::database::models::StatusClass;
use crate::database::{normalize_row, JsonRow, RawRow, RawValue};
use crate::error::{ApiError, ApiResult};

use super::{ApiPath, AppState};

#[derive(Debug, Serialize)]
pub struct ClassifiedTickets {
    pub tickets: Vec<JsonRow>,
}

fn status_of(row: &RawRow) -> Option<i64> {
    row.iter()
        .find(|(column, _)| column == "status")
        .and_then(|(_, value)| match value {
            RawValue::Text(s) => s.trim().parse().ok(),
            other => other.as_i64(),
        })
}

/// Normalize a ticket row and add its `classificacao`.
fn classified(row: RawRow) -> ApiResult<JsonRow> {
    let status = status_of(&row)
        .ok_or_else(|| ApiError::internal_server_error("Status do ticket não é um número inteiro"))?;

    let mut ticket = normalize_row(row);
    ticket.insert("classificacao".to_string(), json!(StatusClass::classify(status)));
    Ok(ticket)
}

/// GET /debug/ticket/:ticket_id
///
/// A missing ticket answers 200 with an `error` field rather than a 404.
pub async fn ticket(
    State(state): State<AppState>,
    ApiPath(ticket_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    match state.tickets.ticket_summary(ticket_id).await? {
        Some(row) => Ok(Json(Value::Object(classified(row)?))),
        None => Ok(Json(json!({ "error": format!("Ticket {} não encontrado", ticket_id) }))),
    }
}

/// GET /debug/user/:user_id/tickets
pub async fn user_tickets(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<ClassifiedTickets>> {
    let ids = state.tickets.linked_ticket_ids(user_id).await?;
    if ids.is_empty() {
        return Ok(Json(ClassifiedTickets { tickets: vec![] }));
    }

    let tickets = state
        .tickets
        .ticket_summaries_by_ids(&ids)
        .await?
        .into_iter()
        .map(classified)
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(ClassifiedTickets { tickets }))
}
