use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::database::models::StatusClass;
use crate::database::{normalize_rows, JsonRow};
use crate::error::ApiResult;

use super::{ApiPath, ApiQuery, AppState};

#[derive(Debug, Serialize)]
pub struct LinkedTicketIds {
    pub tickets_id: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

impl StatusQuery {
    /// Parsed filter; an empty value counts as absent.
    pub fn filter(&self) -> Result<Option<StatusClass>, crate::database::models::InvalidStatus> {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::parse::<StatusClass>)
            .transpose()
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UserTickets {
    Ids { tickets_id: Vec<i64> },
    Tickets { tickets: Vec<JsonRow> },
}

/// GET /ticketvinculo/:user_id - ids of tickets requested by the user
pub async fn linked_ids(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<LinkedTicketIds>> {
    let tickets_id = state.tickets.linked_ticket_ids(user_id).await?;
    Ok(Json(LinkedTicketIds { tickets_id }))
}

/// GET /ticketuser/:id?status=aberto|fechado
///
/// Without `status` this returns the linked ids, like `/ticketvinculo`. With
/// a status the linked tickets are loaded and filtered by it.
pub async fn user_tickets(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<StatusQuery>,
) -> ApiResult<Json<UserTickets>> {
    let status = query.filter()?;

    let tickets_id = state.tickets.linked_ticket_ids(user_id).await?;
    if tickets_id.is_empty() {
        return Ok(Json(UserTickets::Ids { tickets_id }));
    }

    match status {
        None => Ok(Json(UserTickets::Ids { tickets_id })),
        Some(class) => {
            let rows = state.tickets.tickets_by_ids(&tickets_id, Some(class)).await?;
            Ok(Json(UserTickets::Tickets { tickets: normalize_rows(rows) }))
        }
    }
}
