use axum::{extract::State, Json};

use crate::database::models::StatusClass;
use crate::database::{normalize_rows, JsonRow};
use crate::error::ApiResult;

use super::{ApiPath, AppState};

async fn by_user_year(
    state: &AppState,
    user_id: i64,
    year: i64,
    status: Option<StatusClass>,
) -> ApiResult<Json<Vec<JsonRow>>> {
    let rows = state.tickets.tickets_by_user_year(user_id, year, status).await?;
    Ok(Json(normalize_rows(rows)))
}

/// GET /tickets/:user_id/:year
pub async fn all(
    State(state): State<AppState>,
    ApiPath((user_id, year)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<Vec<JsonRow>>> {
    by_user_year(&state, user_id, year, None).await
}

/// GET /tickets/aberto/:user_id/:year - tickets with status < 4
pub async fn open(
    State(state): State<AppState>,
    ApiPath((user_id, year)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<Vec<JsonRow>>> {
    by_user_year(&state, user_id, year, Some(StatusClass::Aberto)).await
}

/// GET /tickets/fechado/:user_id/:year - tickets with status > 3
pub async fn closed(
    State(state): State<AppState>,
    ApiPath((user_id, year)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<Vec<JsonRow>>> {
    by_user_year(&state, user_id, year, Some(StatusClass::Fechado)).await
}
