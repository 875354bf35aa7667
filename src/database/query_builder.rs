//! SQL construction for the ticket queries.
//!
//! Everything here is pure: statements use MySQL `?` placeholders and every
//! caller-supplied value travels in `params`, never in the query text.

use crate::database::models::StatusClass;

pub const TICKETS_TABLE: &str = "glpi_tickets";
pub const TICKET_USERS_TABLE: &str = "glpi_tickets_users";

/// `glpi_tickets_users.type` value for the requester link.
pub const REQUESTER_LINK_TYPE: i64 = 2;

pub const TICKET_COLUMNS: &[&str] = &[
    "id",
    "name",
    "content",
    "date",
    "status",
    "priority",
    "users_id_recipient",
    "users_id_lastupdater",
    "date_mod",
    "date_creation",
];

pub const SUMMARY_COLUMNS: &[&str] = &["id", "name", "status", "date_creation", "date_mod"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<i64>,
}

/// `n` comma-separated placeholders, e.g. `?,?,?`.
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// Tickets received by `user_id` and created during `year`, newest first.
pub fn tickets_by_user_year(user_id: i64, year: i64, status: Option<StatusClass>) -> SqlResult {
    let mut query = format!(
        "SELECT {} FROM {} WHERE users_id_recipient = ? AND YEAR(date_creation) = ?",
        TICKET_COLUMNS.join(", "),
        TICKETS_TABLE
    );
    if let Some(class) = status {
        query.push_str(" AND ");
        query.push_str(&class.predicate());
    }
    query.push_str(" ORDER BY date_creation DESC");

    SqlResult { query, params: vec![user_id, year] }
}

/// Ticket ids linked to `user_id` as requester.
pub fn linked_ticket_ids(user_id: i64) -> SqlResult {
    SqlResult {
        query: format!(
            "SELECT tickets_id FROM {} WHERE users_id = ? AND type = {}",
            TICKET_USERS_TABLE, REQUESTER_LINK_TYPE
        ),
        params: vec![user_id],
    }
}

/// Full ticket rows for `ids`. Returns `None` when `ids` is empty since
/// `IN ()` is not valid MySQL.
pub fn tickets_by_ids(ids: &[i64], status: Option<StatusClass>) -> Option<SqlResult> {
    if ids.is_empty() {
        return None;
    }

    let mut query = format!("SELECT * FROM {} WHERE id IN ({})", TICKETS_TABLE, placeholders(ids.len()));
    if let Some(class) = status {
        query.push_str(" AND ");
        query.push_str(&class.predicate());
    }
    query.push_str(" ORDER BY date_creation DESC");

    Some(SqlResult { query, params: ids.to_vec() })
}

pub fn ticket_summary(ticket_id: i64) -> SqlResult {
    SqlResult {
        query: format!("SELECT {} FROM {} WHERE id = ?", SUMMARY_COLUMNS.join(", "), TICKETS_TABLE),
        params: vec![ticket_id],
    }
}

pub fn ticket_summaries_by_ids(ids: &[i64]) -> Option<SqlResult> {
    if ids.is_empty() {
        return None;
    }

    Some(SqlResult {
        query: format!(
            "SELECT {} FROM {} WHERE id IN ({}) ORDER BY date_creation DESC",
            SUMMARY_COLUMNS.join(", "),
            TICKETS_TABLE,
            placeholders(ids.len())
        ),
        params: ids.to_vec(),
    })
}
