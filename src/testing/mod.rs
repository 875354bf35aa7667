use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Datelike, NaiveDateTime};
use serde_json::Value;
use tower::ServiceExt;

use crate::database::models::StatusClass;
use crate::database::query_builder::REQUESTER_LINK_TYPE;
use crate::database::{DatabaseError, RawRow, RawValue, TicketRepository};
use crate::handlers::AppState;

/// A `glpi_tickets` row held in memory.
#[derive(Debug, Clone)]
pub struct StoredTicket {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub date: NaiveDateTime,
    pub status: i64,
    pub priority: i64,
    pub users_id_recipient: i64,
    pub users_id_lastupdater: i64,
    pub date_mod: NaiveDateTime,
    pub date_creation: NaiveDateTime,
}

impl StoredTicket {
    pub fn new(id: i64, recipient: i64, status: i64, created: &str) -> Self {
        let created = at(created);
        Self {
            id,
            name: format!("Ticket {}", id),
            content: format!("Conteúdo do ticket {}", id),
            date: created,
            status,
            priority: 3,
            users_id_recipient: recipient,
            users_id_lastupdater: recipient,
            date_mod: created,
            date_creation: created,
        }
    }

    fn full_row(&self) -> RawRow {
        vec![
            ("id".to_string(), RawValue::UInt(self.id as u64)),
            ("name".to_string(), RawValue::Text(self.name.clone())),
            ("content".to_string(), RawValue::Text(self.content.clone())),
            ("date".to_string(), RawValue::DateTime(self.date)),
            ("status".to_string(), RawValue::Int(self.status)),
            ("priority".to_string(), RawValue::Int(self.priority)),
            ("users_id_recipient".to_string(), RawValue::UInt(self.users_id_recipient as u64)),
            ("users_id_lastupdater".to_string(), RawValue::UInt(self.users_id_lastupdater as u64)),
            ("date_mod".to_string(), RawValue::DateTime(self.date_mod)),
            ("date_creation".to_string(), RawValue::DateTime(self.date_creation)),
        ]
    }

    fn summary_row(&self) -> RawRow {
        vec![
            ("id".to_string(), RawValue::UInt(self.id as u64)),
            ("name".to_string(), RawValue::Text(self.name.clone())),
            ("status".to_string(), RawValue::Int(self.status)),
            ("date_creation".to_string(), RawValue::DateTime(self.date_creation)),
            ("date_mod".to_string(), RawValue::DateTime(self.date_mod)),
        ]
    }

    fn matches(&self, status: Option<StatusClass>) -> bool {
        status.map_or(true, |class| StatusClass::classify(self.status) == class)
    }
}

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// In-memory stand-in for the GLPI tables.
#[derive(Default)]
pub struct MemoryTicketRepository {
    tickets: Vec<StoredTicket>,
    /// `(tickets_id, users_id, type)`
    links: Vec<(i64, i64, i64)>,
    unreachable: bool,
    failing_queries: bool,
    ticket_queries: AtomicUsize,
}

impl MemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticket(mut self, ticket: StoredTicket) -> Self {
        self.tickets.push(ticket);
        self
    }

    pub fn with_link(mut self, ticket_id: i64, user_id: i64, link_type: i64) -> Self {
        self.links.push((ticket_id, user_id, link_type));
        self
    }

    /// Every call fails as if no connection could be acquired.
    pub fn unreachable() -> Self {
        Self { unreachable: true, ..Self::default() }
    }

    /// Every statement fails after connecting.
    pub fn failing_queries() -> Self {
        Self { failing_queries: true, ..Self::default() }
    }

    /// Number of statements issued against the tickets table.
    pub fn ticket_queries(&self) -> usize {
        self.ticket_queries.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.unreachable {
            return Err(DatabaseError::Connection(sqlx::Error::PoolTimedOut));
        }
        if self.failing_queries {
            return Err(DatabaseError::Query(sqlx::Error::Protocol(
                "Table 'glpi.glpi_tickets' doesn't exist".to_string(),
            )));
        }
        Ok(())
    }

    fn tickets_table(&self) -> Result<Vec<&StoredTicket>, DatabaseError> {
        self.check()?;
        self.ticket_queries.fetch_add(1, Ordering::SeqCst);
        let mut tickets: Vec<&StoredTicket> = self.tickets.iter().collect();
        tickets.sort_by(|a, b| b.date_creation.cmp(&a.date_creation));
        Ok(tickets)
    }
}

#[async_trait]
impl TicketRepository for MemoryTicketRepository {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check()
    }

    async fn tickets_by_user_year(
        &self,
        user_id: i64,
        year: i64,
        status: Option<StatusClass>,
    ) -> Result<Vec<RawRow>, DatabaseError> {
        Ok(self
            .tickets_table()?
            .into_iter()
            .filter(|t| t.users_id_recipient == user_id && i64::from(t.date_creation.year()) == year && t.matches(status))
            .map(StoredTicket::full_row)
            .collect())
    }

    async fn linked_ticket_ids(&self, user_id: i64) -> Result<Vec<i64>, DatabaseError> {
        self.check()?;
        Ok(self
            .links
            .iter()
            .filter(|(_, user, link_type)| *user == user_id && *link_type == REQUESTER_LINK_TYPE)
            .map(|(ticket, _, _)| *ticket)
            .collect())
    }

    async fn tickets_by_ids(&self, ids: &[i64], status: Option<StatusClass>) -> Result<Vec<RawRow>, DatabaseError> {
        Ok(self
            .tickets_table()?
            .into_iter()
            .filter(|t| ids.contains(&t.id) && t.matches(status))
            .map(StoredTicket::full_row)
            .collect())
    }

    async fn ticket_summary(&self, ticket_id: i64) -> Result<Option<RawRow>, DatabaseError> {
        Ok(self
            .tickets_table()?
            .into_iter()
            .find(|t| t.id == ticket_id)
            .map(StoredTicket::summary_row))
    }

    async fn ticket_summaries_by_ids(&self, ids: &[i64]) -> Result<Vec<RawRow>, DatabaseError> {
        Ok(self
            .tickets_table()?
            .into_iter()
            .filter(|t| ids.contains(&t.id))
            .map(StoredTicket::summary_row)
            .collect())
    }
}

/// Router over `repo`, returned with a handle for inspecting it afterwards.
pub fn test_app(repo: MemoryTicketRepository) -> (Router, Arc<MemoryTicketRepository>) {
    let repo = Arc::new(repo);
    let app = crate::app::app(AppState::new(repo.clone()));
    (app, repo)
}

/// Issue a GET and decode the JSON body.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send_json(app, Method::GET, uri).await
}

/// Issue a bodyless request and decode the JSON body.
pub async fn send_json(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Ids of a JSON array of ticket objects, in order.
pub fn ids_of(rows: &Value) -> Vec<i64> {
    rows.as_array()
        .map(|rows| rows.iter().filter_map(|r| r["id"].as_i64()).collect())
        .unwrap_or_default()
}
