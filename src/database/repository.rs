use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlRow};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::StatusClass;
use crate::database::normalize::{decode_column, decode_row, RawRow};
use crate::database::query_builder::{self, SqlResult};

/// Read access to the ticket tables.
///
/// Rows are returned undecorated; callers normalize them before they go on
/// the wire.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Round trip to the database.
    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn tickets_by_user_year(
        &self,
        user_id: i64,
        year: i64,
        status: Option<StatusClass>,
    ) -> Result<Vec<RawRow>, DatabaseError>;

    /// Ids of tickets where `user_id` is linked as requester.
    async fn linked_ticket_ids(&self, user_id: i64) -> Result<Vec<i64>, DatabaseError>;

    async fn tickets_by_ids(&self, ids: &[i64], status: Option<StatusClass>) -> Result<Vec<RawRow>, DatabaseError>;

    async fn ticket_summary(&self, ticket_id: i64) -> Result<Option<RawRow>, DatabaseError>;

    async fn ticket_summaries_by_ids(&self, ids: &[i64]) -> Result<Vec<RawRow>, DatabaseError>;
}

pub struct MySqlTicketRepository {
    pool: MySqlPool,
    log_queries: bool,
    slow_query_threshold: Duration,
}

impl MySqlTicketRepository {
    pub fn new(pool: MySqlPool, config: &DatabaseConfig) -> Self {
        Self {
            pool,
            log_queries: config.enable_query_logging,
            slow_query_threshold: config.slow_query_threshold(),
        }
    }

    /// Run one statement on a freshly acquired connection. The connection
    /// returns to the pool when it is dropped, on success or failure.
    async fn fetch_all(&self, sql: &SqlResult) -> Result<Vec<MySqlRow>, DatabaseError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::Connection)?;

        let mut query = sqlx::query(&sql.query);
        for param in &sql.params {
            query = query.bind(*param);
        }

        let started = Instant::now();
        let rows = query.fetch_all(&mut *conn).await.map_err(DatabaseError::Query)?;
        let elapsed = started.elapsed();

        if self.log_queries {
            debug!(query = %sql.query, params = ?sql.params, rows = rows.len(), ?elapsed, "executed query");
        }
        if elapsed > self.slow_query_threshold {
            warn!(query = %sql.query, ?elapsed, "slow query");
        }

        Ok(rows)
    }

    async fn fetch_raw(&self, sql: &SqlResult) -> Result<Vec<RawRow>, DatabaseError> {
        let rows = self.fetch_all(sql).await?;
        Ok(rows.iter().map(decode_row).collect())
    }
}

#[async_trait]
impl TicketRepository for MySqlTicketRepository {
    async fn ping(&self) -> Result<(), DatabaseError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::Connection)?;
        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::Query)?;
        Ok(())
    }

    async fn tickets_by_user_year(
        &self,
        user_id: i64,
        year: i64,
        status: Option<StatusClass>,
    ) -> Result<Vec<RawRow>, DatabaseError> {
        self.fetch_raw(&query_builder::tickets_by_user_year(user_id, year, status))
            .await
    }

    async fn linked_ticket_ids(&self, user_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let rows = self.fetch_all(&query_builder::linked_ticket_ids(user_id)).await?;
        Ok(rows
            .iter()
            .filter_map(|row| decode_column(row, 0).as_i64())
            .collect())
    }

    async fn tickets_by_ids(&self, ids: &[i64], status: Option<StatusClass>) -> Result<Vec<RawRow>, DatabaseError> {
        match query_builder::tickets_by_ids(ids, status) {
            Some(sql) => self.fetch_raw(&sql).await,
            None => Ok(vec![]),
        }
    }

    async fn ticket_summary(&self, ticket_id: i64) -> Result<Option<RawRow>, DatabaseError> {
        let rows = self.fetch_raw(&query_builder::ticket_summary(ticket_id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn ticket_summaries_by_ids(&self, ids: &[i64]) -> Result<Vec<RawRow>, DatabaseError> {
        match query_builder::ticket_summaries_by_ids(ids) {
            Some(sql) => self.fetch_raw(&sql).await,
            None => Ok(vec![]),
        }
    }
}
