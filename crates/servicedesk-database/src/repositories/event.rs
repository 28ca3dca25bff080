//! Audit event repository implementation.
//!
//! The event log is append-only: this repository exposes no update or
//! delete operation, and none exists anywhere in the schema. A failed
//! append propagates as an error, never silently.

use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;

use servicedesk_core::error::{AppError, ErrorKind};
use servicedesk_core::result::AppResult;
use servicedesk_entity::event::{CreateEvent, Event};

/// Repository for the ticket audit trail.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    /// Create a new event repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one event with a server-assigned timestamp inside an existing
    /// unit of work and return the stored row.
    pub async fn append_in(conn: &mut SqliteConnection, data: &CreateEvent) -> AppResult<Event> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (ticket_id, actor, action, from_value, to_value, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.ticket_id)
        .bind(&data.actor)
        .bind(data.action)
        .bind(&data.from_value)
        .bind(&data.to_value)
        .bind(chrono::Utc::now())
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append event", e))
    }

    /// Append one event as its own unit of work.
    pub async fn append(&self, data: &CreateEvent) -> AppResult<Event> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::append_in(&mut conn, data).await
    }

    /// List a ticket's events newest-first, for history display.
    pub async fn list_for_ticket(&self, ticket_id: i64) -> AppResult<Vec<Event>> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE ticket_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list events", e))
    }

    /// List a ticket's events oldest-first, for history replay.
    pub async fn list_chronological(&self, ticket_id: i64) -> AppResult<Vec<Event>> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE ticket_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list events", e))
    }
}
