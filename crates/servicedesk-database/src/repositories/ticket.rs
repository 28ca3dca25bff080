//! Ticket repository implementation.
//!
//! Reads run against the pool; writes take an explicit connection so the
//! service layer can put a row change and its audit events in one
//! transaction.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;

use servicedesk_core::error::{AppError, ErrorKind};
use servicedesk_core::result::AppResult;
use servicedesk_core::types::pagination::{PageRequest, PageResponse};
use servicedesk_entity::ticket::{CreateTicket, Ticket, TicketPriority, TicketStatus};

/// Repository for ticket CRUD and query operations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new ticket inside an existing unit of work and return the
    /// stored row.
    pub async fn create_in(conn: &mut SqliteConnection, data: &CreateTicket) -> AppResult<Ticket> {
        sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (title, content, requester, priority, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.content)
        .bind(&data.requester)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.created_at)
        .bind(data.updated_at)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create ticket", e))
    }

    /// Find a ticket by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ticket", e))
    }

    /// Persist new values for a ticket's mutable fields inside an existing
    /// unit of work.
    ///
    /// Last-writer-wins: whatever row is current is overwritten with the
    /// given state in one statement.
    pub async fn update_state_in(
        conn: &mut SqliteConnection,
        id: i64,
        status: TicketStatus,
        assignee: Option<&str>,
        priority: TicketPriority,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Ticket> {
        sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET status = ?, assignee = ?, priority = ?, updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(status)
        .bind(assignee)
        .bind(priority)
        .bind(updated_at)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update ticket", e))?
        .ok_or_else(|| AppError::not_found(format!("Ticket {id} not found")))
    }

    /// Bump a ticket's last-update timestamp inside an existing unit of
    /// work (used when a child comment or attachment arrives).
    pub async fn touch_in(
        conn: &mut SqliteConnection,
        id: i64,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE tickets SET updated_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch ticket", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Ticket {id} not found")));
        }
        Ok(())
    }

    /// Search tickets with optional free-text and field filters, most
    /// recently updated first.
    pub async fn search(
        &self,
        q: Option<&str>,
        status: Option<TicketStatus>,
        priority: Option<TicketPriority>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Ticket>> {
        let mut conditions = Vec::new();
        if q.is_some() {
            conditions.push("(title LIKE ? OR COALESCE(content, '') LIKE ?)");
        }
        if status.is_some() {
            conditions.push("status = ?");
        }
        if priority.is_some() {
            conditions.push("priority = ?");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM tickets {where_clause}");
        let select_sql = format!(
            "SELECT * FROM tickets {where_clause} ORDER BY updated_at DESC, id DESC LIMIT ? OFFSET ?"
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, Ticket>(&select_sql);

        if let Some(text) = q {
            let pattern = format!("%{text}%");
            count_query = count_query.bind(pattern.clone()).bind(pattern.clone());
            select_query = select_query.bind(pattern.clone()).bind(pattern);
        }
        if let Some(s) = status {
            count_query = count_query.bind(s);
            select_query = select_query.bind(s);
        }
        if let Some(p) = priority {
            count_query = count_query.bind(p);
            select_query = select_query.bind(p);
        }

        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count tickets", e))?;

        let tickets = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search tickets", e))?;

        Ok(PageResponse::new(
            tickets,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
