//! Comment repository implementation.

use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;

use servicedesk_core::error::{AppError, ErrorKind};
use servicedesk_core::result::AppResult;
use servicedesk_entity::comment::{Comment, CreateComment};

/// Repository for ticket comments.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    pool: SqlitePool,
}

impl CommentRepository {
    /// Create a new comment repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new comment inside an existing unit of work and return the
    /// stored row.
    pub async fn create_in(
        conn: &mut SqliteConnection,
        data: &CreateComment,
    ) -> AppResult<Comment> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (ticket_id, author, body, created_at) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(data.ticket_id)
        .bind(&data.author)
        .bind(&data.body)
        .bind(data.created_at)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create comment", e))
    }

    /// List a ticket's comments in chronological order.
    pub async fn list_for_ticket(&self, ticket_id: i64) -> AppResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE ticket_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list comments", e))
    }
}
