//! Attachment repository implementation.

use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;

use servicedesk_core::error::{AppError, ErrorKind};
use servicedesk_core::result::AppResult;
use servicedesk_entity::attachment::{Attachment, CreateAttachment};

/// Repository for ticket attachments.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: SqlitePool,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new attachment record inside an existing unit of work and
    /// return the stored row.
    pub async fn create_in(
        conn: &mut SqliteConnection,
        data: &CreateAttachment,
    ) -> AppResult<Attachment> {
        sqlx::query_as::<_, Attachment>(
            "INSERT INTO attachments (ticket_id, filename, stored_path, size_bytes, mime_type, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.ticket_id)
        .bind(&data.filename)
        .bind(&data.stored_path)
        .bind(data.size_bytes)
        .bind(&data.mime_type)
        .bind(data.created_at)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create attachment", e))
    }

    /// Find an attachment by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Attachment>> {
        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find attachment", e)
            })
    }

    /// List a ticket's attachments, newest first.
    pub async fn list_for_ticket(&self, ticket_id: i64) -> AppResult<Vec<Attachment>> {
        sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE ticket_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list attachments", e))
    }
}
