//! Attachment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A file attached to a ticket.
///
/// `filename` is the sanitized user-facing name; `stored_path` is the
/// opaque stored-location reference (ticket subdirectory + unique token +
/// sanitized name) where the bytes physically live. The two are distinct
/// so that identical original filenames never collide on disk.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    /// Unique attachment identifier.
    pub id: i64,
    /// The ticket this attachment belongs to.
    pub ticket_id: i64,
    /// Sanitized original filename, for display and download naming.
    pub filename: String,
    /// Stored-location reference relative to the attachment root.
    pub stored_path: String,
    /// Size in bytes of the stored object.
    pub size_bytes: i64,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// When the attachment was uploaded.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new attachment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttachment {
    /// The ticket this attachment belongs to.
    pub ticket_id: i64,
    /// Sanitized original filename.
    pub filename: String,
    /// Stored-location reference relative to the attachment root.
    pub stored_path: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
