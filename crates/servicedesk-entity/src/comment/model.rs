//! Comment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A comment on a ticket. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    /// Unique comment identifier.
    pub id: i64,
    /// The ticket this comment belongs to.
    pub ticket_id: i64,
    /// Who wrote the comment.
    pub author: String,
    /// Comment text.
    pub body: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new comment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    /// The ticket this comment belongs to.
    pub ticket_id: i64,
    /// Who wrote the comment.
    pub author: String,
    /// Comment text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
