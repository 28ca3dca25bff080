//! Ticket entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::priority::TicketPriority;
use super::status::TicketStatus;

/// A unit of work tracked by the system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Unique ticket identifier, monotonically assigned by the store.
    pub id: i64,
    /// Short summary of the request.
    pub title: String,
    /// Free-text body.
    pub content: Option<String>,
    /// Who filed the ticket.
    pub requester: String,
    /// Who is working on it. `None` means unassigned; an empty string is
    /// never stored.
    pub assignee: Option<String>,
    /// Urgency of the request.
    pub priority: TicketPriority,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// When the ticket was filed. `None` only on rows that predate the
    /// column in a legacy store.
    pub created_at: Option<DateTime<Utc>>,
    /// When the ticket last changed, including via child comments and
    /// attachments. `None` only on legacy rows.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Whether nobody is assigned to the ticket.
    pub fn is_unassigned(&self) -> bool {
        self.assignee.as_deref().is_none_or(|a| a.is_empty())
    }
}

/// Data required to create a new ticket record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicket {
    /// Short summary of the request.
    pub title: String,
    /// Free-text body.
    pub content: Option<String>,
    /// Who filed the ticket.
    pub requester: String,
    /// Urgency of the request.
    pub priority: TicketPriority,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Requested changes to a ticket's mutable fields.
///
/// A `None` field means "leave unchanged". For `assignee`, `Some("")` (or
/// whitespace) is normalized to the unassigned state before change
/// detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTicket {
    /// New lifecycle status, if changing.
    pub status: Option<TicketStatus>,
    /// New assignee, if changing. Empty string clears the assignment.
    pub assignee: Option<String>,
    /// New priority, if changing.
    pub priority: Option<TicketPriority>,
}
