//! Audit event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::action::EventAction;

/// An immutable audit record of a single ticket transition.
///
/// Events for a ticket form an append-only, time-ordered log; an event is
/// never updated or deleted once written. Corrections are represented by a
/// further event, never a rewrite.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    /// Unique event identifier; also the tiebreaker for same-timestamp
    /// ordering.
    pub id: i64,
    /// The ticket this event belongs to.
    pub ticket_id: i64,
    /// Who performed the action.
    pub actor: String,
    /// What happened.
    pub action: EventAction,
    /// Value before the transition, if any.
    pub from_value: Option<String>,
    /// Value after the transition, if any.
    pub to_value: Option<String>,
    /// When the transition happened (server-assigned).
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    /// The ticket this event belongs to.
    pub ticket_id: i64,
    /// Who performed the action.
    pub actor: String,
    /// What happened.
    pub action: EventAction,
    /// Value before the transition, if any.
    pub from_value: Option<String>,
    /// Value after the transition, if any.
    pub to_value: Option<String>,
}
