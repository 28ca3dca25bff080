//! Audit event action kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use servicedesk_core::error::AppError;

/// What happened to a ticket.
///
/// Storage codes: `created`, `status`, `assignee`, `priority`, `comment`,
/// `attach`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EventAction {
    /// The ticket was filed. `to_value` carries the initial priority code
    /// so that replay can reconstruct non-default creation priorities.
    Created,
    /// The status field changed.
    #[serde(rename = "status")]
    #[sqlx(rename = "status")]
    StatusChange,
    /// The assignee field changed.
    #[serde(rename = "assignee")]
    #[sqlx(rename = "assignee")]
    AssigneeChange,
    /// The priority field changed.
    #[serde(rename = "priority")]
    #[sqlx(rename = "priority")]
    PriorityChange,
    /// A comment was posted. `to_value` is unused.
    #[serde(rename = "comment")]
    #[sqlx(rename = "comment")]
    CommentAdded,
    /// A file was attached. `to_value` carries the sanitized filename.
    #[serde(rename = "attach")]
    #[sqlx(rename = "attach")]
    AttachmentAdded,
}

impl EventAction {
    /// The storage code for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChange => "status",
            Self::AssigneeChange => "assignee",
            Self::PriorityChange => "priority",
            Self::CommentAdded => "comment",
            Self::AttachmentAdded => "attach",
        }
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "status" => Ok(Self::StatusChange),
            "assignee" => Ok(Self::AssigneeChange),
            "priority" => Ok(Self::PriorityChange),
            "comment" => Ok(Self::CommentAdded),
            "attach" => Ok(Self::AttachmentAdded),
            other => Err(AppError::validation(format!(
                "Unknown event action '{other}'"
            ))),
        }
    }
}
