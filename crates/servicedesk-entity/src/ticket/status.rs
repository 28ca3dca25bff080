//! Ticket status enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use servicedesk_core::error::AppError;

/// Lifecycle status of a ticket.
///
/// The storage encoding uses the short codes `open`, `prog`, `hold`, `done`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Newly filed, nobody has picked it up yet.
    #[default]
    Open,
    /// Being worked on.
    #[serde(rename = "prog")]
    #[sqlx(rename = "prog")]
    InProgress,
    /// Waiting on the requester or a third party.
    #[serde(rename = "hold")]
    #[sqlx(rename = "hold")]
    OnHold,
    /// Resolved and closed out.
    Done,
}

impl TicketStatus {
    /// The storage code for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "prog",
            Self::OnHold => "hold",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "prog" => Ok(Self::InProgress),
            "hold" => Ok(Self::OnHold),
            "done" => Ok(Self::Done),
            other => Err(AppError::validation(format!(
                "Unknown ticket status '{other}'"
            ))),
        }
    }
}
