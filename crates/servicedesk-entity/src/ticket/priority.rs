//! Ticket priority enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use servicedesk_core::error::AppError;

/// Urgency of a ticket. Defaults to [`TicketPriority::Med`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    #[default]
    Med,
    High,
    Crit,
}

impl TicketPriority {
    /// The storage code for this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Med => "med",
            Self::High => "high",
            Self::Crit => "crit",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "med" => Ok(Self::Med),
            "high" => Ok(Self::High),
            "crit" => Ok(Self::Crit),
            other => Err(AppError::validation(format!(
                "Unknown ticket priority '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for priority in [
            TicketPriority::Low,
            TicketPriority::Med,
            TicketPriority::High,
            TicketPriority::Crit,
        ] {
            assert_eq!(
                priority.as_str().parse::<TicketPriority>().unwrap(),
                priority
            );
        }
    }

    #[test]
    fn test_default_is_med() {
        assert_eq!(TicketPriority::default(), TicketPriority::Med);
    }
}
