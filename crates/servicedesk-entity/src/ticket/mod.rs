//! Ticket domain entities.

pub mod model;
pub mod priority;
pub mod status;

pub use model::{CreateTicket, Ticket, UpdateTicket};
pub use priority::TicketPriority;
pub use status::TicketStatus;
