//! # servicedesk-service
//!
//! Business logic service layer for Service Desk. Each service orchestrates
//! repositories, attachment storage, and the audit trail to implement the
//! boundary operation contracts.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references; there is no ambient global
//! store handle. Every mutating operation records its audit events in the
//! same unit of work that changes the entity rows.

pub mod attachment;
pub mod comment;
pub mod history;
pub mod ticket;

pub use attachment::AttachmentService;
pub use comment::CommentService;
pub use history::{ReplayedState, replay};
pub use ticket::{CreateTicketParams, TicketDetail, TicketService};
