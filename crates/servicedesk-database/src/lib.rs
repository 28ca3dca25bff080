//! # servicedesk-database
//!
//! SQLite store management for Service Desk: connection pooling, the
//! startup schema reconciler, and concrete repository implementations for
//! all entities.

pub mod connection;
pub mod reconciler;
pub mod repositories;

pub use connection::DatabasePool;
