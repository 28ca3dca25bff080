//! # servicedesk-entity
//!
//! Domain entity models for Service Desk. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod attachment;
pub mod comment;
pub mod event;
pub mod ticket;
