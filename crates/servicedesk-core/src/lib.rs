//! # servicedesk-core
//!
//! Core crate for Service Desk. Contains configuration schemas, the
//! attachment storage trait, pagination types, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Service Desk crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
