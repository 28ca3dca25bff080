//! # servicedesk-storage
//!
//! Local filesystem attachment storage for Service Desk: filename
//! sanitization, collision-free stored-name generation, and streaming
//! reads/writes rooted in a per-ticket directory layout.

pub mod filename;
pub mod local;

pub use filename::{mime_from_path, sanitize_filename, unique_stored_name};
pub use local::LocalAttachmentStore;
