//! Trait seams between crates.

pub mod storage;

pub use storage::{AttachmentStore, ByteStream, StoredObjectMeta};
