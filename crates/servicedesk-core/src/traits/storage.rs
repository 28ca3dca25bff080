//! Attachment storage trait for pluggable file backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// Metadata about a stored attachment object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredObjectMeta {
    /// Stored-location reference within the attachment root.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modified timestamp.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// A byte stream type used for reading and writing attachment contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for attachment byte storage.
///
/// The trait is defined here in `servicedesk-core` and implemented by the
/// local filesystem store in `servicedesk-storage`. Paths are opaque
/// stored-location references relative to the store root; callers never
/// hand user-supplied filenames to this trait without sanitizing them
/// first.
#[async_trait]
pub trait AttachmentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the store kind name (e.g., "local").
    fn store_kind(&self) -> &str;

    /// Check whether the store is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read a stored object and return its byte stream.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Read a stored object into memory as a complete byte vector.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Write bytes to the given stored-location reference.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Write a byte stream to the given stored-location reference and
    /// return the number of bytes written.
    async fn write_stream(&self, path: &str, stream: ByteStream) -> AppResult<u64>;

    /// Check whether an object exists at the given stored-location reference.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Get metadata about a stored object.
    async fn metadata(&self, path: &str) -> AppResult<StoredObjectMeta>;

    /// Delete a stored object. Missing objects are not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;
}
