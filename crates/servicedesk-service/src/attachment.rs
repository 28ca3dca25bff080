//! Attachment service — upload, download, and listing.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use tracing::{info, warn};

use servicedesk_core::config::StorageConfig;
use servicedesk_core::error::{AppError, ErrorKind};
use servicedesk_core::result::AppResult;
use servicedesk_core::traits::storage::{AttachmentStore, ByteStream};
use servicedesk_database::repositories::attachment::AttachmentRepository;
use servicedesk_database::repositories::event::EventRepository;
use servicedesk_database::repositories::ticket::TicketRepository;
use servicedesk_entity::attachment::{Attachment, CreateAttachment};
use servicedesk_entity::event::{CreateEvent, EventAction};
use servicedesk_storage::filename::{mime_from_path, sanitize_filename, unique_stored_name};

use crate::ticket::normalize_actor;

/// Handles attachment uploads and downloads.
#[derive(Debug, Clone)]
pub struct AttachmentService {
    /// Store handle for transactional units of work.
    pool: SqlitePool,
    /// Attachment repository.
    attachments: Arc<AttachmentRepository>,
    /// Ticket repository, for existence checks.
    tickets: Arc<TicketRepository>,
    /// Byte storage for attachment contents.
    store: Arc<dyn AttachmentStore>,
    /// Storage configuration (upload size limit).
    config: StorageConfig,
}

impl AttachmentService {
    /// Creates a new attachment service.
    pub fn new(
        pool: SqlitePool,
        attachments: Arc<AttachmentRepository>,
        tickets: Arc<TicketRepository>,
        store: Arc<dyn AttachmentStore>,
        config: StorageConfig,
    ) -> Self {
        Self {
            pool,
            attachments,
            tickets,
            store,
            config,
        }
    }

    /// Upload an attachment from a byte stream.
    ///
    /// The original filename is sanitized and never used directly as a
    /// stored location: bytes land under
    /// `<ticket_id>/<random-token>__<sanitized-name>`, so two uploads with
    /// the same name never collide and stored names cannot be guessed from
    /// the filename alone. `declared_size` is advisory; a mismatch with the
    /// actual byte count is logged, not fatal.
    ///
    /// The attachment row, the parent's `updated_at` bump, and the
    /// `attach` audit event are written in one transaction after the bytes
    /// are on disk.
    pub async fn add_attachment(
        &self,
        ticket_id: i64,
        actor: &str,
        original_filename: &str,
        stream: ByteStream,
        declared_size: Option<u64>,
    ) -> AppResult<Attachment> {
        let ticket = self
            .tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ticket {ticket_id} not found")))?;

        if let Some(declared) = declared_size {
            if declared > self.config.max_upload_size_bytes {
                return Err(AppError::validation(format!(
                    "File exceeds maximum upload size of {} bytes",
                    self.config.max_upload_size_bytes
                )));
            }
        }

        let safe_name = sanitize_filename(original_filename);
        let stored_path = format!("{}/{}", ticket.id, unique_stored_name(&safe_name));

        let size = self.store.write_stream(&stored_path, stream).await?;

        if size > self.config.max_upload_size_bytes {
            self.store.delete(&stored_path).await?;
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        if let Some(declared) = declared_size {
            if declared != size {
                warn!(
                    ticket_id,
                    declared,
                    actual = size,
                    "Declared attachment size does not match stored bytes"
                );
            }
        }

        let actor = normalize_actor(actor);
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin unit of work", e)
        })?;

        let attachment = AttachmentRepository::create_in(
            &mut tx,
            &CreateAttachment {
                ticket_id: ticket.id,
                filename: safe_name.clone(),
                stored_path,
                size_bytes: size as i64,
                mime_type: mime_from_path(&safe_name),
                created_at: now,
            },
        )
        .await?;

        TicketRepository::touch_in(&mut tx, ticket.id, now).await?;

        EventRepository::append_in(
            &mut tx,
            &CreateEvent {
                ticket_id: ticket.id,
                actor,
                action: EventAction::AttachmentAdded,
                from_value: None,
                to_value: Some(safe_name),
            },
        )
        .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit unit of work", e)
        })?;

        info!(
            ticket_id = ticket.id,
            attachment_id = attachment.id,
            name = %attachment.filename,
            size = attachment.size_bytes,
            "Attachment added"
        );

        Ok(attachment)
    }

    /// Upload an attachment from an in-memory byte buffer.
    pub async fn add_attachment_bytes(
        &self,
        ticket_id: i64,
        actor: &str,
        original_filename: &str,
        data: Bytes,
    ) -> AppResult<Attachment> {
        let declared = data.len() as u64;
        let stream: ByteStream = Box::pin(futures::stream::once(async move {
            Ok::<_, std::io::Error>(data)
        }));
        self.add_attachment(ticket_id, actor, original_filename, stream, Some(declared))
            .await
    }

    /// Open an attachment for download: the record plus a stream of its
    /// stored bytes.
    pub async fn open_attachment(&self, attachment_id: i64) -> AppResult<(Attachment, ByteStream)> {
        let attachment = self
            .attachments
            .find_by_id(attachment_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Attachment {attachment_id} not found")))?;

        let stream = self.store.read(&attachment.stored_path).await?;
        Ok((attachment, stream))
    }

    /// List a ticket's attachments, newest first.
    pub async fn list_attachments(&self, ticket_id: i64) -> AppResult<Vec<Attachment>> {
        self.attachments.list_for_ticket(ticket_id).await
    }
}
