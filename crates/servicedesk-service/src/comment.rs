//! Comment service.

use std::sync::Arc;

use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use tracing::info;

use servicedesk_core::error::{AppError, ErrorKind};
use servicedesk_core::result::AppResult;
use servicedesk_database::repositories::comment::CommentRepository;
use servicedesk_database::repositories::event::EventRepository;
use servicedesk_database::repositories::ticket::TicketRepository;
use servicedesk_entity::comment::{Comment, CreateComment};
use servicedesk_entity::event::{CreateEvent, EventAction};

use crate::ticket::normalize_actor;

/// Handles posting and listing ticket comments.
#[derive(Debug, Clone)]
pub struct CommentService {
    /// Store handle for transactional units of work.
    pool: SqlitePool,
    /// Comment repository.
    comments: Arc<CommentRepository>,
    /// Ticket repository, for existence checks.
    tickets: Arc<TicketRepository>,
}

impl CommentService {
    /// Creates a new comment service.
    pub fn new(
        pool: SqlitePool,
        comments: Arc<CommentRepository>,
        tickets: Arc<TicketRepository>,
    ) -> Self {
        Self {
            pool,
            comments,
            tickets,
        }
    }

    /// Post a comment on a ticket.
    ///
    /// The comment arrival counts as a ticket mutation: the comment row,
    /// the parent's `updated_at` bump, and the `comment` audit event are
    /// written in one transaction.
    pub async fn add_comment(
        &self,
        ticket_id: i64,
        author: &str,
        body: &str,
    ) -> AppResult<Comment> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::validation("Comment body is required"));
        }

        let ticket = self
            .tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ticket {ticket_id} not found")))?;

        let author = normalize_actor(author);
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin unit of work", e)
        })?;

        let comment = CommentRepository::create_in(
            &mut tx,
            &CreateComment {
                ticket_id: ticket.id,
                author: author.clone(),
                body: body.to_string(),
                created_at: now,
            },
        )
        .await?;

        TicketRepository::touch_in(&mut tx, ticket.id, now).await?;

        EventRepository::append_in(
            &mut tx,
            &CreateEvent {
                ticket_id: ticket.id,
                actor: author,
                action: EventAction::CommentAdded,
                from_value: None,
                to_value: None,
            },
        )
        .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit unit of work", e)
        })?;

        info!(
            ticket_id = ticket.id,
            comment_id = comment.id,
            "Comment added"
        );

        Ok(comment)
    }

    /// List a ticket's comments in chronological order.
    pub async fn list_comments(&self, ticket_id: i64) -> AppResult<Vec<Comment>> {
        self.comments.list_for_ticket(ticket_id).await
    }
}
