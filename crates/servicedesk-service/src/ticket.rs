//! Ticket service — creation, field updates with change detection, listing,
//! and the detail view.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use tracing::info;

use servicedesk_core::error::{AppError, ErrorKind};
use servicedesk_core::result::AppResult;
use servicedesk_core::types::pagination::{PageRequest, PageResponse};
use servicedesk_database::repositories::attachment::AttachmentRepository;
use servicedesk_database::repositories::comment::CommentRepository;
use servicedesk_database::repositories::event::EventRepository;
use servicedesk_database::repositories::ticket::TicketRepository;
use servicedesk_entity::attachment::Attachment;
use servicedesk_entity::comment::Comment;
use servicedesk_entity::event::{CreateEvent, Event, EventAction};
use servicedesk_entity::ticket::{
    CreateTicket, Ticket, TicketPriority, TicketStatus, UpdateTicket,
};

/// Parameters for creating a new ticket.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateTicketParams {
    /// Short summary of the request (required, non-empty).
    pub title: String,
    /// Free-text body.
    pub content: Option<String>,
    /// Who is filing the ticket (required, non-empty).
    pub requester: String,
    /// Urgency; defaults to [`TicketPriority::Med`] when omitted.
    pub priority: Option<TicketPriority>,
}

/// A ticket together with everything shown on its detail view.
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    /// The ticket row.
    pub ticket: Ticket,
    /// Comments in chronological order.
    pub comments: Vec<Comment>,
    /// Attachments, newest first.
    pub attachments: Vec<Attachment>,
    /// Audit events, newest first.
    pub events: Vec<Event>,
}

/// Handles ticket creation, updates, listing, and detail queries.
///
/// Every mutation writes the entity rows and their audit events in one
/// transaction, so the event log and current state never diverge under
/// normal operation.
#[derive(Debug, Clone)]
pub struct TicketService {
    /// Store handle for transactional units of work.
    pool: SqlitePool,
    /// Ticket repository.
    tickets: Arc<TicketRepository>,
    /// Comment repository (detail view).
    comments: Arc<CommentRepository>,
    /// Attachment repository (detail view).
    attachments: Arc<AttachmentRepository>,
    /// Audit event repository.
    events: Arc<EventRepository>,
}

impl TicketService {
    /// Creates a new ticket service.
    pub fn new(
        pool: SqlitePool,
        tickets: Arc<TicketRepository>,
        comments: Arc<CommentRepository>,
        attachments: Arc<AttachmentRepository>,
        events: Arc<EventRepository>,
    ) -> Self {
        Self {
            pool,
            tickets,
            comments,
            attachments,
            events,
        }
    }

    /// File a new ticket.
    ///
    /// The creation event's `to_value` carries the initial priority code so
    /// that replaying the audit trail reconstructs non-default creation
    /// priorities.
    pub async fn create_ticket(&self, params: CreateTicketParams) -> AppResult<Ticket> {
        let title = params.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("Title is required"));
        }
        let requester = params.requester.trim();
        if requester.is_empty() {
            return Err(AppError::validation("Requester is required"));
        }

        let content = params
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);
        let priority = params.priority.unwrap_or_default();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin unit of work", e)
        })?;

        let ticket = TicketRepository::create_in(
            &mut tx,
            &CreateTicket {
                title: title.to_string(),
                content,
                requester: requester.to_string(),
                priority,
                status: TicketStatus::Open,
                created_at: now,
                updated_at: now,
            },
        )
        .await?;

        EventRepository::append_in(
            &mut tx,
            &CreateEvent {
                ticket_id: ticket.id,
                actor: ticket.requester.clone(),
                action: EventAction::Created,
                from_value: None,
                to_value: Some(priority.as_str().to_string()),
            },
        )
        .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit unit of work", e)
        })?;

        info!(
            ticket_id = ticket.id,
            requester = %ticket.requester,
            priority = %ticket.priority,
            "Ticket created"
        );

        Ok(ticket)
    }

    /// Apply requested changes to a ticket's status, assignee, and
    /// priority.
    ///
    /// Each field that actually changes produces exactly one audit event,
    /// written in the same transaction as the row update; a no-op update
    /// produces none and leaves `updated_at` untouched. Assignee `""` and
    /// unset are the same "unassigned" state for change detection.
    pub async fn update_ticket(
        &self,
        id: i64,
        actor: &str,
        update: UpdateTicket,
    ) -> AppResult<Ticket> {
        let ticket = self.require_ticket(id).await?;
        let actor = normalize_actor(actor);

        let mut changes = Vec::new();

        let new_status = update.status.unwrap_or(ticket.status);
        if new_status != ticket.status {
            changes.push(CreateEvent {
                ticket_id: id,
                actor: actor.clone(),
                action: EventAction::StatusChange,
                from_value: Some(ticket.status.as_str().to_string()),
                to_value: Some(new_status.as_str().to_string()),
            });
        }

        let current_assignee = normalize_assignee(ticket.assignee.as_deref());
        let new_assignee = match update.assignee.as_deref() {
            Some(a) => normalize_assignee(Some(a)),
            None => current_assignee.clone(),
        };
        if new_assignee != current_assignee {
            changes.push(CreateEvent {
                ticket_id: id,
                actor: actor.clone(),
                action: EventAction::AssigneeChange,
                from_value: current_assignee.clone(),
                to_value: new_assignee.clone(),
            });
        }

        let new_priority = update.priority.unwrap_or(ticket.priority);
        if new_priority != ticket.priority {
            changes.push(CreateEvent {
                ticket_id: id,
                actor: actor.clone(),
                action: EventAction::PriorityChange,
                from_value: Some(ticket.priority.as_str().to_string()),
                to_value: Some(new_priority.as_str().to_string()),
            });
        }

        if changes.is_empty() {
            return Ok(ticket);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin unit of work", e)
        })?;

        for change in &changes {
            EventRepository::append_in(&mut tx, change).await?;
        }

        let updated = TicketRepository::update_state_in(
            &mut tx,
            id,
            new_status,
            new_assignee.as_deref(),
            new_priority,
            Utc::now(),
        )
        .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit unit of work", e)
        })?;

        info!(
            ticket_id = id,
            actor = %actor,
            changes = changes.len(),
            "Ticket updated"
        );

        Ok(updated)
    }

    /// Fetch a single ticket, failing with `NotFound` when the id is
    /// unknown.
    pub async fn get_ticket(&self, id: i64) -> AppResult<Ticket> {
        self.require_ticket(id).await
    }

    /// Fetch a ticket together with its comments, attachments, and audit
    /// history for the detail view.
    pub async fn ticket_detail(&self, id: i64) -> AppResult<TicketDetail> {
        let ticket = self.require_ticket(id).await?;
        let comments = self.comments.list_for_ticket(id).await?;
        let attachments = self.attachments.list_for_ticket(id).await?;
        let events = self.events.list_for_ticket(id).await?;

        Ok(TicketDetail {
            ticket,
            comments,
            attachments,
            events,
        })
    }

    /// List tickets with optional free-text and field filters, most
    /// recently updated first.
    pub async fn list_tickets(
        &self,
        q: Option<&str>,
        status: Option<TicketStatus>,
        priority: Option<TicketPriority>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Ticket>> {
        let q = q.map(str::trim).filter(|text| !text.is_empty());
        self.tickets.search(q, status, priority, page).await
    }

    /// A ticket's audit events in chronological order, for history replay.
    pub async fn ticket_history(&self, id: i64) -> AppResult<Vec<Event>> {
        self.require_ticket(id).await?;
        self.events.list_chronological(id).await
    }

    async fn require_ticket(&self, id: i64) -> AppResult<Ticket> {
        self.tickets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ticket {id} not found")))
    }
}

/// Empty or whitespace assignee collapses to the unassigned state.
pub(crate) fn normalize_assignee(assignee: Option<&str>) -> Option<String> {
    assignee
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
}

/// Actors default to `"user"` when the boundary supplies nothing useful.
pub(crate) fn normalize_actor(actor: &str) -> String {
    let trimmed = actor.trim();
    if trimmed.is_empty() {
        "user".to_string()
    } else {
        trimmed.to_string()
    }
}
