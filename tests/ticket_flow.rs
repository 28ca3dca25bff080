//! End-to-end tests for the ticket lifecycle: creation, field updates with
//! change detection, comments, attachments, and audit history replay
//! against a real on-disk store.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use servicedesk_core::config::StorageConfig;
use servicedesk_core::error::ErrorKind;
use servicedesk_core::traits::storage::{AttachmentStore, ByteStream};
use servicedesk_database::reconciler;
use servicedesk_database::repositories::{
    AttachmentRepository, CommentRepository, EventRepository, TicketRepository,
};
use servicedesk_entity::event::EventAction;
use servicedesk_entity::ticket::{TicketPriority, TicketStatus, UpdateTicket};
use servicedesk_service::{
    AttachmentService, CommentService, CreateTicketParams, TicketService, replay,
};
use servicedesk_storage::LocalAttachmentStore;

struct TestApp {
    _dir: tempfile::TempDir,
    tickets: TicketService,
    comments: CommentService,
    attachments: AttachmentService,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();

        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("desk.db"))
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        reconciler::reconcile(&pool).await.unwrap();

        let ticket_repo = Arc::new(TicketRepository::new(pool.clone()));
        let comment_repo = Arc::new(CommentRepository::new(pool.clone()));
        let attachment_repo = Arc::new(AttachmentRepository::new(pool.clone()));
        let event_repo = Arc::new(EventRepository::new(pool.clone()));

        let store: Arc<dyn AttachmentStore> = Arc::new(
            LocalAttachmentStore::new(dir.path().join("files").to_str().unwrap())
                .await
                .unwrap(),
        );
        let storage_config = StorageConfig {
            data_root: dir.path().to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };

        let tickets = TicketService::new(
            pool.clone(),
            Arc::clone(&ticket_repo),
            Arc::clone(&comment_repo),
            Arc::clone(&attachment_repo),
            Arc::clone(&event_repo),
        );
        let comments = CommentService::new(
            pool.clone(),
            Arc::clone(&comment_repo),
            Arc::clone(&ticket_repo),
        );
        let attachments = AttachmentService::new(
            pool.clone(),
            Arc::clone(&attachment_repo),
            Arc::clone(&ticket_repo),
            store,
            storage_config,
        );

        Self {
            _dir: dir,
            tickets,
            comments,
            attachments,
        }
    }

    async fn create_default_ticket(&self) -> i64 {
        self.tickets
            .create_ticket(CreateTicketParams {
                title: "Printer broken".into(),
                content: Some("HP on 3F".into()),
                requester: "alice".into(),
                priority: None,
            })
            .await
            .unwrap()
            .id
    }
}

async fn collect(mut stream: ByteStream) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

#[tokio::test]
async fn test_create_ticket_records_created_event() {
    let app = TestApp::new().await;

    let ticket = app
        .tickets
        .create_ticket(CreateTicketParams {
            title: "Printer broken".into(),
            content: Some("HP on 3F".into()),
            requester: "alice".into(),
            priority: Some(TicketPriority::High),
        })
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.priority, TicketPriority::High);
    assert!(ticket.assignee.is_none());

    let detail = app.tickets.ticket_detail(ticket.id).await.unwrap();
    assert_eq!(detail.events.len(), 1);
    assert_eq!(detail.events[0].action, EventAction::Created);
    assert_eq!(detail.events[0].actor, "alice");
}

#[tokio::test]
async fn test_create_ticket_requires_title_and_requester() {
    let app = TestApp::new().await;

    let err = app
        .tickets
        .create_ticket(CreateTicketParams {
            title: "  ".into(),
            content: None,
            requester: "alice".into(),
            priority: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .tickets
        .create_ticket(CreateTicketParams {
            title: "Printer broken".into(),
            content: None,
            requester: "".into(),
            priority: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_update_unknown_ticket_is_not_found() {
    let app = TestApp::new().await;

    let err = app
        .tickets
        .update_ticket(
            999,
            "bob",
            UpdateTicket {
                status: Some(TicketStatus::Done),
                ..UpdateTicket::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_same_value_update_produces_no_events() {
    let app = TestApp::new().await;
    let id = app.create_default_ticket().await;

    let before = app.tickets.ticket_detail(id).await.unwrap();

    app.tickets
        .update_ticket(
            id,
            "bob",
            UpdateTicket {
                status: Some(TicketStatus::Open),
                assignee: None,
                priority: Some(TicketPriority::Med),
            },
        )
        .await
        .unwrap();

    let after = app.tickets.ticket_detail(id).await.unwrap();
    assert_eq!(before.events.len(), after.events.len());
    assert_eq!(before.ticket.updated_at, after.ticket.updated_at);
}

#[tokio::test]
async fn test_status_change_produces_exactly_one_event() {
    let app = TestApp::new().await;
    let id = app.create_default_ticket().await;

    app.tickets
        .update_ticket(
            id,
            "bob",
            UpdateTicket {
                status: Some(TicketStatus::InProgress),
                ..UpdateTicket::default()
            },
        )
        .await
        .unwrap();

    let detail = app.tickets.ticket_detail(id).await.unwrap();
    let status_events: Vec<_> = detail
        .events
        .iter()
        .filter(|e| e.action == EventAction::StatusChange)
        .collect();

    assert_eq!(status_events.len(), 1);
    assert_eq!(status_events[0].from_value.as_deref(), Some("open"));
    assert_eq!(status_events[0].to_value.as_deref(), Some("prog"));
    assert_eq!(status_events[0].actor, "bob");
}

#[tokio::test]
async fn test_empty_assignee_equals_unset() {
    let app = TestApp::new().await;
    let id = app.create_default_ticket().await;

    // Assigning from unset to "" is not a change.
    app.tickets
        .update_ticket(
            id,
            "bob",
            UpdateTicket {
                assignee: Some("".into()),
                ..UpdateTicket::default()
            },
        )
        .await
        .unwrap();

    let detail = app.tickets.ticket_detail(id).await.unwrap();
    assert_eq!(detail.events.len(), 1); // only the creation event

    // Unset to a named assignee is.
    app.tickets
        .update_ticket(
            id,
            "bob",
            UpdateTicket {
                assignee: Some("alice".into()),
                ..UpdateTicket::default()
            },
        )
        .await
        .unwrap();

    let detail = app.tickets.ticket_detail(id).await.unwrap();
    let assignee_events: Vec<_> = detail
        .events
        .iter()
        .filter(|e| e.action == EventAction::AssigneeChange)
        .collect();
    assert_eq!(assignee_events.len(), 1);
    assert_eq!(assignee_events[0].from_value, None);
    assert_eq!(assignee_events[0].to_value.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let app = TestApp::new().await;

    let ticket = app
        .tickets
        .create_ticket(CreateTicketParams {
            title: "Printer broken".into(),
            content: Some("HP on 3F".into()),
            requester: "alice".into(),
            priority: Some(TicketPriority::High),
        })
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.priority, TicketPriority::High);

    let updated = app
        .tickets
        .update_ticket(
            ticket.id,
            "bob",
            UpdateTicket {
                status: Some(TicketStatus::InProgress),
                assignee: Some("bob".into()),
                priority: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, TicketStatus::InProgress);
    assert_eq!(updated.assignee.as_deref(), Some("bob"));
    assert!(updated.updated_at.unwrap() > ticket.updated_at.unwrap());

    // Exactly two new events: one status change, one assignee change.
    let detail = app.tickets.ticket_detail(ticket.id).await.unwrap();
    assert_eq!(detail.events.len(), 3);
    let mut new_actions: Vec<_> = detail
        .events
        .iter()
        .filter(|e| e.action != EventAction::Created)
        .map(|e| e.action)
        .collect();
    new_actions.sort_by_key(|a| a.as_str());
    assert_eq!(
        new_actions,
        vec![EventAction::AssigneeChange, EventAction::StatusChange]
    );
}

#[tokio::test]
async fn test_history_replay_reconstructs_current_state() {
    let app = TestApp::new().await;

    let ticket = app
        .tickets
        .create_ticket(CreateTicketParams {
            title: "Printer broken".into(),
            content: None,
            requester: "alice".into(),
            priority: Some(TicketPriority::High),
        })
        .await
        .unwrap();

    app.tickets
        .update_ticket(
            ticket.id,
            "bob",
            UpdateTicket {
                status: Some(TicketStatus::InProgress),
                assignee: Some("alice".into()),
                priority: None,
            },
        )
        .await
        .unwrap();
    app.tickets
        .update_ticket(
            ticket.id,
            "bob",
            UpdateTicket {
                status: None,
                assignee: Some("bob".into()),
                priority: Some(TicketPriority::Crit),
            },
        )
        .await
        .unwrap();

    let current = app.tickets.get_ticket(ticket.id).await.unwrap();
    let history = app.tickets.ticket_history(ticket.id).await.unwrap();
    let state = replay(&history);

    assert_eq!(state.status, current.status);
    assert_eq!(state.assignee, current.assignee);
    assert_eq!(state.priority, current.priority);
}

#[tokio::test]
async fn test_comment_flow() {
    let app = TestApp::new().await;
    let id = app.create_default_ticket().await;

    let err = app.comments.add_comment(id, "bob", "   ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .comments
        .add_comment(999, "bob", "ping")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let before = app.tickets.get_ticket(id).await.unwrap();
    let comment = app
        .comments
        .add_comment(id, "bob", "Replaced the toner")
        .await
        .unwrap();
    assert_eq!(comment.body, "Replaced the toner");

    let detail = app.tickets.ticket_detail(id).await.unwrap();
    assert_eq!(detail.comments.len(), 1);
    assert!(
        detail
            .events
            .iter()
            .any(|e| e.action == EventAction::CommentAdded)
    );
    assert!(detail.ticket.updated_at.unwrap() > before.updated_at.unwrap());
}

#[tokio::test]
async fn test_identical_filenames_never_collide() {
    let app = TestApp::new().await;
    let id = app.create_default_ticket().await;

    let first = app
        .attachments
        .add_attachment_bytes(id, "alice", "report.pdf", Bytes::from("first copy"))
        .await
        .unwrap();
    let second = app
        .attachments
        .add_attachment_bytes(id, "alice", "report.pdf", Bytes::from("second copy"))
        .await
        .unwrap();

    assert_eq!(first.filename, "report.pdf");
    assert_eq!(second.filename, "report.pdf");
    assert_ne!(first.stored_path, second.stored_path);

    // Both remain independently downloadable.
    let (_, stream) = app.attachments.open_attachment(first.id).await.unwrap();
    assert_eq!(collect(stream).await, b"first copy");
    let (_, stream) = app.attachments.open_attachment(second.id).await.unwrap();
    assert_eq!(collect(stream).await, b"second copy");
}

#[tokio::test]
async fn test_attachment_filename_is_sanitized() {
    let app = TestApp::new().await;
    let id = app.create_default_ticket().await;

    let attachment = app
        .attachments
        .add_attachment_bytes(id, "alice", "../../etc/passwd", Bytes::from("nope"))
        .await
        .unwrap();

    assert_eq!(attachment.filename, "passwd");
    assert!(attachment.stored_path.starts_with(&format!("{id}/")));
    assert!(!attachment.stored_path.contains(".."));

    let detail = app.tickets.ticket_detail(id).await.unwrap();
    assert!(
        detail
            .events
            .iter()
            .any(|e| e.action == EventAction::AttachmentAdded
                && e.to_value.as_deref() == Some("passwd"))
    );
}

#[tokio::test]
async fn test_attachment_to_unknown_ticket_is_not_found() {
    let app = TestApp::new().await;

    let err = app
        .attachments
        .add_attachment_bytes(999, "alice", "report.pdf", Bytes::from("x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_events_are_listed_newest_first() {
    let app = TestApp::new().await;
    let id = app.create_default_ticket().await;

    app.tickets
        .update_ticket(
            id,
            "bob",
            UpdateTicket {
                status: Some(TicketStatus::InProgress),
                ..UpdateTicket::default()
            },
        )
        .await
        .unwrap();

    let detail = app.tickets.ticket_detail(id).await.unwrap();
    assert_eq!(detail.events.first().unwrap().action, EventAction::StatusChange);
    assert_eq!(detail.events.last().unwrap().action, EventAction::Created);
}

#[tokio::test]
async fn test_list_tickets_filters_and_orders() {
    let app = TestApp::new().await;

    let first = app
        .tickets
        .create_ticket(CreateTicketParams {
            title: "Printer broken".into(),
            content: Some("HP on 3F".into()),
            requester: "alice".into(),
            priority: Some(TicketPriority::High),
        })
        .await
        .unwrap();
    let second = app
        .tickets
        .create_ticket(CreateTicketParams {
            title: "VPN flaky".into(),
            content: None,
            requester: "carol".into(),
            priority: None,
        })
        .await
        .unwrap();

    // Free-text filter matches title or content.
    let page = servicedesk_core::types::pagination::PageRequest::default();
    let result = app
        .tickets
        .list_tickets(Some("printer"), None, None, &page)
        .await
        .unwrap();
    assert_eq!(result.total_items, 1);
    assert_eq!(result.items[0].id, first.id);

    // Status filter plus recency ordering: touching the first ticket moves
    // it to the front.
    app.comments.add_comment(first.id, "bob", "on it").await.unwrap();
    let result = app
        .tickets
        .list_tickets(None, Some(TicketStatus::Open), None, &page)
        .await
        .unwrap();
    assert_eq!(result.total_items, 2);
    assert_eq!(result.items[0].id, first.id);
    assert_eq!(result.items[1].id, second.id);

    // Priority filter.
    let result = app
        .tickets
        .list_tickets(None, None, Some(TicketPriority::High), &page)
        .await
        .unwrap();
    assert_eq!(result.total_items, 1);
    assert_eq!(result.items[0].id, first.id);
}
