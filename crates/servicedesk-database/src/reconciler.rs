//! Schema reconciler — versioned, idempotent startup migrations.
//!
//! On every process start the reconciler brings the store's structure up to
//! what this version of the application expects, additively: tables are
//! created if absent, ticket columns missing from an older store are added
//! with safe defaults, and existing columns and rows are never altered or
//! dropped. Each migration runs in its own transaction and records its
//! version in `schema_migrations`; every structural step re-checks its
//! precondition, so replaying after a partial failure converges on the same
//! structure, and running the reconciler N times is identical to running it
//! once.
//!
//! Reconciliation failure is fatal: callers must not serve requests against
//! a store whose structure is unknown.

use sqlx::sqlite::SqlitePool;
use sqlx::{Row, SqliteConnection};
use tracing::info;

use servicedesk_core::error::{AppError, ErrorKind};
use servicedesk_core::result::AppResult;

/// Latest schema version this build expects.
pub const LATEST_VERSION: i64 = 3;

/// Ticket columns that may be missing from a store created by an older
/// application version, with the definition used to add them. Columns with
/// a sensible literal default carry one; the rest stay nullable and readers
/// tolerate NULL.
const TICKET_COLUMNS: &[(&str, &str)] = &[
    ("content", "TEXT"),
    ("assignee", "TEXT"),
    ("priority", "TEXT DEFAULT 'med'"),
    ("status", "TEXT DEFAULT 'open'"),
    ("created_at", "TEXT"),
    ("updated_at", "TEXT"),
];

/// Bring the store's structure up to [`LATEST_VERSION`].
///
/// Safe on an absent/empty store (full creation), a store from an earlier
/// schema version (additive backfill), and a store already current (no-op).
pub async fn reconcile(pool: &SqlitePool) -> AppResult<()> {
    ensure_version_table(pool).await?;

    let applied = applied_version(pool).await?;
    if applied > LATEST_VERSION {
        return Err(AppError::startup(format!(
            "Store schema version {applied} is newer than this build supports ({LATEST_VERSION})"
        )));
    }
    if applied == LATEST_VERSION {
        info!(version = applied, "Store schema is current");
        return Ok(());
    }

    for version in (applied + 1)..=LATEST_VERSION {
        apply_migration(pool, version).await?;
        info!(version, "Applied schema migration");
    }

    Ok(())
}

/// The highest migration version recorded in the store (0 if none).
pub async fn applied_version(pool: &SqlitePool) -> AppResult<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
        .fetch_one(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Startup, "Failed to read schema version", e)
        })
}

/// Create the version marker table if the store predates it.
async fn ensure_version_table(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| {
        AppError::with_source(ErrorKind::Startup, "Failed to create schema_migrations", e)
    })?;
    Ok(())
}

/// Apply one migration inside a transaction and record its version.
async fn apply_migration(pool: &SqlitePool, version: i64) -> AppResult<()> {
    let mut tx = pool.begin().await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Startup,
            format!("Failed to begin migration {version}"),
            e,
        )
    })?;

    match version {
        1 => create_tickets_table(&mut tx).await?,
        2 => backfill_ticket_columns(&mut tx).await?,
        3 => create_child_tables(&mut tx).await?,
        other => {
            return Err(AppError::startup(format!(
                "No migration defined for schema version {other}"
            )));
        }
    }

    sqlx::query("INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?, ?)")
        .bind(version)
        .bind(chrono::Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Startup,
                format!("Failed to record migration {version}"),
                e,
            )
        })?;

    tx.commit().await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Startup,
            format!("Failed to commit migration {version}"),
            e,
        )
    })
}

/// v1 — create the base tickets table with the full current column set.
async fn create_tickets_table(conn: &mut SqliteConnection) -> AppResult<()> {
    execute_ddl(
        conn,
        "CREATE TABLE IF NOT EXISTS tickets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT,
            requester TEXT NOT NULL,
            assignee TEXT,
            priority TEXT NOT NULL DEFAULT 'med',
            status TEXT NOT NULL DEFAULT 'open',
            created_at TEXT,
            updated_at TEXT
        )",
    )
    .await
}

/// v2 — add any ticket column the current model requires that a legacy
/// store is missing. Never alters or drops existing columns.
async fn backfill_ticket_columns(conn: &mut SqliteConnection) -> AppResult<()> {
    let existing = table_columns(conn, "tickets").await?;

    for (name, definition) in TICKET_COLUMNS {
        if existing.iter().any(|c| c == name) {
            continue;
        }
        execute_ddl(
            conn,
            &format!("ALTER TABLE tickets ADD COLUMN {name} {definition}"),
        )
        .await?;
        info!(column = name, "Backfilled missing ticket column");
    }

    Ok(())
}

/// v3 — create the dependent tables, each referencing tickets by foreign
/// key, plus their ticket_id indexes.
async fn create_child_tables(conn: &mut SqliteConnection) -> AppResult<()> {
    execute_ddl(
        conn,
        "CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ticket_id INTEGER NOT NULL,
            author TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(ticket_id) REFERENCES tickets(id)
        )",
    )
    .await?;

    execute_ddl(
        conn,
        "CREATE TABLE IF NOT EXISTS attachments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ticket_id INTEGER NOT NULL,
            filename TEXT NOT NULL,
            stored_path TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            mime_type TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(ticket_id) REFERENCES tickets(id)
        )",
    )
    .await?;

    execute_ddl(
        conn,
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ticket_id INTEGER NOT NULL,
            actor TEXT NOT NULL,
            action TEXT NOT NULL,
            from_value TEXT,
            to_value TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(ticket_id) REFERENCES tickets(id)
        )",
    )
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_comments_ticket_id ON comments(ticket_id)",
        "CREATE INDEX IF NOT EXISTS idx_attachments_ticket_id ON attachments(ticket_id)",
        "CREATE INDEX IF NOT EXISTS idx_events_ticket_id ON events(ticket_id)",
    ] {
        execute_ddl(conn, index).await?;
    }

    Ok(())
}

/// Run one DDL statement, mapping failure to a fatal startup error.
async fn execute_ddl(conn: &mut SqliteConnection, sql: &str) -> AppResult<()> {
    sqlx::query(sql).execute(conn).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Startup,
            format!("Structural change rejected: {e}"),
            e,
        )
    })?;
    Ok(())
}

/// The actual column names of a table, in declaration order.
async fn table_columns(conn: &mut SqliteConnection, table: &str) -> AppResult<Vec<String>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(conn)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Startup,
                format!("Failed to inspect columns of {table}"),
                e,
            )
        })?;

    rows.iter()
        .map(|row| {
            row.try_get::<String, _>("name").map_err(|e| {
                AppError::with_source(
                    ErrorKind::Startup,
                    format!("Failed to read column name of {table}"),
                    e,
                )
            })
        })
        .collect()
}
