//! Service Desk — startup entry point.
//!
//! Loads configuration, prepares the data directories, opens the SQLite
//! store, and reconciles its schema. The request-handling boundary is
//! external and calls into the service crate; this binary's job is to
//! guarantee the store is structurally ready, or fail fast before anything
//! serves requests against a store in an unknown state.

use tracing_subscriber::{EnvFilter, fmt};

use servicedesk_core::config::AppConfig;
use servicedesk_core::error::AppError;
use servicedesk_database::DatabasePool;
use servicedesk_database::reconciler;

#[tokio::main]
async fn main() {
    let env = std::env::var("SERVICEDESK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Startup failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Startup sequence: directories, store, schema reconciliation.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Service Desk v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Create data directories ──────────────────────────
    create_data_directories(&config).await?;

    // ── Step 2: Open the store ───────────────────────────────────
    let db = DatabasePool::connect(&config.database).await?;

    // ── Step 3: Reconcile the schema (fatal on failure) ──────────
    tracing::info!("Reconciling store schema...");
    reconciler::reconcile(db.pool()).await?;
    let schema_version = reconciler::applied_version(db.pool()).await?;

    // ── Step 4: Health check ─────────────────────────────────────
    if !db.health_check().await? {
        return Err(AppError::startup("Store health check failed"));
    }

    tracing::info!(schema_version, "Store ready");
    db.close().await;
    Ok(())
}

/// Create required data directories
async fn create_data_directories(config: &AppConfig) -> Result<(), AppError> {
    let mut dirs = vec![config.storage.files_root()];
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            dirs.push(parent.to_string_lossy().into_owned());
        }
    }

    for dir in &dirs {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::startup(format!("Failed to create dir '{dir}': {e}")))?;
    }

    Ok(())
}
