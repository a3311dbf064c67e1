// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use cardano_dashboard_auth::{
    api::router,
    auth::SessionKeys,
    chain::IndexerClient,
    config::{self, DATA_DIR_ENV, DB_FILE_NAME, SEED_PROJECT_ENV},
    state::AppState,
    storage::{AuthDatabase, StoredProject},
};

#[tokio::main]
async fn main() {
    init_tracing();

    // No unsigned fallback: without a secret every session would be forgeable
    let sessions = SessionKeys::from_env().expect("SESSION_SECRET must be set");

    let data_dir = PathBuf::from(config::env_or_default(DATA_DIR_ENV, "./data"));
    let db_path = data_dir.join(DB_FILE_NAME);
    let db = AuthDatabase::open(&db_path).expect("Failed to open the role store");
    tracing::info!(path = %db_path.display(), "Role store opened");

    let indexer = IndexerClient::from_env().expect("Failed to configure the chain indexer client");
    tracing::info!(base_url = %indexer.base_url(), "Chain indexer configured");

    seed_project(&db);

    let state = AppState::new(db, indexer, sessions);
    let app = router(state);

    let host = config::env_or_default("HOST", "0.0.0.0");
    let port: u16 = config::env_or_default("PORT", "8080")
        .parse()
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!("Dashboard auth server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config::env_or_default("LOG_FORMAT", "pretty").as_str() {
        "json" => builder.json().init(),
        _ => builder.init(),
    }
}

/// Seed a project from `SEED_PROJECT=<uuid>:<owner_address>`.
///
/// Projects are normally created by the dashboard CRUD layer writing to
/// the same store; this hook keeps local development self-contained.
fn seed_project(db: &AuthDatabase) {
    let Some(value) = config::env_optional(SEED_PROJECT_ENV) else {
        return;
    };
    match value.split_once(':') {
        Some((id, owner)) if !owner.trim().is_empty() => match Uuid::parse_str(id.trim()) {
            Ok(id) => {
                let project = StoredProject::new(id, owner.trim());
                match db.insert_project(&project) {
                    Ok(()) => tracing::info!(project_id = %id, "Seeded project"),
                    Err(err) => tracing::error!(error = %err, "Failed to seed project"),
                }
            }
            Err(err) => tracing::error!(error = %err, "SEED_PROJECT carries an invalid uuid"),
        },
        _ => tracing::error!("SEED_PROJECT must be <uuid>:<owner_address>"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
