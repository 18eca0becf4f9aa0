//! Education platform server: nested content catalogue (batches, subjects,
//! chapters, lectures), live-class schedule, cookie-based access gate with
//! monetized verification, admin API and daily backups.

mod platform_logic;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;

use lib_platform::store::Store;

use platform_logic::backup::start_backup_scheduler;
use platform_logic::config::load_config;
use platform_logic::logger::setup_logging;
use platform_logic::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config();

    // Guard must live until the process exits so log lines are flushed.
    let _log_guard = setup_logging(&config.log_dir(), config.log_level())?;

    info!("starting server_platform on port {}", config.port());

    let db_url = config
        .db_url()
        .context("DATABASE_URL is not set (flag --db-url, env or config file)")?
        .to_string();

    let store = Store::connect(&db_url)?;
    store.init_schema().await?;

    let state = AppState::new(store, config.clone());
    state.hydrate().await;

    // Keep the scheduler handle alive for the lifetime of the server.
    let _scheduler = start_backup_scheduler(state.clone()).await?;

    let app = platform_logic::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port()));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server_platform stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
