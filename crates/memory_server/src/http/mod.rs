//! HTTP API over the event store.

mod error;
pub mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::accounts::Argon2Hasher;
use crate::config::ServerConfig;
use crate::db::EventStore;

/// Opens the store, binds the configured address and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the address bound.
#[instrument(skip(config), fields(addr = %config.bind_address()))]
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let store = EventStore::open(config.db_path().clone())?;
    let state = AppState::new(store, Arc::new(Argon2Hasher::default()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(addr = %listener.local_addr()?, "Server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
