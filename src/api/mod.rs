//! REST API over a running session.
//!
//! Provides three GET endpoints:
//! - `/state`: rounded current sample, KPI tiles, self-test results
//! - `/series`: rounded samples with optional time-range filtering
//! - `/flows`: flow edges of the current sample

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::sync::RwLock;
use tracing::info;

use crate::sim::session::Session;

pub use types::{ErrorResponse, SeriesQuery, StateResponse};

/// Session shared between the driver task and the request handlers.
///
/// The driver takes the write lock for a whole step; handlers only read.
pub type SharedSession = Arc<RwLock<Session>>;

/// Wraps a session for sharing with [`router`] and
/// [`crate::sim::driver::spawn_driver`].
pub fn shared(session: Session) -> SharedSession {
    Arc::new(RwLock::new(session))
}

/// Builds the axum router with all API routes.
pub fn router(session: SharedSession) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/series", get(handlers::get_series))
        .route("/flows", get(handlers::get_flows))
        .with_state(session)
}

/// Binds to the given address and serves the API until ctrl-c.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(session: SharedSession, addr: SocketAddr) -> io::Result<()> {
    let app = router(session);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
}
