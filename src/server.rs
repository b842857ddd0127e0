use std::{net::SocketAddr, str::FromStr};

use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::{Res, acquisition::ProgressReader, api};

/// Shared by every handler of the progress server.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub progress: ProgressReader,
    pub cancel: CancellationToken,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/progress", get(api::progress))
        .route("/cancel", get(api::cancel).post(api::cancel))
        .layer(Extension(state))
}

/// Binds `addr` and serves progress until `shutdown` is cancelled.
pub async fn start_progress_server(
    addr: &str,
    state: ServerState,
    shutdown: CancellationToken,
) -> Res<()> {
    let addr = SocketAddr::from_str(addr)?;
    let listener = TcpListener::bind(&addr).await?;
    serve(listener, state, shutdown).await
}

pub async fn serve(
    listener: TcpListener,
    state: ServerState,
    shutdown: CancellationToken,
) -> Res<()> {
    tracing::info!(addr = ?listener.local_addr().ok(), "progress server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}
