mod pages;
mod router;
mod state;

pub use router::build_router;
pub use state::ServerState;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, info, warn};

use crate::app_context::AppContext;

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Serve the application behind the route gate until Ctrl+C.
pub async fn serve(ctx: &AppContext, addr: SocketAddr, audit: bool) -> Result<()> {
    if let Some(store) = ctx.session_store() {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
            loop {
                ticker.tick().await;
                let removed = store.prune_expired();
                if removed > 0 {
                    debug!(removed, "pruned expired sessions");
                }
            }
        });
    }

    if audit {
        let mut events = ctx.gate().subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(line) => info!(target: "campus_gate::audit", "{line}"),
                        Err(err) => warn!("failed to encode gate event: {err}"),
                    },
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "audit log lagging behind gate decisions");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    let router = build_router(ctx);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Campus gate listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited unexpectedly")?;
    info!("Campus gate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
