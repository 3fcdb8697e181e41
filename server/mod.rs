use crate::{
    health::{CheckKind, Failure, HealthEvaluator, Verdict},
    node::Connector,
    reference::ReferenceSource,
};

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tracing::{error, info};

use std::{future::Future, sync::Arc};

/// Something that can answer the readiness and liveness probes.
pub trait Probe: Send + Sync + 'static {
    fn readiness(&self) -> Verdict;

    fn liveness(&self) -> Verdict;
}

impl<K: Connector, R: ReferenceSource> Probe for HealthEvaluator<K, R> {
    fn readiness(&self) -> Verdict {
        HealthEvaluator::readiness(self)
    }

    fn liveness(&self) -> Verdict {
        HealthEvaluator::liveness(self)
    }
}

/// `200` when healthy; `503` otherwise, carrying the error text only for transport failures.
impl IntoResponse for Verdict {
    fn into_response(self) -> Response {
        match self {
            Verdict::Healthy => StatusCode::OK.into_response(),
            Verdict::Unhealthy(Failure::Transport(message)) => {
                (StatusCode::SERVICE_UNAVAILABLE, message).into_response()
            }
            Verdict::Unhealthy(_) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}

/// Build the probe routes.
pub fn router(probe: Arc<dyn Probe>) -> Router {
    Router::new()
        .route("/read", get(read))
        .route("/live", get(live))
        .with_state(probe)
}

/// Serve the probe routes on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    probe: Arc<dyn Probe>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    info!(address = %listener.local_addr()?, "probe server listening");
    axum::serve(listener, router(probe))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("probe server stopped");
    Ok(())
}

/// Resolves once Ctrl-C is received.
///
/// If the signal handler cannot be installed the error is logged and the future resolves
/// right away, so the server shuts down instead of running without a way to stop it.
pub async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

async fn wait_for_signal(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("shutdown signal received, exiting"),
        Err(e) => error!("failed to listen for the shutdown signal: {e}"),
    }
}

async fn read(State(probe): State<Arc<dyn Probe>>) -> Verdict {
    run_check(probe, CheckKind::Readiness).await
}

async fn live(State(probe): State<Arc<dyn Probe>>) -> Verdict {
    run_check(probe, CheckKind::Liveness).await
}

// Checks block on network calls, so they run on the blocking pool.
async fn run_check(probe: Arc<dyn Probe>, kind: CheckKind) -> Verdict {
    let task = tokio::task::spawn_blocking(move || match kind {
        CheckKind::Readiness => probe.readiness(),
        CheckKind::Liveness => probe.liveness(),
    });

    match task.await {
        Ok(verdict) => verdict,
        Err(e) => {
            error!(check = kind.name(), "health check task failed: {e}");
            Verdict::transport(format!("{} check failed", kind.name()))
        }
    }
}
