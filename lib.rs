#![forbid(unsafe_code)]

//! Readiness and liveness probe for Ethereum-compatible nodes.
//!
//! The probe compares the height and sync state reported by a node against the
//! height published by a block explorer, and answers `GET /read` and `GET /live`
//! with `200` or `503` so that an orchestrator only routes traffic to nodes that
//! are connected and not meaningfully behind the canonical chain.

use anyhow::{Context, Result};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tracing::{info, warn};

pub mod cli;
pub use cli::{Args, LogConfig, LogFormat, ProbeConfig};

pub mod health;
pub use health::{CheckKind, Failure, HealthEvaluator, Verdict};

pub mod helpers;

pub mod node;
pub use node::{
    ConnectionManager, Connector, NodeClient, RetryPolicy, RpcClient, RpcConnector, Session,
    SyncStatus,
};

pub mod reference;
pub use reference::{EtherscanSource, NetworkPrefix, NetworkTable, ReferenceSource};

pub mod server;
pub use server::Probe;

/// Block height reported by a node or by the reference source.
///
/// Heights are JSON-RPC quantities, so they are carried as 256-bit unsigned integers.
pub type HeightValue = alloy_primitives::U256;

/// Runs the probe server until `shutdown` resolves.
pub async fn run(
    config: ProbeConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    // Prepare the node connection.
    let connection = ConnectionManager::new(
        RpcConnector::new(config.request_timeout),
        config.node_url.clone(),
        RetryPolicy::default(),
    );

    // Prepare the reference height source.
    let reference = EtherscanSource::new(
        config.api_key.clone(),
        config.explorer_host.clone(),
        config.networks.clone(),
        config.request_timeout,
    );

    let evaluator = Arc::new(HealthEvaluator::new(connection, reference));

    // Dial the node once up front, later checks reconnect on demand.
    let evaluator_ = evaluator.clone();
    let connected = tokio::task::spawn_blocking(move || evaluator_.connection().connect())
        .await
        .context("initial node connection task failed")?;
    if !connected {
        warn!(node = %config.node_url, "node is not reachable at startup");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind probe server to {addr}"))?;
    info!(address = %addr, node = %config.node_url, "starting node probe");

    server::serve(listener, evaluator, shutdown).await
}
