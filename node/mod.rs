use crate::{helpers::parse_quantity, HeightValue};

use anyhow::{anyhow, bail, ensure, Context, Result};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use std::{fmt, time::Duration};

mod connection;
pub use connection::{ConnectionManager, RetryPolicy, Session};

mod rpc;
pub use rpc::{RpcClient, RpcConnector};

/// Sync state reported by a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    NotSyncing,
    Syncing {
        current_block: HeightValue,
        highest_block: HeightValue,
    },
}

impl SyncStatus {
    /// Returns `true` if the node is still catching up with the network.
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncStatus::Syncing { .. })
    }
}

/// Queries a node can answer.
pub trait NodeClient: Clone + Send + Sync + 'static {
    /// Fetch the network identifier of the node.
    fn network_id(&self) -> Result<u64>;

    /// Fetch the sync progress of the node.
    fn sync_progress(&self) -> Result<SyncStatus>;

    /// Fetch the number of the latest block known to the node.
    fn latest_block_number(&self) -> Result<HeightValue>;
}

/// Produces node clients from an endpoint URL.
pub trait Connector: Send + Sync + 'static {
    type Client: NodeClient;

    /// Dial the node at `url`.
    fn dial(&self, url: &str) -> Result<Self::Client>;
}
