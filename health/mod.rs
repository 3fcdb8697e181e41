use crate::{
    node::{ConnectionManager, Connector, NodeClient, SyncStatus},
    reference::ReferenceSource,
    HeightValue,
};

use tracing::{debug, warn};

use std::fmt;

mod policy;
pub use policy::{evaluate, CheckKind, LIVENESS_LAG_ALLOWANCE, READINESS_LAG_ALLOWANCE};

mod verdict;
pub use verdict::{Failure, Verdict};

/// Decides whether a node is ready or alive.
///
/// Each check makes sure the node connection is usable, reads the node's sync state
/// and latest height, reads the reference height and applies the threshold policy.
pub struct HealthEvaluator<K: Connector, R: ReferenceSource> {
    connection: ConnectionManager<K>,
    reference: R,
}

impl<K: Connector, R: ReferenceSource> HealthEvaluator<K, R> {
    pub fn new(connection: ConnectionManager<K>, reference: R) -> Self {
        HealthEvaluator {
            connection,
            reference,
        }
    }

    /// Get the node connection.
    pub fn connection(&self) -> &ConnectionManager<K> {
        &self.connection
    }

    /// Get the reference height source.
    pub fn reference(&self) -> &R {
        &self.reference
    }

    /// Strict check: the node is synced and at most 5 blocks behind the reference.
    pub fn readiness(&self) -> Verdict {
        self.check(CheckKind::Readiness)
    }

    /// Lenient check: the node is syncing, or at most 50 blocks behind the reference.
    pub fn liveness(&self) -> Verdict {
        self.check(CheckKind::Liveness)
    }

    /// Run the check of the given kind and log its outcome.
    pub fn check(&self, kind: CheckKind) -> Verdict {
        let verdict = self.run(kind);
        match &verdict {
            Verdict::Healthy => debug!(check = kind.name(), "node is healthy"),
            Verdict::Unhealthy(failure) => {
                warn!(check = kind.name(), policy = failure.is_policy(), "{failure}")
            }
        }
        verdict
    }

    fn run(&self, kind: CheckKind) -> Verdict {
        let Some(session) = self.connection.ensure_connected() else {
            return Verdict::transport(format!("not connected to node at {}", self.connection.url()));
        };

        let sync = match session.client.sync_progress() {
            Ok(sync) => sync,
            Err(e) => return Verdict::transport(e),
        };

        // A syncing node is never ready, so skip the height queries.
        if kind == CheckKind::Readiness && sync.is_syncing() {
            return evaluate(kind, &sync, HeightValue::ZERO, HeightValue::ZERO);
        }

        let height = match session.client.latest_block_number() {
            Ok(height) => height,
            Err(e) => return Verdict::transport(e),
        };

        let reference = self.reference.reference_height(session.network_id);
        debug!(check = kind.name(), %height, %reference, syncing = sync.is_syncing(), "comparing heights");

        evaluate(kind, &sync, height, reference)
    }
}
