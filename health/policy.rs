use super::*;

/// Blocks a node may trail the reference by and still be ready.
pub const READINESS_LAG_ALLOWANCE: u64 = 5;

/// Blocks a non-syncing node may trail the reference by and still be alive.
pub const LIVENESS_LAG_ALLOWANCE: u64 = 50;

/// The two kinds of probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckKind {
    /// Strict: gates traffic routing.
    Readiness,
    /// Lenient: gates process restarts.
    Liveness,
}

impl CheckKind {
    pub fn lag_allowance(&self) -> u64 {
        match self {
            CheckKind::Readiness => READINESS_LAG_ALLOWANCE,
            CheckKind::Liveness => LIVENESS_LAG_ALLOWANCE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::Readiness => "readiness",
            CheckKind::Liveness => "liveness",
        }
    }
}

/// Applies the threshold policy of `kind` to the observed node state.
///
/// The floor is `reference - allowance`, saturating at zero. A zero reference
/// therefore never fails a node on height.
pub fn evaluate(
    kind: CheckKind,
    sync: &SyncStatus,
    node: HeightValue,
    reference: HeightValue,
) -> Verdict {
    let allowance = kind.lag_allowance();
    let floor = reference.saturating_sub(HeightValue::from(allowance));

    match (kind, sync) {
        (
            CheckKind::Readiness,
            SyncStatus::Syncing {
                current_block,
                highest_block,
            },
        ) => Verdict::Unhealthy(Failure::Syncing {
            current_block: *current_block,
            highest_block: *highest_block,
        }),
        (CheckKind::Readiness, SyncStatus::NotSyncing) if node < floor => {
            Verdict::Unhealthy(Failure::Behind {
                node,
                reference,
                allowance,
            })
        }
        (CheckKind::Liveness, SyncStatus::NotSyncing) if node < floor => {
            Verdict::Unhealthy(Failure::Stale {
                node,
                reference,
                allowance,
            })
        }
        _ => Verdict::Healthy,
    }
}
