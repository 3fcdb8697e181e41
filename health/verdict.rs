use super::*;

/// Why a check failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    /// The node could not be reached or a query against it failed.
    Transport(String),
    /// The node is still syncing, which disqualifies it from serving reads.
    Syncing {
        current_block: HeightValue,
        highest_block: HeightValue,
    },
    /// The node is further behind the reference than the readiness allowance.
    Behind {
        node: HeightValue,
        reference: HeightValue,
        allowance: u64,
    },
    /// The node is not syncing yet is further behind than the liveness allowance.
    Stale {
        node: HeightValue,
        reference: HeightValue,
        allowance: u64,
    },
}

impl Failure {
    /// Returns `true` for failures decided by threshold or sync policy rather than by an error.
    pub fn is_policy(&self) -> bool {
        !matches!(self, Failure::Transport(_))
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Transport(message) => f.write_str(message),
            Failure::Syncing {
                current_block,
                highest_block,
            } => write!(
                f,
                "node is syncing, current block: {current_block} | highest block: {highest_block}"
            ),
            Failure::Behind {
                node,
                reference,
                allowance,
            } => write!(
                f,
                "node is behind by more than {allowance} blocks, block {node} but reference is {reference}"
            ),
            Failure::Stale {
                node,
                reference,
                allowance,
            } => write!(
                f,
                "node is not syncing and behind by more than {allowance} blocks, block {node} but reference is {reference}"
            ),
        }
    }
}

/// Outcome of a single check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Healthy,
    Unhealthy(Failure),
}

impl Verdict {
    /// Build a transport failure from an error.
    pub fn transport(error: impl fmt::Display) -> Self {
        Verdict::Unhealthy(Failure::Transport(format!("{error:#}")))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Verdict::Healthy)
    }

    /// Returns the failure description, if any.
    pub fn reason(&self) -> Option<String> {
        match self {
            Verdict::Healthy => None,
            Verdict::Unhealthy(failure) => Some(failure.to_string()),
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Verdict::Healthy => None,
            Verdict::Unhealthy(failure) => Some(failure),
        }
    }
}
