use crate::{helpers::parse_quantity, HeightValue};

use anyhow::{anyhow, ensure, Context, Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use std::{str::FromStr, time::Duration};

mod etherscan;
pub use etherscan::{EtherscanSource, DEFAULT_EXPLORER_HOST};

mod networks;
pub use networks::{NetworkPrefix, NetworkTable};

/// Independent source of the canonical chain height.
pub trait ReferenceSource: Send + Sync + 'static {
    /// Fetch the current canonical height of `network_id`.
    ///
    /// Implementations never fail: when the height cannot be obtained they return zero,
    /// which makes every node appear to be ahead of the reference.
    fn reference_height(&self, network_id: u64) -> HeightValue;
}
