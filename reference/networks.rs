use super::*;

/// Known network IDs and their explorer API subdomains.
const DEFAULT_NETWORKS: [(u64, &str); 5] = [
    (1, "api"),
    (3, "api-ropsten"),
    (4, "api-rinkeby"),
    (42, "api-kovan"),
    (401697, "api-tobalaba"),
];

/// Mapping from network ID to explorer API subdomain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkTable {
    prefixes: IndexMap<u64, String>,
}

impl NetworkTable {
    /// Create an empty table.
    pub fn empty() -> Self {
        NetworkTable {
            prefixes: IndexMap::new(),
        }
    }

    /// Returns the subdomain for `network_id`, or an empty string for unknown networks.
    ///
    /// Unknown networks are not rejected here, the request built from the empty
    /// subdomain fails at the explorer instead.
    pub fn prefix(&self, network_id: u64) -> &str {
        self.prefixes
            .get(&network_id)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Add or replace the subdomain for a network.
    pub fn insert(&mut self, network_id: u64, prefix: impl Into<String>) {
        self.prefixes.insert(network_id, prefix.into());
    }

    /// Returns the table with `overrides` applied on top of it.
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = NetworkPrefix>) -> Self {
        for NetworkPrefix { network_id, prefix } in overrides {
            self.insert(network_id, prefix);
        }
        self
    }

    /// Returns the known networks.
    pub fn networks(&self) -> &IndexMap<u64, String> {
        &self.prefixes
    }
}

impl Default for NetworkTable {
    fn default() -> Self {
        NetworkTable {
            prefixes: DEFAULT_NETWORKS
                .iter()
                .map(|(network_id, prefix)| (*network_id, prefix.to_string()))
                .collect(),
        }
    }
}

/// A single `ID=PREFIX` table entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkPrefix {
    pub network_id: u64,
    pub prefix: String,
}

impl FromStr for NetworkPrefix {
    type Err = Error;

    fn from_str(entry: &str) -> Result<Self> {
        let (network_id, prefix) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("network prefix {entry:?} must be of the form ID=PREFIX"))?;

        let network_id = network_id
            .trim()
            .parse()
            .with_context(|| format!("invalid network id in {entry:?}"))?;
        let prefix = prefix.trim();
        ensure!(
            !prefix.is_empty() && !prefix.contains(['/', '.', '?']),
            "invalid explorer prefix in {entry:?}"
        );

        Ok(NetworkPrefix {
            network_id,
            prefix: prefix.to_string(),
        })
    }
}
