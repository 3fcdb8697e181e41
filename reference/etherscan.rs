use super::*;

/// Default block explorer host.
pub const DEFAULT_EXPLORER_HOST: &str = "etherscan.io";

#[derive(Deserialize)]
struct ExplorerResponse {
    #[serde(default)]
    result: Value,
}

/// Reference heights from an Etherscan-compatible explorer API.
#[derive(Clone)]
pub struct EtherscanSource {
    agent: ureq::Agent,
    api_key: String,
    host: String,
    networks: NetworkTable,
}

impl EtherscanSource {
    pub fn new(api_key: String, host: String, networks: NetworkTable, timeout: Duration) -> Self {
        EtherscanSource {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            api_key,
            host,
            networks,
        }
    }

    /// Get the explorer host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the network table.
    pub fn networks(&self) -> &NetworkTable {
        &self.networks
    }

    /// Returns the `eth_blockNumber` proxy URL for `network_id`.
    pub fn endpoint(&self, network_id: u64) -> String {
        format!(
            "https://{}.{}/api?module=proxy&action=eth_blockNumber&apikey={}",
            self.networks.prefix(network_id),
            self.host,
            self.api_key
        )
    }

    /// Fetch the block number from `url`, returning zero on any failure.
    pub(crate) fn load_block_number(&self, url: &str) -> HeightValue {
        match self.fetch_block_number(url) {
            Ok(height) => height,
            Err(e) => {
                warn!("failed to load the reference block number: {}", self.redact(&format!("{e:#}")));
                HeightValue::ZERO
            }
        }
    }

    fn fetch_block_number(&self, url: &str) -> Result<HeightValue> {
        let response: ExplorerResponse = self
            .agent
            .get(url)
            .call()
            .context("explorer request failed")?
            .into_json()
            .context("explorer returned malformed json")?;

        let result = response
            .result
            .as_str()
            .ok_or_else(|| anyhow!("explorer response has no result string"))?;
        parse_quantity(result)
    }

    // Transport errors quote the request URL, which carries the API key.
    fn redact(&self, message: &str) -> String {
        if self.api_key.is_empty() {
            message.to_string()
        } else {
            message.replace(&self.api_key, "<redacted>")
        }
    }
}

impl ReferenceSource for EtherscanSource {
    fn reference_height(&self, network_id: u64) -> HeightValue {
        debug!(network_id, host = %self.host, "GET reference block number");
        let height = self.load_block_number(&self.endpoint(network_id));
        debug!(network_id, %height, "reference block number");
        height
    }
}
