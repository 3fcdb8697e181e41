use super::*;

/// Blocking JSON-RPC client for an Ethereum-compatible node.
#[derive(Clone)]
pub struct RpcClient {
    agent: ureq::Agent,
    url: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncProgress {
    current_block: String,
    highest_block: String,
}

impl RpcClient {
    /// Create a client for the node at `url`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        // Ensure the node URL is one we can speak JSON-RPC over.
        ensure!(
            url.starts_with("http://") || url.starts_with("https://"),
            "specified node url {url} invalid, only HTTP JSON-RPC is supported (the url must start with http:// or https://; ws://, wss:// and IPC paths are not accepted)"
        );

        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        Ok(RpcClient {
            agent,
            url: url.to_string(),
        })
    }

    /// Get the node URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a JSON-RPC request and return its `result` member.
    pub fn call(&self, method: &str, params: Value) -> Result<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!("POST {method} to {}", self.url);
        let response: RpcResponse = self
            .agent
            .post(&self.url)
            .send_json(request)
            .with_context(|| format!("{method} request failed"))?
            .into_json()
            .with_context(|| format!("{method} returned an invalid response"))?;

        if let Some(error) = response.error {
            bail!("{method} failed: {} (code {})", error.message, error.code);
        }

        Ok(response.result)
    }
}

impl NodeClient for RpcClient {
    fn network_id(&self) -> Result<u64> {
        match self.call("net_version", json!([]))? {
            Value::String(id) => id
                .parse()
                .with_context(|| format!("invalid network id {id:?}")),
            Value::Number(id) => id
                .as_u64()
                .ok_or_else(|| anyhow!("invalid network id {id}")),
            other => bail!("unexpected net_version result {other}"),
        }
    }

    fn sync_progress(&self) -> Result<SyncStatus> {
        match self.call("eth_syncing", json!([]))? {
            Value::Bool(false) => Ok(SyncStatus::NotSyncing),
            progress @ Value::Object(_) => {
                let progress: SyncProgress =
                    serde_json::from_value(progress).context("invalid eth_syncing result")?;
                Ok(SyncStatus::Syncing {
                    current_block: parse_quantity(&progress.current_block)?,
                    highest_block: parse_quantity(&progress.highest_block)?,
                })
            }
            other => bail!("unexpected eth_syncing result {other}"),
        }
    }

    fn latest_block_number(&self) -> Result<HeightValue> {
        let block = self.call("eth_getBlockByNumber", json!(["latest", false]))?;
        if block.is_null() {
            bail!("latest block not found");
        }

        let number = block
            .get("number")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("latest block has no number"))?;
        parse_quantity(number)
    }
}

/// Dials nodes over HTTP JSON-RPC.
#[derive(Clone, Debug)]
pub struct RpcConnector {
    timeout: Duration,
}

impl RpcConnector {
    /// Create a connector whose clients time out each request after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        RpcConnector { timeout }
    }
}

impl Connector for RpcConnector {
    type Client = RpcClient;

    fn dial(&self, url: &str) -> Result<RpcClient> {
        RpcClient::new(url, self.timeout)
    }
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient").field("url", &self.url).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::canned::{closed_url, CannedServer};

    fn rpc_result(result: Value) -> (u16, String) {
        (200, json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string())
    }

    fn client(url: &str) -> RpcClient {
        RpcConnector::new(Duration::from_secs(5)).dial(url).unwrap()
    }

    #[test]
    fn test_dial_rejects_invalid_url() {
        let connector = RpcConnector::new(Duration::from_secs(5));
        assert!(connector.dial("localhost:8545").is_err());
        assert!(connector.dial("/var/run/geth.ipc").is_err());
        assert!(connector.dial("http://localhost:8545").is_ok());
        assert!(connector.dial("https://node.internal").is_ok());
    }

    #[test]
    fn test_dial_explains_websocket_rejection() {
        let connector = RpcConnector::new(Duration::from_secs(5));
        for url in ["ws://localhost:8546", "wss://node.internal"] {
            let error = connector.dial(url).unwrap_err().to_string();
            assert!(error.contains("only HTTP JSON-RPC is supported"), "{error}");
            assert!(error.contains(url));
        }
    }

    #[test]
    fn test_network_id() {
        let server = CannedServer::start(vec![rpc_result(json!("1"))]);
        assert_eq!(client(&server.url).network_id().unwrap(), 1);

        // Ensure the request named the right method.
        let requests = server.finish();
        let request: Value = serde_json::from_str(&requests[0]).unwrap();
        assert_eq!(request["method"], "net_version");
        assert_eq!(request["jsonrpc"], "2.0");
    }

    #[test]
    fn test_sync_progress_not_syncing() {
        let server = CannedServer::start(vec![rpc_result(json!(false))]);
        assert_eq!(client(&server.url).sync_progress().unwrap(), SyncStatus::NotSyncing);
        server.finish();
    }

    #[test]
    fn test_sync_progress_syncing() {
        let server = CannedServer::start(vec![rpc_result(json!({
            "startingBlock": "0x0",
            "currentBlock": "0x1f4",
            "highestBlock": "0x3e8",
        }))]);

        let status = client(&server.url).sync_progress().unwrap();
        assert_eq!(
            status,
            SyncStatus::Syncing {
                current_block: HeightValue::from(500u64),
                highest_block: HeightValue::from(1000u64),
            }
        );
        assert!(status.is_syncing());
        server.finish();
    }

    #[test]
    fn test_latest_block_number() {
        let server = CannedServer::start(vec![rpc_result(json!({
            "number": "0x3e8",
            "hash": "0xabc",
        }))]);

        assert_eq!(
            client(&server.url).latest_block_number().unwrap(),
            HeightValue::from(1000u64)
        );

        let requests = server.finish();
        let request: Value = serde_json::from_str(&requests[0]).unwrap();
        assert_eq!(request["method"], "eth_getBlockByNumber");
        assert_eq!(request["params"], json!(["latest", false]));
    }

    #[test]
    fn test_latest_block_missing() {
        let server = CannedServer::start(vec![rpc_result(Value::Null)]);
        let error = client(&server.url).latest_block_number().unwrap_err();
        assert_eq!(error.to_string(), "latest block not found");
        server.finish();
    }

    #[test]
    fn test_rpc_error_is_reported() {
        let server = CannedServer::start(vec![(
            200,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32000, "message": "header not found" },
            })
            .to_string(),
        )]);

        let error = client(&server.url).sync_progress().unwrap_err();
        assert_eq!(error.to_string(), "eth_syncing failed: header not found (code -32000)");
        server.finish();
    }

    #[test]
    fn test_http_error_is_reported() {
        let server = CannedServer::start(vec![(502, "bad gateway".to_string())]);
        assert!(client(&server.url).network_id().is_err());
        server.finish();
    }

    #[test]
    fn test_unreachable_node() {
        let error = client(&closed_url()).network_id().unwrap_err();
        assert!(error.to_string().contains("net_version request failed"));
    }
}
