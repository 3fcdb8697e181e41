//! Command line and environment configuration.

use crate::reference::{NetworkPrefix, NetworkTable, DEFAULT_EXPLORER_HOST};

use anyhow::{anyhow, Result};
use clap::{builder::NonEmptyStringValueParser, Parser, ValueEnum};
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use std::time::Duration;

/// Readiness and liveness probe for an Ethereum node.
#[derive(Parser)]
#[command(author, version, about = "Readiness and liveness probe for Ethereum nodes")]
pub struct Args {
    /// Ethereum node JSON-RPC URL.
    #[arg(long, env = "NODE_HOST", value_parser = NonEmptyStringValueParser::new())]
    pub node_host: String,

    /// Etherscan API key used to fetch the reference block number.
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true, value_parser = NonEmptyStringValueParser::new())]
    pub etherscan_api_key: String,

    /// Port the probe server listens on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Block explorer host, prefixed with the network subdomain.
    #[arg(long, env = "EXPLORER_HOST", default_value = DEFAULT_EXPLORER_HOST)]
    pub explorer_host: String,

    /// Extra `ID=PREFIX` explorer subdomains, overriding the built-in ones.
    #[arg(long = "network-prefix", env = "NETWORK_PREFIXES", value_delimiter = ',')]
    pub network_prefixes: Vec<NetworkPrefix>,

    /// Timeout in seconds for every request to the node and the explorer.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 20)]
    pub request_timeout_secs: u64,

    /// Log level, overridden by `RUST_LOG`.
    #[arg(long, env = "LOG_LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,

    /// Log format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Output format of the logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging configuration.
#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
}

impl LogConfig {
    /// Install the global tracing subscriber.
    pub fn init_tracing_subscriber(&self) -> Result<()> {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(self.level).into())
            .from_env_lossy();

        match self.format {
            LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .try_init(),
        }
        .map_err(|e| anyhow!("failed to initialize tracing subscriber: {e}"))
    }
}

/// Probe configuration, fixed for the lifetime of the process.
#[derive(Clone)]
pub struct ProbeConfig {
    pub node_url: String,
    pub api_key: String,
    pub port: u16,
    pub explorer_host: String,
    pub networks: NetworkTable,
    pub request_timeout: Duration,
    pub log: LogConfig,
}

impl From<Args> for ProbeConfig {
    fn from(args: Args) -> Self {
        ProbeConfig {
            node_url: args.node_host,
            api_key: args.etherscan_api_key,
            port: args.port,
            explorer_host: args.explorer_host,
            networks: NetworkTable::default().with_overrides(args.network_prefixes),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            log: LogConfig {
                level: args.log_level,
                format: args.log_format,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[test]
    fn test_defaults() {
        let args = assert_ok!(Args::try_parse_from([
            "node-probe",
            "--node-host",
            "http://localhost:8545",
            "--etherscan-api-key",
            "KEY123",
        ]));
        let config = ProbeConfig::from(args);

        assert_eq!(config.node_url, "http://localhost:8545");
        assert_eq!(config.api_key, "KEY123");
        assert_eq!(config.port, 8080);
        assert_eq!(config.explorer_host, "etherscan.io");
        assert_eq!(config.networks, NetworkTable::default());
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert_eq!(config.log.level, Level::INFO);
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let args = assert_ok!(Args::try_parse_from([
            "node-probe",
            "--node-host",
            "https://node.internal:8545",
            "--etherscan-api-key",
            "KEY123",
            "--port",
            "9090",
            "--network-prefix",
            "11155111=api-sepolia,17000=api-holesky",
            "--log-format",
            "json",
            "--log-level",
            "debug",
        ]));
        let config = ProbeConfig::from(args);

        assert_eq!(config.port, 9090);
        assert_eq!(config.networks.prefix(11155111), "api-sepolia");
        assert_eq!(config.networks.prefix(17000), "api-holesky");
        assert_eq!(config.networks.prefix(1), "api");
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, Level::DEBUG);
    }

    #[test]
    fn test_required_values() {
        // Missing API key.
        assert!(Args::try_parse_from([
            "node-probe",
            "--node-host",
            "http://localhost:8545",
        ])
        .is_err());

        // Empty node URL.
        assert!(Args::try_parse_from([
            "node-probe",
            "--node-host",
            "",
            "--etherscan-api-key",
            "KEY123",
        ])
        .is_err());

        // Malformed network prefix.
        assert!(Args::try_parse_from([
            "node-probe",
            "--node-host",
            "http://localhost:8545",
            "--etherscan-api-key",
            "KEY123",
            "--network-prefix",
            "sepolia",
        ])
        .is_err());
    }
}
