use clap::Parser;
use node_probe::{server::shutdown_signal, Args, ProbeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ProbeConfig::from(Args::parse());
    config.log.init_tracing_subscriber()?;

    node_probe::run(config, shutdown_signal()).await
}
