// src/main.rs - sensor node entry point
use clap::Parser;
use sensor_node_rs::config::{
    self, ChannelBinding, NodeConfig, FIRMWARE_VERSION, SAMPLE_INTERVAL_US, SENSOR_MAX_VALUE,
    SENSOR_MIN_VALUE,
};
use sensor_node_rs::hardware::{
    DiagnosticConsole, EmissionSink, OutputChannel, SerialChannel, StreamChannel,
};
use sensor_node_rs::node::{ExecutionMode, SensorNode};
use std::path::PathBuf;

/// Deterministic synthetic sensor node
#[derive(Parser, Debug)]
#[command(name = "sensor-node", version, about = "Emits a reproducible stream of JSON sensor events.")]
struct Cli {
    /// Path to a TOML config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => config::load_config(path),
        None => Ok(NodeConfig::default()),
    };
    let max_level = loaded
        .as_ref()
        .map(|c| c.logging.max_level())
        .unwrap_or(tracing::Level::INFO);

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();

    let config = loaded.map_err(|e| {
        tracing::error!("Failed to load config: {}", e);
        Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
    })?;

    tracing::info!("=== {} ===", config.node.name);
    tracing::info!("Firmware version: {}", FIRMWARE_VERSION);
    tracing::info!("Build: {}", config::build_timestamp());
    tracing::info!("Board: {}", config.node.board);

    let channel: Option<Box<dyn OutputChannel>> = match config.uart.binding() {
        ChannelBinding::Unbound => None,
        ChannelBinding::Stdout => Some(Box::new(StreamChannel::new("stdout", tokio::io::stdout()))),
        ChannelBinding::Serial { path, baud } => Some(Box::new(SerialChannel::open(&path, baud))),
    };
    let sink = EmissionSink::resolve(channel, DiagnosticConsole::stderr());

    let mut node = SensorNode::new(sink);
    let mode = ExecutionMode::configured();

    tracing::info!("Sample interval: {} us", SAMPLE_INTERVAL_US);
    tracing::info!("Sensor range: {:.1} - {:.1}", SENSOR_MIN_VALUE, SENSOR_MAX_VALUE);
    tracing::info!("Output: {} ({} mode)", node.sink().route_name(), mode.name());
    tracing::info!("Starting sensor loop...");

    node.run(mode).await;
    Ok(())
}
