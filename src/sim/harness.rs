//! CLI entry point for the stepped-coordinator harness: runs a node's emulation
//! burst in-process, decodes the captured UART stream and buckets the events
//! into coordinator time steps.

use clap::Parser;
use sensor_node_rs::decode::UartLineBuffer;
use sensor_node_rs::hardware::{DiagnosticConsole, EmissionSink, SharedBuffer};
use sensor_node_rs::node::SensorNode;
use sensor_node_rs::sim::TimeStepper;

/// Simulation Harness CLI
#[derive(Parser, Debug)]
#[command(name = "sim-harness", about = "Steps a coordinator over an emulated sensor node's event burst.")]
pub struct Cli {
    /// Total simulated time in microseconds
    #[arg(long, default_value_t = 10_000_000)]
    duration_us: u64,

    /// Coordinator step size in microseconds
    #[arg(long, default_value_t = 1_000_000)]
    quantum_us: u64,

    /// Also report steps that received no events
    #[arg(long)]
    all_steps: bool,

    /// Print the raw UART capture before the step reports
    #[arg(long)]
    raw: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let uart = SharedBuffer::new();
    let sink = EmissionSink::resolve(Some(Box::new(uart.clone())), DiagnosticConsole::stderr());
    let mut node = SensorNode::new(sink);
    let emitted = node.emit_burst().await;

    let capture = uart.text();
    if cli.raw {
        print!("{}", capture);
    }

    let mut decoder = UartLineBuffer::new();
    let events = decoder.feed(&capture, 0);

    let mut stepper = TimeStepper::new(cli.quantum_us)?;
    let schedule = stepper.bucket(&events, cli.duration_us)?;
    for step in &schedule.steps {
        if cli.all_steps || !step.events.is_empty() {
            println!("{}", serde_json::to_string(step)?);
        }
    }

    tracing::info!(
        "Node emitted {} events; {} delivered over {} steps, {} past the end of the run",
        emitted,
        schedule.delivered(),
        schedule.steps.len(),
        schedule.unassigned.len()
    );
    if decoder.malformed_lines() > 0 {
        tracing::warn!("{} malformed UART lines skipped", decoder.malformed_lines());
    }
    Ok(())
}
