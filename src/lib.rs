// sensor-node-rs: deterministic synthetic sensor node for stepped simulation

pub mod config;
pub mod decode;
pub mod event;
pub mod generator;
pub mod hardware;
pub mod node;
pub mod sample;
pub mod sim;

pub use config::NodeConfig;
pub use event::{encode_event, EncodeError, EncodedEvent, Event};
pub use generator::ValueGenerator;
pub use hardware::{DiagnosticConsole, EmissionSink, OutputChannel, SharedBuffer};
pub use node::{ExecutionMode, SensorNode};
