//! # Node Configuration
//!
//! Runtime configuration covers only how the node is wired up: its identity,
//! which output channel it binds at startup, and how chatty the log is. The
//! sampling parameters are part of the firmware image and live here as
//! constants.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [node]
//! name = "sensor-1"
//! board = "nRF52840 DK"
//!
//! [uart]
//! port = "/dev/ttyUSB0"
//! baud = 115200
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! - `uart.port` unset leaves the output channel unbound; events then go to
//!   the diagnostic console.
//! - `uart.port = "stdout"` binds the process stdout as the output channel.

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Seed for the sample generator.
pub const RNG_SEED_DEFAULT: u32 = 12345;
/// Spacing between consecutive event timestamps, in microseconds.
pub const SAMPLE_INTERVAL_US: u64 = 1_000_000;
pub const SENSOR_MIN_VALUE: f32 = 20.0;
pub const SENSOR_MAX_VALUE: f32 = 30.0;
/// Number of events emitted in emulation mode before the node idles.
pub const EMULATION_BURST_SIZE: u64 = 10;
/// Size of the encode buffer, terminator included.
pub const EVENT_BUFFER_CAPACITY: usize = 256;
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Main configuration struct for the sensor node.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub node: NodeIdentity,
    #[serde(default)]
    pub uart: UartConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity reported in the startup banner.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeIdentity {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_board")]
    pub board: String,
}

impl Default for NodeIdentity {
    fn default() -> Self {
        Self {
            name: default_name(),
            board: default_board(),
        }
    }
}

/// Output channel binding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UartConfig {
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default = "default_baud")]
    pub baud: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: default_baud(),
        }
    }
}

/// How the configured port maps onto an output channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelBinding {
    Unbound,
    Stdout,
    Serial { path: String, baud: u32 },
}

impl UartConfig {
    pub fn binding(&self) -> ChannelBinding {
        match self.port.as_deref().map(str::trim) {
            None | Some("") => ChannelBinding::Unbound,
            Some("stdout") | Some("-") => ChannelBinding::Stdout,
            Some(path) => ChannelBinding::Serial {
                path: path.to_string(),
                baud: self.baud,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl LoggingConfig {
    /// Parsed log level; unknown names fall back to INFO.
    pub fn max_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

// Default value functions
fn default_name() -> String { "xEdgeSim Sensor Node".to_string() }
fn default_board() -> String { "nRF52840 DK".to_string() }
fn default_baud() -> u32 { 115200 }
fn default_level() -> String { "info".to_string() }

/// Build time stamped by build.rs, rendered for the banner.
pub fn build_timestamp() -> String {
    option_env!("BUILD_TIME")
        .and_then(|secs| secs.parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: impl AsRef<Path>) -> Result<NodeConfig, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path.display(), e);
            Err(ConfigError::Io(e))
        }
    }
}
