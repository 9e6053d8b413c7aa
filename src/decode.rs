//! Coordinator-side decoding of a node's UART stream.
//!
//! Raw UART text arrives in arbitrary chunks and mixes event lines with boot
//! chatter. [`UartLineBuffer`] reassembles complete lines, ignores anything
//! that is not JSON, and turns each JSON object into an [`EventRecord`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event type assumed for JSON lines that carry no `type`.
pub const DEFAULT_EVENT_TYPE: &str = "UART";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no JSON object in line")]
    NoObject,
    #[error("malformed event JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// An event as seen by the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub time_us: u64,
    pub value: Option<f64>,
    /// Length of the source line, whitespace trimmed.
    pub size_bytes: usize,
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    kind: Option<String>,
    value: Option<f64>,
    time: Option<u64>,
}

/// Decodes one line. The JSON object is taken from the first `{` to the last
/// `}`, so prefixes such as log tags are tolerated. A missing `time` falls
/// back to `current_time_us`.
pub fn parse_event_line(line: &str, current_time_us: u64) -> Result<EventRecord, DecodeError> {
    let line = line.trim();
    let object = match (line.find('{'), line.rfind('}')) {
        (Some(start), Some(end)) if start < end => &line[start..=end],
        _ => return Err(DecodeError::NoObject),
    };

    let wire: WireEvent = serde_json::from_str(object)?;
    Ok(EventRecord {
        kind: wire.kind.unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
        time_us: wire.time.unwrap_or(current_time_us),
        value: wire.value,
        size_bytes: line.len(),
    })
}

/// Line reassembly over chunked UART output.
#[derive(Debug, Default)]
pub struct UartLineBuffer {
    pending: String,
    malformed: u64,
}

impl UartLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and decodes every line it completes. The trailing
    /// partial line, if any, is held for the next call.
    pub fn feed(&mut self, chunk: &str, current_time_us: u64) -> Vec<EventRecord> {
        self.pending.push_str(chunk);
        let Some(last_newline) = self.pending.rfind('\n') else {
            return Vec::new();
        };
        let complete: String = self.pending.drain(..=last_newline).collect();

        let mut events = Vec::new();
        for line in complete.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_event_line(line, current_time_us) {
                Ok(event) => events.push(event),
                Err(DecodeError::NoObject) => {
                    tracing::trace!("Skipping non-JSON UART line: {}", line.trim());
                }
                Err(e) => {
                    self.malformed += 1;
                    tracing::warn!("Malformed JSON in UART output: {} ({})", line.trim(), e);
                }
            }
        }
        events
    }

    /// Bytes held back waiting for a newline.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn malformed_lines(&self) -> u64 {
        self.malformed
    }
}
