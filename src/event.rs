//! Wire encoding for sensor events.
//!
//! Each event is one compact JSON object terminated by a newline:
//!
//! ```text
//! {"type":"SAMPLE","value":23.4,"time":3000000}
//! ```
//!
//! Key order, key names, the absence of whitespace and the single fractional
//! digit on `value` are all relied on by the coordinator that parses the
//! stream, so the line is rendered by hand instead of through a serializer.

use crate::config::EVENT_BUFFER_CAPACITY;
use thiserror::Error;

/// Tag carried by periodic sensor readings.
pub const SAMPLE_EVENT: &str = "SAMPLE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("encoded event needs {len} bytes, buffer holds {capacity}")]
    Overflow { len: usize, capacity: usize },
}

/// A single reading on its way to the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event<'a> {
    pub kind: &'a str,
    pub value: f32,
    pub time_us: u64,
}

impl Event<'static> {
    pub fn sample(value: f32, time_us: u64) -> Self {
        Self {
            kind: SAMPLE_EVENT,
            value,
            time_us,
        }
    }
}

impl Event<'_> {
    pub fn encode(&self) -> Result<EncodedEvent, EncodeError> {
        encode_event(self.kind, self.value, self.time_us)
    }
}

/// A rendered, newline-terminated event line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEvent(String);

impl EncodedEvent {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Renders `{"type":<kind>,"value":<value>,"time":<time_us>}\n`.
///
/// Lines that would not fit the encode buffer together with its terminator
/// are rejected rather than truncated.
pub fn encode_event(kind: &str, value: f32, time_us: u64) -> Result<EncodedEvent, EncodeError> {
    // serde_json::Value's Display gives a compact, escaped JSON string
    let tag = serde_json::Value::from(kind);
    let line = format!("{{\"type\":{},\"value\":{:.1},\"time\":{}}}\n", tag, value, time_us);

    if line.len() >= EVENT_BUFFER_CAPACITY {
        return Err(EncodeError::Overflow {
            len: line.len(),
            capacity: EVENT_BUFFER_CAPACITY,
        });
    }
    Ok(EncodedEvent(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_line_format() {
        let encoded = Event::sample(23.4, 3_000_000).encode().unwrap();
        assert_eq!(encoded.as_str(), "{\"type\":\"SAMPLE\",\"value\":23.4,\"time\":3000000}\n");
    }

    #[test]
    fn test_value_has_exactly_one_decimal() {
        assert_eq!(
            encode_event("SAMPLE", 27.0, 0).unwrap().as_str(),
            "{\"type\":\"SAMPLE\",\"value\":27.0,\"time\":0}\n"
        );
        assert_eq!(
            encode_event("SAMPLE", 28.868, 0).unwrap().as_str(),
            "{\"type\":\"SAMPLE\",\"value\":28.9,\"time\":0}\n"
        );
        assert_eq!(
            encode_event("SAMPLE", 20.04, 9_000_000).unwrap().as_str(),
            "{\"type\":\"SAMPLE\",\"value\":20.0,\"time\":9000000}\n"
        );
    }

    #[test]
    fn test_large_timestamp() {
        let encoded = encode_event("SAMPLE", 25.5, u64::MAX).unwrap();
        assert!(encoded.as_str().ends_with(",\"time\":18446744073709551615}\n"));
    }

    #[test]
    fn test_overflow_is_rejected() {
        let kind = "X".repeat(EVENT_BUFFER_CAPACITY);
        let err = encode_event(&kind, 25.0, 0).unwrap_err();
        match err {
            EncodeError::Overflow { len, capacity } => {
                assert!(len > capacity);
                assert_eq!(capacity, 256);
            }
        }
    }

    #[test]
    fn test_overflow_boundary_counts_terminator() {
        // length of the line with an empty tag
        let fixed = encode_event("", 25.0, 0).unwrap().len();
        let fits = "A".repeat(EVENT_BUFFER_CAPACITY - 1 - fixed);
        assert_eq!(encode_event(&fits, 25.0, 0).unwrap().len(), EVENT_BUFFER_CAPACITY - 1);
        let too_long = "A".repeat(EVENT_BUFFER_CAPACITY - fixed);
        assert!(encode_event(&too_long, 25.0, 0).is_err());
    }

    #[test]
    fn test_tag_is_escaped() {
        let encoded = encode_event("a\"b", 21.0, 5).unwrap();
        assert_eq!(encoded.as_str(), "{\"type\":\"a\\\"b\",\"value\":21.0,\"time\":5}\n");
    }
}
