// src/hardware/mod.rs - output channel and emission sink
pub mod capture;
pub mod serial;

use async_trait::async_trait;
use std::io::Write;
use thiserror::Error;

pub use capture::SharedBuffer;
pub use serial::{SerialChannel, StreamChannel};

/// Byte-oriented output channel with poll-write semantics.
///
/// `poll_out` hands over exactly one byte and completes once the byte has
/// been accepted; implementations must not buffer across calls.
#[async_trait]
pub trait OutputChannel: Send {
    fn name(&self) -> &str;

    /// Readiness as determined when the channel was bound.
    fn is_ready(&self) -> bool {
        true
    }

    async fn poll_out(&mut self, byte: u8) -> std::io::Result<()>;

    async fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write to {channel} failed: {source}")]
    Io {
        channel: String,
        #[source]
        source: std::io::Error,
    },
}

/// Human-readable console; also the stand-in for an unavailable output channel.
pub struct DiagnosticConsole {
    writer: Box<dyn Write + Send>,
}

impl DiagnosticConsole {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self { writer: Box::new(writer) }
    }

    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }
}

impl std::fmt::Debug for DiagnosticConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticConsole").finish_non_exhaustive()
    }
}

/// Where emitted bytes go for the lifetime of the process.
pub enum SinkRoute {
    Channel(Box<dyn OutputChannel>),
    Diagnostic(DiagnosticConsole),
}

/// Emission statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub events_emitted: u64,
    pub bytes_sent: u64,
    pub write_errors: u64,
}

/// Emission sink with its route fixed at startup.
pub struct EmissionSink {
    route: SinkRoute,
    stats: SinkStats,
}

impl EmissionSink {
    /// Picks the route once: the channel if it is bound and ready, otherwise
    /// the diagnostic console.
    pub fn resolve(channel: Option<Box<dyn OutputChannel>>, console: DiagnosticConsole) -> Self {
        let route = match channel {
            Some(channel) if channel.is_ready() => {
                tracing::info!("{} ready for JSON output", channel.name());
                SinkRoute::Channel(channel)
            }
            Some(channel) => {
                tracing::error!("{} device not ready, events go to the diagnostic console", channel.name());
                SinkRoute::Diagnostic(console)
            }
            None => {
                tracing::warn!("No output channel bound, events go to the diagnostic console");
                SinkRoute::Diagnostic(console)
            }
        };
        Self {
            route,
            stats: SinkStats::default(),
        }
    }

    /// Writes one encoded event, byte by byte in order.
    pub async fn emit(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        let result = match &mut self.route {
            SinkRoute::Channel(channel) => {
                let mut outcome = Ok(());
                for &byte in bytes {
                    if let Err(e) = channel.poll_out(byte).await {
                        outcome = Err(e);
                        break;
                    }
                    self.stats.bytes_sent += 1;
                }
                match outcome {
                    Ok(()) => channel.flush().await,
                    Err(e) => Err(e),
                }
            }
            SinkRoute::Diagnostic(console) => console.write_bytes(bytes).map(|()| {
                self.stats.bytes_sent += bytes.len() as u64;
            }),
        };

        match result {
            Ok(()) => {
                self.stats.events_emitted += 1;
                tracing::trace!("TX {} bytes via {}", bytes.len(), self.route_name());
                Ok(())
            }
            Err(source) => {
                self.stats.write_errors += 1;
                Err(SinkError::Io {
                    channel: self.route_name().to_string(),
                    source,
                })
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.route, SinkRoute::Diagnostic(_))
    }

    pub fn route_name(&self) -> &str {
        match &self.route {
            SinkRoute::Channel(channel) => channel.name(),
            SinkRoute::Diagnostic(_) => "diagnostic console",
        }
    }

    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }
}

impl std::fmt::Debug for EmissionSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmissionSink")
            .field("route", &self.route_name())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingChannel {
        accepted: usize,
    }

    #[async_trait]
    impl OutputChannel for FailingChannel {
        fn name(&self) -> &str {
            "flaky-uart"
        }

        async fn poll_out(&mut self, _byte: u8) -> std::io::Result<()> {
            if self.accepted == 3 {
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "line dropped"));
            }
            self.accepted += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_ready_channel_receives_bytes() {
        let uart = SharedBuffer::new();
        let console = SharedBuffer::new();
        let mut sink = EmissionSink::resolve(Some(Box::new(uart.clone())), DiagnosticConsole::new(console.clone()));
        assert!(!sink.is_fallback());
        sink.emit(b"hello\n").await.unwrap();
        assert_eq!(uart.contents(), b"hello\n");
        assert!(console.contents().is_empty());
        assert_eq!(sink.stats().bytes_sent, 6);
        assert_eq!(sink.stats().events_emitted, 1);
    }

    #[tokio::test]
    async fn test_unready_channel_falls_back_for_good() {
        let uart = SharedBuffer::new().unavailable();
        let console = SharedBuffer::new();
        let mut sink = EmissionSink::resolve(Some(Box::new(uart.clone())), DiagnosticConsole::new(console.clone()));
        assert!(sink.is_fallback());
        sink.emit(b"a\n").await.unwrap();
        sink.emit(b"b\n").await.unwrap();
        assert!(uart.contents().is_empty());
        assert_eq!(console.text(), "a\nb\n");
        assert_eq!(sink.route_name(), "diagnostic console");
    }

    #[tokio::test]
    async fn test_unbound_channel_falls_back() {
        let console = SharedBuffer::new();
        let mut sink = EmissionSink::resolve(None, DiagnosticConsole::new(console.clone()));
        sink.emit(b"x\n").await.unwrap();
        assert_eq!(console.text(), "x\n");
    }

    #[tokio::test]
    async fn test_write_error_is_reported_without_retry() {
        let console = SharedBuffer::new();
        let mut sink = EmissionSink::resolve(
            Some(Box::new(FailingChannel { accepted: 0 })),
            DiagnosticConsole::new(console.clone()),
        );
        let err = sink.emit(b"abcdef").await.unwrap_err();
        assert!(err.to_string().contains("flaky-uart"));
        assert_eq!(sink.stats().bytes_sent, 3);
        assert_eq!(sink.stats().write_errors, 1);
        assert_eq!(sink.stats().events_emitted, 0);
        // the route does not change after a failed write
        assert!(!sink.is_fallback());
        assert!(console.contents().is_empty());
    }
}
