// src/hardware/serial.rs - UART and stream output channels
use super::OutputChannel;
use async_trait::async_trait;
use serial2_tokio::SerialPort;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// UART output channel backed by a serial device.
///
/// The port is opened once at bind time. A port that fails to open leaves the
/// channel not ready, and the emission sink routes around it.
pub struct SerialChannel {
    port: Option<SerialPort>,
    path: String,
    baud_rate: u32,
}

impl SerialChannel {
    pub fn open(path: &str, baud_rate: u32) -> Self {
        tracing::info!("Opening UART {} at {} baud", path, baud_rate);
        let port = match SerialPort::open(path, baud_rate) {
            Ok(port) => Some(port),
            Err(e) => {
                tracing::error!("UART {} not ready: {}", path, e);
                None
            }
        };
        Self {
            port,
            path: path.to_string(),
            baud_rate,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

#[async_trait]
impl OutputChannel for SerialChannel {
    fn name(&self) -> &str {
        &self.path
    }

    fn is_ready(&self) -> bool {
        self.port.is_some()
    }

    async fn poll_out(&mut self, byte: u8) -> std::io::Result<()> {
        match self.port.as_mut() {
            Some(port) => port.write_all(&[byte]).await,
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                format!("UART {} is not open", self.path),
            )),
        }
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("path", &self.path)
            .field("baud_rate", &self.baud_rate)
            .field("ready", &self.port.is_some())
            .finish()
    }
}

/// Output channel over any async byte stream, e.g. process stdout.
pub struct StreamChannel<W> {
    name: String,
    writer: W,
}

impl<W> StreamChannel<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(name: &str, writer: W) -> Self {
        Self {
            name: name.to_string(),
            writer,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> OutputChannel for StreamChannel<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll_out(&mut self, byte: u8) -> std::io::Result<()> {
        self.writer.write_all(&[byte]).await
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush().await
    }
}
