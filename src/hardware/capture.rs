// src/hardware/capture.rs - in-memory byte capture
use super::OutputChannel;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable in-memory byte sink.
///
/// Clones share the same buffer, so one handle can be given to a sink while
/// another reads back what was written. Works both as an [`OutputChannel`]
/// and as the writer behind a diagnostic console.
#[derive(Debug, Clone)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
    ready: bool,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self {
            bytes: Arc::new(Mutex::new(Vec::new())),
            ready: true,
        }
    }

    /// Same buffer, but reporting a failed readiness check.
    pub fn unavailable(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputChannel for SharedBuffer {
    fn name(&self) -> &str {
        "capture"
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn poll_out(&mut self, byte: u8) -> std::io::Result<()> {
        self.lock().push(byte);
        Ok(())
    }
}

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
