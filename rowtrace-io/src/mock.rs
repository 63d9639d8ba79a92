//! In-memory transport for tests and dry runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{Transport, TransportError};

/// Records everything written to it. Clones share the same buffers, so a test
/// can keep one handle while the recorder owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Debug, Default)]
struct MockInner {
    written: Vec<u8>,
    closed: bool,
    fail_writes: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every byte sent so far.
    pub fn written(&self) -> Vec<u8> {
        self.lock().written.clone()
    }

    /// Sent bytes split on CRLF, without the terminators.
    pub fn written_lines(&self) -> Vec<String> {
        let written = self.written();
        String::from_utf8_lossy(&written)
            .split_terminator("\r\n")
            .map(str::to_string)
            .collect()
    }

    pub fn clear_written(&self) {
        self.lock().written.clear();
    }

    /// Make every subsequent `send` fail, as an unplugged port would.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }
}

impl Transport for MockTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(TransportError::Closed("mock".to_string()));
        }
        if inner.fail_writes {
            return Err(TransportError::Write {
                port: "mock".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "mock write failure"),
            });
        }
        inner.written.extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.lock().closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
