//! Trace writer.
//!
//! Renders the whole document in memory, then hands it to the sink in one
//! `write_all`. A failed write leaves the trace untouched so the caller can
//! try somewhere else.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::document::TraceDocument;
use super::model::SessionTrace;
use crate::error::RecorderError;

const INDENT: &[u8] = b"    ";

/// Serialize a sealed trace: sorted keys, four-space indent, trailing newline.
pub fn render_trace(trace: &SessionTrace) -> Result<Vec<u8>, RecorderError> {
    let document = TraceDocument::from_trace(trace);
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    document.serialize(&mut serializer).map_err(|e| {
        RecorderError::SinkWrite(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    out.push(b'\n');
    Ok(out)
}

#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    sink: W,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Write the trace and flush. Returns the number of bytes written.
    pub fn write(&mut self, trace: &SessionTrace) -> Result<usize, RecorderError> {
        let bytes = render_trace(trace)?;
        self.sink
            .write_all(&bytes)
            .and_then(|_| self.sink.flush())
            .map_err(RecorderError::SinkWrite)?;
        tracing::info!(
            "Wrote trace ({} sent, {} received, {} bytes)",
            trace.outbound().len(),
            trace.inbound().len(),
            bytes.len()
        );
        Ok(bytes.len())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Create (or truncate) `path` and write the trace to it.
pub fn write_trace_to_path(trace: &SessionTrace, path: &Path) -> Result<usize, RecorderError> {
    let file = File::create(path).map_err(RecorderError::SinkWrite)?;
    TraceWriter::new(file).write(trace)
}
