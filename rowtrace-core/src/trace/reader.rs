use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::document::TraceDocument;
use super::model::SessionTrace;
use crate::error::RecorderError;

/// Parse a trace document. Each log comes back ordered by offset.
pub fn read_trace<R: Read>(reader: R) -> Result<SessionTrace, RecorderError> {
    let document: TraceDocument =
        serde_json::from_reader(reader).map_err(|e| RecorderError::TraceFormat(e.to_string()))?;
    document.into_trace()
}

pub fn load_trace(path: &Path) -> Result<SessionTrace, RecorderError> {
    let file = File::open(path).map_err(RecorderError::TraceRead)?;
    read_trace(BufReader::new(file))
}
