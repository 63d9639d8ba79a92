use crate::error::DecodeError;

/// Line terminator used by the rowing computer in both directions.
pub const DELIMITER: &[u8] = b"\r\n";

/// Longest line accepted. Longer lines are dropped whole, however they were
/// split across chunks.
pub const MAX_LINE_LEN: usize = 4096;

/// Streaming CRLF line framer (chunk-safe).
///
/// Bytes may arrive split anywhere, including between `\r` and `\n`.
/// Complete lines come out in the order their terminator arrived, decoded and
/// with trailing whitespace stripped.
#[derive(Debug, Default, Clone)]
pub struct LineFramer {
    buf: Vec<u8>,
    /// Set after an overlong segment was thrown away; the next terminator
    /// ends the garbage rather than a line.
    discarding: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes; returns every line completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<String, DecodeError>> {
        let mut out = Vec::new();
        self.buf.extend_from_slice(bytes);

        let mut start = 0;
        while let Some(pos) = find_delimiter(&self.buf[start..]) {
            let end = start + pos;
            if self.discarding {
                self.discarding = false;
            } else if end - start > MAX_LINE_LEN {
                tracing::warn!("discarding {} byte line without reading it", end - start);
            } else {
                out.push(decode_line(&self.buf[start..end]));
            }
            start = end + DELIMITER.len();
        }
        self.buf.drain(..start);

        // A trailing CR may be the first half of the next terminator and is
        // not counted against the limit.
        let trailing_cr = self.buf.last() == Some(&b'\r');
        if self.buf.len() - usize::from(trailing_cr) > MAX_LINE_LEN {
            if !self.discarding {
                tracing::warn!(
                    "discarding {} bytes without a line terminator",
                    self.buf.len()
                );
            }
            self.buf.clear();
            if trailing_cr {
                self.buf.push(b'\r');
            }
            self.discarding = true;
        }

        out
    }

    /// Bytes buffered for the line in progress.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }
}

fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack.windows(DELIMITER.len()).position(|w| w == DELIMITER)
}

fn decode_line(segment: &[u8]) -> Result<String, DecodeError> {
    match std::str::from_utf8(segment) {
        Ok(text) => Ok(text.trim_end().to_string()),
        Err(e) => Err(DecodeError {
            bytes: segment.to_vec(),
            valid_up_to: e.valid_up_to(),
        }),
    }
}
