use rowtrace_io::TransportError;
use thiserror::Error;

/// A framed segment that is not valid UTF-8. The bytes are kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("received line is not valid UTF-8 ({} bytes, valid up to {valid_up_to})", .bytes.len())]
pub struct DecodeError {
    pub bytes: Vec<u8>,
    pub valid_up_to: usize,
}

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("session already ended")]
    AlreadyEnded,

    #[error("failed to write trace: {0}")]
    SinkWrite(#[source] std::io::Error),

    #[error("failed to read trace: {0}")]
    TraceRead(#[source] std::io::Error),

    #[error("malformed trace document: {0}")]
    TraceFormat(String),
}
