//! # Rowtrace Core
//!
//! Everything between the serial bytes and the JSON trace:
//! - [`framer`] turns arbitrarily chunked bytes into CRLF-delimited lines
//! - [`session`] runs the rowing-computer protocol and records what happened
//! - [`trace`] holds the sealed record and reads/writes the trace document

pub mod clock;
pub mod config;
pub mod error;
pub mod framer;
pub mod protocol;
pub mod session;
pub mod trace;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RecorderConfig;
pub use error::{DecodeError, RecorderError};
pub use framer::LineFramer;
pub use session::{RecorderStats, SessionRecorder};
pub use trace::{Direction, SessionTrace, TimestampedEvent, TraceBuilder, TraceWriter};
pub use trace::{load_trace, read_trace};
