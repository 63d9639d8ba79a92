//! Trace model + document I/O.
//!
//! A trace is the sealed record of one session:
//! - start / end instants
//! - every line we sent (outbound)
//! - every line we kept from the device (inbound)
//!
//! On disk it is a single JSON document keyed by offset-from-start.

pub mod document;
pub mod model;
pub mod reader;
pub mod writer;

pub use model::{Direction, SessionTrace, TimestampedEvent, TraceBuilder};
pub use reader::{load_trace, read_trace};
pub use writer::{TraceWriter, render_trace, write_trace_to_path};
