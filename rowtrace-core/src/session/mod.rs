//! Session recorder.
//!
//! One session = one connection to the rowing computer, from the startup
//! handshake to the operator stopping the recording. The recorder:
//! - sends the handshake and the per-stroke follow-up queries
//! - frames inbound bytes into lines and filters pings / pulses
//! - seals everything into a [`crate::trace::SessionTrace`] at the end

pub mod recorder;

pub use recorder::{RecorderStats, SessionRecorder};
