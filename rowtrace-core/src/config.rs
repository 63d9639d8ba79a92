use serde::{Deserialize, Serialize};

/// What the recorder does on connect and what it keeps.
///
/// Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Send `RESET` between `USB` and `IV?` on connect.
    pub reset_on_start: bool,
    /// Keep `P...` intensity lines in the trace.
    pub record_pulse: bool,
    /// Keep idle `PING` lines in the trace.
    pub record_ping: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            reset_on_start: true,
            record_pulse: false,
            record_ping: false,
        }
    }
}
