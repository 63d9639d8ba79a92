//! Rowtrace CLI library target.
//!
//! The binary entry point is in `main.rs`; the argument types and run loops
//! live here so `tests/` can exercise them without a serial device.

pub mod cli;
pub mod record;
pub mod replay;

pub use cli::{Cli, Command, DeviceArgs, RecordArgs, ReplayArgs};

/// Install the stderr log subscriber. `--debug` lowers the level to DEBUG.
pub fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
