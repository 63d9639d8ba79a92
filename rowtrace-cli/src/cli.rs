use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rowtrace_core::RecorderConfig;
use rowtrace_io::SerialConfig;

#[derive(Parser, Debug)]
#[command(name = "rowtrace", version, about = "Water Rower USB interface command line client")]
pub struct Cli {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Enable more verbose output from execution
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// TTY device for accessing the rowing computer's USB interface
    #[arg(long, global = true, default_value = "/dev/ttyACM1")]
    pub tty: PathBuf,

    /// Baud rate used when talking to the rowing computer
    #[arg(long, global = true, default_value_t = 115200, value_parser = clap::value_parser!(u32).range(1..))]
    pub baudrate: u32,
}

impl DeviceArgs {
    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig::new(self.tty.to_string_lossy(), self.baudrate)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record rowing computer inputs and outputs as JSON. End the session with ctrl+c.
    Record(RecordArgs),
    /// Print a recorded trace as one merged timeline.
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Reset rowing computer on initiating communication (default)
    #[arg(long, overrides_with = "no_reset")]
    pub reset: bool,
    #[arg(long = "no-reset", overrides_with = "reset")]
    pub no_reset: bool,

    /// Record intensity pulse
    #[arg(long, overrides_with = "no_pulse")]
    pub pulse: bool,
    #[arg(long = "no-pulse", overrides_with = "pulse")]
    pub no_pulse: bool,

    /// Record idle ping messages
    #[arg(long, overrides_with = "no_ping")]
    pub ping: bool,
    #[arg(long = "no-ping", overrides_with = "ping")]
    pub no_ping: bool,

    /// Where to write the trace; `-` for stdout
    pub output: PathBuf,
}

impl RecordArgs {
    pub fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            reset_on_start: self.reset || !self.no_reset,
            record_pulse: self.pulse && !self.no_pulse,
            record_ping: self.ping && !self.no_ping,
        }
    }

    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Trace file written by `record`
    pub trace: PathBuf,

    /// Sleep between entries to reproduce the original timing
    #[arg(long)]
    pub pace: bool,
}
