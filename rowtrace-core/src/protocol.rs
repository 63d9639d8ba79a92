//! Rowing-computer serial protocol: the commands we send and the inbound
//! lines we react to.

use crate::config::RecorderConfig;
use crate::framer::DELIMITER;

/// Commands the recorder sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch the computer into USB mode.
    Usb,
    Reset,
    /// Ask for the interface version.
    InterfaceVersion,
    /// `IRS055`: read one byte at 0x055, total distance in meters.
    ReadTotalDistance,
    /// `IRS1A9`: read one byte at 0x1A9, stroke rate.
    ReadStrokeRate,
    /// `IRS140`: read one byte at 0x140, total stroke count.
    ReadTotalStrokes,
}

/// Follow-up queries sent after every stroke-end marker, in order.
pub const STROKE_END_QUERIES: [Command; 3] = [
    Command::ReadTotalDistance,
    Command::ReadStrokeRate,
    Command::ReadTotalStrokes,
];

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Usb => "USB",
            Command::Reset => "RESET",
            Command::InterfaceVersion => "IV?",
            Command::ReadTotalDistance => "IRS055",
            Command::ReadStrokeRate => "IRS1A9",
            Command::ReadTotalStrokes => "IRS140",
        }
    }

    /// The bytes that go on the wire, terminator included.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut bytes = self.as_str().as_bytes().to_vec();
        bytes.extend_from_slice(DELIMITER);
        bytes
    }
}

/// The handshake sent on connect.
pub fn startup_sequence(reset_on_start: bool) -> Vec<Command> {
    let mut commands = vec![Command::Usb];
    if reset_on_start {
        commands.push(Command::Reset);
    }
    commands.push(Command::InterfaceVersion);
    commands
}

/// What an inbound line means to the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundKind {
    /// `PING`, idle keep-alive.
    Ping,
    /// Any other `P...` line, intensity telemetry.
    Pulse,
    /// `SS`
    StrokeStart,
    /// `SE`
    StrokeEnd,
    Other,
}

impl InboundKind {
    pub fn classify(line: &str) -> Self {
        match line {
            "PING" => InboundKind::Ping,
            "SS" => InboundKind::StrokeStart,
            "SE" => InboundKind::StrokeEnd,
            l if l.starts_with('P') => InboundKind::Pulse,
            _ => InboundKind::Other,
        }
    }

    pub fn is_stroke_end(&self) -> bool {
        matches!(self, InboundKind::StrokeEnd)
    }
}

/// Whether an inbound line goes into the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    Keep,
    DropPing,
    DropPulse,
}

/// First match wins: the ping filter, then the `P` prefix filter.
///
/// `PING` also starts with `P`, so with pings enabled but pulses disabled it
/// is still dropped by the second rule.
pub fn retention(config: &RecorderConfig, line: &str) -> Retention {
    if line == "PING" && !config.record_ping {
        Retention::DropPing
    } else if line.starts_with('P') && !config.record_pulse {
        Retention::DropPulse
    } else {
        Retention::Keep
    }
}
