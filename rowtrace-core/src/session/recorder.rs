//! Session recorder.
//!
//! Inputs:
//! - connection established (send the handshake)
//! - raw bytes or already-framed lines from the device
//! - end of session (operator interrupt or device gone)
//!
//! Output:
//! - bytes written to the transport
//! - a sealed SessionTrace
//!
//! Every handler runs to completion synchronously; the caller's event loop
//! decides when each one runs.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rowtrace_io::Transport;

use crate::clock::{Clock, SystemClock};
use crate::config::RecorderConfig;
use crate::error::RecorderError;
use crate::framer::LineFramer;
use crate::protocol::{self, Command, InboundKind, Retention, STROKE_END_QUERIES};
use crate::trace::{Direction, SessionTrace, TraceBuilder};

/// Counters for the status line printed at the end of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    pub lines_received: u64,
    pub lines_retained: u64,
    pub pings_dropped: u64,
    pub pulses_dropped: u64,
    pub strokes_completed: u64,
    pub decode_errors: u64,
}

#[derive(Debug)]
enum SessionState {
    /// Transport is open, handshake not sent yet.
    Idle,
    Recording(TraceBuilder),
    Ended,
}

#[derive(Debug)]
pub struct SessionRecorder<T: Transport, C: Clock = SystemClock> {
    config: RecorderConfig,
    transport: T,
    clock: C,
    framer: LineFramer,
    state: SessionState,
    stats: RecorderStats,
}

impl<T: Transport> SessionRecorder<T> {
    pub fn new(config: RecorderConfig, transport: T) -> Self {
        Self::with_clock(config, transport, SystemClock)
    }
}

impl<T: Transport, C: Clock> SessionRecorder<T, C> {
    pub fn with_clock(config: RecorderConfig, transport: T, clock: C) -> Self {
        Self {
            config,
            transport,
            clock,
            framer: LineFramer::new(),
            state: SessionState::Idle,
            stats: RecorderStats::default(),
        }
    }

    pub fn stats(&self) -> RecorderStats {
        self.stats
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, SessionState::Recording(_))
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.state, SessionState::Ended)
    }

    /// When the session started, once the handshake has gone out.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            SessionState::Recording(trace) => Some(trace.started_at()),
            _ => None,
        }
    }

    /// Start the session and send `USB`, `RESET` (if configured), `IV?`.
    pub fn on_connected(&mut self) -> Result<(), RecorderError> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Recording(_) => {
                tracing::warn!("connection reported twice; handshake already sent");
                return Ok(());
            }
            SessionState::Ended => {
                tracing::warn!("connection reported after the session ended; ignoring");
                return Ok(());
            }
        }

        tracing::info!("Starting recording from rowing computer");
        self.state = SessionState::Recording(TraceBuilder::new(self.clock.now()));

        for command in protocol::startup_sequence(self.config.reset_on_start) {
            self.emit(command, Duration::ZERO)?;
        }
        Ok(())
    }

    /// Frame raw bytes and handle every completed line.
    ///
    /// Undecodable lines are logged and dropped; framing carries on.
    pub fn on_bytes_received(&mut self, bytes: &[u8]) -> Result<(), RecorderError> {
        if self.is_ended() {
            tracing::debug!("ignoring {} bytes after session end", bytes.len());
            return Ok(());
        }
        tracing::debug!("data received {:?}", String::from_utf8_lossy(bytes));

        for item in self.framer.feed(bytes) {
            match item {
                Ok(line) => self.on_line_received(&line)?,
                Err(e) => {
                    self.stats.decode_errors += 1;
                    tracing::warn!("dropping line: {} ({:?})", e, e.bytes);
                }
            }
        }
        Ok(())
    }

    /// Handle one decoded line.
    ///
    /// Retention and the stroke-end trigger are independent: a line the
    /// filters drop can still fire follow-up queries.
    pub fn on_line_received(&mut self, line: &str) -> Result<(), RecorderError> {
        let now = self.clock.now();
        let trace = match &mut self.state {
            SessionState::Recording(trace) => trace,
            SessionState::Idle => {
                tracing::debug!("ignoring {:?} received before the handshake", line);
                return Ok(());
            }
            SessionState::Ended => {
                tracing::debug!("ignoring {:?} received after session end", line);
                return Ok(());
            }
        };

        self.stats.lines_received += 1;

        // Where the line sits in the trace; follow-up queries never precede it.
        let mut at = trace.offset_of(now);
        match protocol::retention(&self.config, line) {
            Retention::Keep => {
                at = trace.push(Direction::Inbound, at, line);
                self.stats.lines_retained += 1;
                tracing::trace!("kept {:?} at {:?}", line, at);
            }
            Retention::DropPing => {
                self.stats.pings_dropped += 1;
                tracing::trace!("dropped ping");
            }
            Retention::DropPulse => {
                self.stats.pulses_dropped += 1;
                tracing::trace!("dropped pulse {:?}", line);
            }
        }

        match InboundKind::classify(line) {
            InboundKind::StrokeStart => tracing::info!("Stroke started"),
            InboundKind::StrokeEnd => {
                tracing::info!("Stroke ended");
                self.stats.strokes_completed += 1;
                for command in STROKE_END_QUERIES {
                    self.emit(command, at)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Close the transport and seal the trace.
    ///
    /// Only the first call does anything; later calls return
    /// [`RecorderError::AlreadyEnded`].
    pub fn end_session(&mut self) -> Result<SessionTrace, RecorderError> {
        let trace = match std::mem::replace(&mut self.state, SessionState::Ended) {
            SessionState::Recording(trace) => trace,
            SessionState::Idle => {
                tracing::warn!("ending a session that never started; trace will be empty");
                TraceBuilder::new(self.clock.now())
            }
            SessionState::Ended => {
                tracing::warn!("session already ended; ignoring");
                return Err(RecorderError::AlreadyEnded);
            }
        };

        let ended_at = self.clock.now();
        if let Err(e) = self.transport.close() {
            tracing::warn!("failed to close transport cleanly: {}", e);
        }
        self.framer.reset();

        let sealed = trace.seal(ended_at);
        tracing::info!(
            "Recording ended after {:.1}s: {} sent, {} kept, {} strokes",
            sealed.duration().as_secs_f64(),
            sealed.outbound().len(),
            sealed.inbound().len(),
            self.stats.strokes_completed
        );
        Ok(sealed)
    }

    /// Send one command and log it as outbound, no earlier than `not_before`.
    /// Only valid while recording.
    fn emit(&mut self, command: Command, not_before: Duration) -> Result<(), RecorderError> {
        let SessionState::Recording(trace) = &mut self.state else {
            return Ok(());
        };
        let offset = trace.offset_of(self.clock.now()).max(not_before);
        self.transport.send(&command.to_wire())?;
        let offset = trace.push(Direction::Outbound, offset, command.as_str());
        tracing::debug!("sent {} at {:?}", command.as_str(), offset);
        Ok(())
    }
}
