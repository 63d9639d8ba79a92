//! # Rowtrace IO
//!
//! The Hardware Bridge.
//! Owns the serial link to the rowing computer and turns it into a stream of
//! [`TransportEvent`]s. Writing goes through the [`Transport`] trait so the
//! recorder can be driven by a [`MockTransport`] in tests.

mod mock;
mod serial;

pub use mock::MockTransport;
pub use serial::{SerialTransport, list_ports};

use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Capacity of the event channel between the reader task and the consumer.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// A fresh event channel with [`TransportEvent::Connected`] already queued, so
/// it is the first event the consumer sees.
pub fn event_channel(
    port_name: &str,
) -> Result<(mpsc::Sender<TransportEvent>, mpsc::Receiver<TransportEvent>), TransportError> {
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    event_tx
        .try_send(TransportEvent::Connected(port_name.to_string()))
        .map_err(|e| {
            tracing::warn!("cannot queue connect event for {}: {}", port_name, e);
            TransportError::Closed(port_name.to_string())
        })?;
    Ok((event_tx, event_rx))
}

/// Events from the Hardware Layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Port opened; always the first event on a fresh channel.
    Connected(String),
    /// A raw chunk of bytes, in arrival order. Chunk boundaries are arbitrary.
    Data(Vec<u8>),
    /// The port went away (unplugged, read error after an error event).
    Closed(String),
    /// Non-fatal read problem worth reporting.
    Error(String),
}

/// Configuration for a Serial Connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub flow_control: bool,
    /// How long a blocking read waits before re-checking the stop flag.
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// 8N1, no flow control. This is what the rowing computer speaks.
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            data_bits: 8,
            flow_control: false,
            read_timeout: Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("unsupported baud rate {0}")]
    InvalidBaudRate(u32),

    #[error("unsupported data bits {0} (expected 5-8)")]
    InvalidDataBits(u8),

    #[error("write to {port} failed: {source}")]
    Write {
        port: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transport {0} is closed")]
    Closed(String),
}

/// The write half of a connection, as seen by the recorder.
///
/// Receiving is not part of the trait: implementations deliver inbound bytes
/// as [`TransportEvent::Data`] on their own channel.
pub trait Transport: Send {
    /// Write the whole buffer, in order.
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Stop the connection. Calling it again is a no-op.
    fn close(&mut self) -> Result<(), TransportError>;

    fn is_closed(&self) -> bool;
}
