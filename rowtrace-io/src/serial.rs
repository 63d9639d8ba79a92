//! serialport-backed transport.

use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serialport::{DataBits, FlowControl, SerialPort};
use tokio::sync::mpsc;

use crate::{SerialConfig, Transport, TransportError, TransportEvent, event_channel};

const READ_BUFFER_SIZE: usize = 1024;

/// An open serial port.
///
/// The read side lives on a blocking task that forwards every chunk as a
/// [`TransportEvent`]. This struct keeps a cloned handle for writing.
pub struct SerialTransport {
    port_name: String,
    writer: Box<dyn SerialPort>,
    stop: Arc<AtomicBool>,
    closed: bool,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port_name", &self.port_name)
            .field("closed", &self.closed)
            .finish()
    }
}

impl SerialTransport {
    /// Open the port and start the reader task.
    ///
    /// Must be called from within a tokio runtime. The returned channel
    /// yields [`TransportEvent::Connected`] first, then data in arrival order.
    pub fn open(
        config: &SerialConfig,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>), TransportError> {
        if config.baud_rate == 0 {
            return Err(TransportError::InvalidBaudRate(config.baud_rate));
        }
        let data_bits = data_bits(config.data_bits)?;
        let flow_control = if config.flow_control {
            FlowControl::Hardware
        } else {
            FlowControl::None
        };

        let port_name = config.port_name.clone();
        let open_error = |source| TransportError::Open {
            port: port_name.clone(),
            source,
        };

        let writer = serialport::new(&port_name, config.baud_rate)
            .data_bits(data_bits)
            .flow_control(flow_control)
            .timeout(config.read_timeout)
            .open()
            .map_err(open_error)?;
        let reader = writer.try_clone().map_err(open_error)?;

        tracing::info!("Opened serial port {} at {} baud", port_name, config.baud_rate);

        // Connected is queued before the reader exists.
        let (event_tx, event_rx) = event_channel(&port_name)?;

        let stop = Arc::new(AtomicBool::new(false));
        spawn_reader(port_name.clone(), reader, event_tx, Arc::clone(&stop));

        Ok((
            Self {
                port_name,
                writer,
                stop,
                closed: false,
            },
            event_rx,
        ))
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed(self.port_name.clone()));
        }
        tracing::debug!("sending data {:?}", String::from_utf8_lossy(bytes));
        self.writer
            .write_all(bytes)
            .and_then(|_| self.writer.flush())
            .map_err(|source| TransportError::Write {
                port: self.port_name.clone(),
                source,
            })
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if !self.closed {
            self.closed = true;
            self.stop.store(true, Ordering::SeqCst);
            tracing::debug!("closing serial port {}", self.port_name);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Names of the serial ports the OS currently reports.
pub fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            tracing::warn!("Scan failed: {}", e);
            Vec::new()
        }
    }
}

fn data_bits(bits: u8) -> Result<DataBits, TransportError> {
    match bits {
        5 => Ok(DataBits::Five),
        6 => Ok(DataBits::Six),
        7 => Ok(DataBits::Seven),
        8 => Ok(DataBits::Eight),
        other => Err(TransportError::InvalidDataBits(other)),
    }
}

fn spawn_reader(
    port_name: String,
    mut port: Box<dyn SerialPort>,
    event_tx: mpsc::Sender<TransportEvent>,
    stop: Arc<AtomicBool>,
) {
    tokio::task::spawn_blocking(move || {
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        while !stop.load(Ordering::SeqCst) {
            match port.read(&mut buffer) {
                Ok(0) => std::thread::sleep(Duration::from_millis(1)),
                Ok(n) => {
                    tracing::debug!("data received {:?}", &buffer[..n]);
                    if event_tx
                        .blocking_send(TransportEvent::Data(buffer[..n].to_vec()))
                        .is_err()
                    {
                        // Consumer is gone.
                        return;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => {
                    if !stop.load(Ordering::SeqCst) {
                        let _ = event_tx.blocking_send(TransportEvent::Error(format!(
                            "read from {} failed: {}",
                            port_name, e
                        )));
                        let _ = event_tx.blocking_send(TransportEvent::Closed(port_name.clone()));
                    }
                    break;
                }
            }
        }
        tracing::debug!("reader for {} stopped", port_name);
    });
}
