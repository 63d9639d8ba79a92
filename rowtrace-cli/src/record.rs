//! `rowtrace record`: open the port, run the session until ctrl+c or the
//! device goes away, then write the trace.

use std::fs::File;
use std::future::Future;
use std::io::Write;

use anyhow::{Context, Result, bail};
use rowtrace_core::trace::render_trace;
use rowtrace_core::{Clock, SessionRecorder, SessionTrace, TraceWriter};
use rowtrace_io::{SerialTransport, Transport, TransportEvent, list_ports};
use tokio::sync::mpsc;

use crate::cli::{DeviceArgs, RecordArgs};

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Interrupted,
    DeviceClosed,
}

pub async fn run(device: &DeviceArgs, args: &RecordArgs) -> Result<()> {
    // Fail on a bad output path before touching the device.
    let sink = open_output(args)?;

    if !device.tty.exists() {
        let ports = list_ports();
        bail!(
            "device {} does not exist (available: {})",
            device.tty.display(),
            if ports.is_empty() {
                "none".to_string()
            } else {
                ports.join(", ")
            }
        );
    }

    let serial = device.serial_config();
    let (transport, mut events) = SerialTransport::open(&serial)
        .with_context(|| format!("cannot open {}", serial.port_name))?;
    tracing::debug!("port opened {:?}", transport);

    let mut recorder = SessionRecorder::new(args.recorder_config(), transport);
    let outcome = drive(&mut recorder, &mut events, shutdown_signal()).await;

    tracing::info!("Ending recording session.");
    let trace = recorder.end_session().context("ending session")?;
    // Anything still queued arrived after close.
    drop(events);

    write_output(sink, &trace)?;
    outcome.map(|_| ())
}

/// Feed transport events to the recorder, one at a time, until `shutdown`
/// resolves or the device is gone.
///
/// Does not end the session; the caller does that exactly once.
pub async fn drive<T, C, F>(
    recorder: &mut SessionRecorder<T, C>,
    events: &mut mpsc::Receiver<TransportEvent>,
    shutdown: F,
) -> Result<SessionEnd>
where
    T: Transport,
    C: Clock,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Keyboard interrupt");
                return Ok(SessionEnd::Interrupted);
            }

            event = events.recv() => match event {
                Some(TransportEvent::Connected(port)) => {
                    tracing::debug!("connected to {}", port);
                    recorder.on_connected()?;
                }
                Some(TransportEvent::Data(bytes)) => recorder.on_bytes_received(&bytes)?,
                Some(TransportEvent::Error(message)) => tracing::warn!("{}", message),
                Some(TransportEvent::Closed(port)) => {
                    tracing::warn!("device {} closed", port);
                    return Ok(SessionEnd::DeviceClosed);
                }
                None => {
                    tracing::warn!("transport event stream ended");
                    return Ok(SessionEnd::DeviceClosed);
                }
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
}

pub fn open_output(args: &RecordArgs) -> Result<Box<dyn Write>> {
    if args.writes_to_stdout() {
        return Ok(Box::new(std::io::stdout()));
    }
    let file = File::create(&args.output)
        .with_context(|| format!("cannot open output {}", args.output.display()))?;
    Ok(Box::new(file))
}

/// Write the trace; on failure dump it to stderr so the session is not lost.
pub fn write_output<W: Write>(sink: W, trace: &SessionTrace) -> Result<()> {
    match TraceWriter::new(sink).write(trace) {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!("{}; dumping trace to stderr", e);
            if let Ok(bytes) = render_trace(trace) {
                let _ = std::io::stderr().write_all(&bytes);
            }
            Err(e).context("writing trace")
        }
    }
}
