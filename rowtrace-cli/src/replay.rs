//! `rowtrace replay`: print a recorded trace as one timeline.

use std::time::Duration;

use anyhow::{Context, Result};
use rowtrace_core::trace::document::format_offset;
use rowtrace_core::{Direction, SessionTrace, load_trace};

use crate::cli::ReplayArgs;

pub fn render_header(trace: &SessionTrace) -> String {
    format!(
        "# recording {} -> {} ({:.3}s, {} sent, {} received)",
        trace.started_at().to_rfc3339(),
        trace.ended_at().to_rfc3339(),
        trace.duration().as_secs_f64(),
        trace.outbound().len(),
        trace.inbound().len()
    )
}

/// One line per event: offset, `>>` for sent or `<<` for received, text.
pub fn render_timeline(trace: &SessionTrace) -> Vec<String> {
    trace
        .timeline()
        .into_iter()
        .map(|(direction, event)| {
            let arrow = match direction {
                Direction::Outbound => ">>",
                Direction::Inbound => "<<",
            };
            format!("{:>16} {} {}", format_offset(event.offset), arrow, event.payload)
        })
        .collect()
}

pub async fn run(args: &ReplayArgs) -> Result<()> {
    let trace = load_trace(&args.trace)
        .with_context(|| format!("cannot load {}", args.trace.display()))?;

    println!("{}", render_header(&trace));

    let mut previous = Duration::ZERO;
    for ((_, event), line) in trace.timeline().into_iter().zip(render_timeline(&trace)) {
        if args.pace {
            tokio::time::sleep(event.offset.saturating_sub(previous)).await;
            previous = event.offset;
        }
        println!("{}", line);
    }
    Ok(())
}
