//! Session trace model.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smallest step used to keep offsets strictly increasing.
const TICK: Duration = Duration::from_nanos(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Written by the recorder.
    Outbound,
    /// Received from the device.
    Inbound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedEvent {
    /// Time since the session started.
    pub offset: Duration,
    pub payload: String,
}

impl TimestampedEvent {
    pub fn new(offset: Duration, payload: impl Into<String>) -> Self {
        Self {
            offset,
            payload: payload.into(),
        }
    }
}

/// The sealed record of one session. Read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTrace {
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    outbound: Vec<TimestampedEvent>,
    inbound: Vec<TimestampedEvent>,
}

impl SessionTrace {
    pub(crate) fn from_parts(
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        outbound: Vec<TimestampedEvent>,
        inbound: Vec<TimestampedEvent>,
    ) -> Self {
        Self {
            started_at,
            ended_at,
            outbound,
            inbound,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    pub fn duration(&self) -> Duration {
        (self.ended_at - self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    pub fn outbound(&self) -> &[TimestampedEvent] {
        &self.outbound
    }

    pub fn inbound(&self) -> &[TimestampedEvent] {
        &self.inbound
    }

    pub fn events(&self, direction: Direction) -> &[TimestampedEvent] {
        match direction {
            Direction::Outbound => &self.outbound,
            Direction::Inbound => &self.inbound,
        }
    }

    /// Both logs merged by offset. On equal offsets inbound comes first, so a
    /// stroke end precedes the queries it triggered.
    pub fn timeline(&self) -> Vec<(Direction, &TimestampedEvent)> {
        let mut merged: Vec<_> = self
            .inbound
            .iter()
            .map(|e| (Direction::Inbound, e))
            .chain(self.outbound.iter().map(|e| (Direction::Outbound, e)))
            .collect();
        merged.sort_by_key(|(_, e)| e.offset);
        merged
    }
}

/// The mutable form of a trace, owned by the recorder until it is sealed.
#[derive(Debug, Clone)]
pub struct TraceBuilder {
    started_at: DateTime<Utc>,
    outbound: Vec<TimestampedEvent>,
    inbound: Vec<TimestampedEvent>,
}

impl TraceBuilder {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            outbound: Vec::new(),
            inbound: Vec::new(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Offset of `now` from the session start. Clamped at zero if the wall
    /// clock stepped backwards.
    pub fn offset_of(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Append to one direction's log and return the offset actually stored.
    ///
    /// Offsets within a log are strictly increasing: an offset that does not
    /// move past the previous entry is bumped to previous + 1ns.
    pub fn push(
        &mut self,
        direction: Direction,
        offset: Duration,
        payload: impl Into<String>,
    ) -> Duration {
        let log = match direction {
            Direction::Outbound => &mut self.outbound,
            Direction::Inbound => &mut self.inbound,
        };
        let offset = match log.last() {
            Some(prev) if offset <= prev.offset => prev.offset + TICK,
            _ => offset,
        };
        log.push(TimestampedEvent::new(offset, payload));
        offset
    }

    pub fn len(&self, direction: Direction) -> usize {
        match direction {
            Direction::Outbound => self.outbound.len(),
            Direction::Inbound => self.inbound.len(),
        }
    }

    /// Freeze the trace. `ended_at` never precedes the start.
    pub fn seal(self, ended_at: DateTime<Utc>) -> SessionTrace {
        SessionTrace::from_parts(
            self.started_at,
            ended_at.max(self.started_at),
            self.outbound,
            self.inbound,
        )
    }
}
