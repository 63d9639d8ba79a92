//! On-disk layout of a trace.
//!
//! ```text
//! {
//!     "00_header": { "recording": { "end": <epoch secs>, "start": <epoch secs> } },
//!     "01_data": {
//!         "00_write": { "<offset secs>": "<sent line>", ... },
//!         "01_read": { "<offset secs>": "<received line>", ... }
//!     }
//! }
//! ```
//!
//! Top-level and header fields are declared in sorted key order. The logs are
//! keyed by [`OffsetKey`], so entries come out in time order (`2.0` before
//! `10.0`), as a numeric key sort would give.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::model::{SessionTrace, TimestampedEvent};
use crate::error::RecorderError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDocument {
    #[serde(rename = "00_header")]
    pub header: Header,
    #[serde(rename = "01_data")]
    pub data: Data,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub recording: Recording,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub end: f64,
    pub start: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    #[serde(rename = "00_write")]
    pub write: BTreeMap<OffsetKey, String>,
    #[serde(rename = "01_read")]
    pub read: BTreeMap<OffsetKey, String>,
}

/// A log key: offset from session start, ordered by time.
///
/// Written with [`format_offset`], read with [`parse_offset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OffsetKey(pub Duration);

impl Serialize for OffsetKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_offset(self.0))
    }
}

impl<'de> Deserialize<'de> for OffsetKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        parse_offset(&key)
            .map(OffsetKey)
            .ok_or_else(|| de::Error::custom(format!("invalid offset key {:?}", key)))
    }
}

impl TraceDocument {
    pub fn from_trace(trace: &SessionTrace) -> Self {
        Self {
            header: Header {
                recording: Recording {
                    end: epoch_seconds(trace.ended_at()),
                    start: epoch_seconds(trace.started_at()),
                },
            },
            data: Data {
                write: keyed(trace.outbound()),
                read: keyed(trace.inbound()),
            },
        }
    }

    pub fn into_trace(self) -> Result<SessionTrace, RecorderError> {
        let started_at = from_epoch_seconds(self.header.recording.start)?;
        let ended_at = from_epoch_seconds(self.header.recording.end)?;
        Ok(SessionTrace::from_parts(
            started_at,
            ended_at,
            unkeyed(self.data.write),
            unkeyed(self.data.read),
        ))
    }
}

/// `<secs>.<nanos>` with all nine fractional digits, so keys parse back exactly.
pub fn format_offset(offset: Duration) -> String {
    format!("{}.{:09}", offset.as_secs(), offset.subsec_nanos())
}

/// Parse an offset key.
///
/// Accepts the fixed-point form written by [`format_offset`] and, for traces
/// produced by other tools, any float `f64` can parse (`1.5e-05` included).
pub fn parse_offset(key: &str) -> Option<Duration> {
    parse_fixed_point(key).or_else(|| {
        key.parse::<f64>()
            .ok()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    })
}

fn parse_fixed_point(key: &str) -> Option<Duration> {
    let (secs, frac) = key.split_once('.').unwrap_or((key, ""));
    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs: u64 = secs.parse().ok()?;
    // Digits past nanoseconds are truncated.
    let digits = &frac[..frac.len().min(9)];
    let nanos = if digits.is_empty() {
        0
    } else {
        digits.parse::<u32>().ok()? * 10u32.pow(9 - digits.len() as u32)
    };
    Some(Duration::new(secs, nanos))
}

fn keyed(events: &[TimestampedEvent]) -> BTreeMap<OffsetKey, String> {
    events
        .iter()
        .map(|e| (OffsetKey(e.offset), e.payload.clone()))
        .collect()
}

fn unkeyed(map: BTreeMap<OffsetKey, String>) -> Vec<TimestampedEvent> {
    map.into_iter()
        .map(|(OffsetKey(offset), payload)| TimestampedEvent::new(offset, payload))
        .collect()
}

/// Epoch seconds at microsecond resolution.
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

fn from_epoch_seconds(secs: f64) -> Result<DateTime<Utc>, RecorderError> {
    if !secs.is_finite() {
        return Err(RecorderError::TraceFormat(format!(
            "invalid recording timestamp {}",
            secs
        )));
    }
    DateTime::from_timestamp_micros((secs * 1_000_000.0).round() as i64).ok_or_else(|| {
        RecorderError::TraceFormat(format!("recording timestamp {} out of range", secs))
    })
}
