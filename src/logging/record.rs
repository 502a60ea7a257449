//! Type definitions for the structured event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use seshet_proto::{Event, EventKind};

/// One persisted event, stored as a JSON blob so fields can be added
/// without a schema change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_type: EventKind,
    /// UTC time in microseconds since the Unix epoch.
    pub event_time: i64,
    pub source: String,
    pub target: String,
    pub message: String,
    /// `user@host` of the source.
    pub host: String,
    pub params: Vec<String>,
}

impl EventRecord {
    pub fn from_event(event: &Event) -> Self {
        Self {
            event_type: event.kind,
            event_time: event.time.timestamp_micros(),
            source: event.source.to_string(),
            target: event.target.to_string(),
            message: event.message.clone(),
            host: event.hostmask.clone(),
            params: event.params.clone(),
        }
    }

    /// `None` only for a corrupt `event_time` outside chrono's range.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_micros(self.event_time)
    }

    /// ISO8601 rendering of `event_time`.
    pub fn timestamp_iso(&self) -> Option<String> {
        self.time()
            .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }
}
