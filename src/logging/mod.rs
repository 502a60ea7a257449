//! Event logger.
//!
//! Every handled event is appended to exactly one [`EventSink`], chosen
//! once when the logger is built:
//! - [`StructuredSink`]: one JSON record per event in the `event_log` redb
//!   table, selected when a database handle is available.
//! - [`TextSink`]: one templated line per event in plain-text files.
//!
//! Call sites only see [`EventLogger::log`] and [`EventLogger::log_all`];
//! switching sinks is purely a configuration decision.

use crate::config::Config;
use redb::Database;
use seshet_proto::{Event, IrcStr};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub mod record;
pub mod structured;
pub mod template;
pub mod text;

pub use record::EventRecord;
pub use structured::{EVENT_LOG_TABLE, StructuredSink};
pub use text::TextSink;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("{field} is not a valid strftime format: '{value}'")]
    InvalidFormat { field: &'static str, value: String },
    #[error("invalid UTC offset: '{0}'")]
    InvalidOffset(String),
}

/// Which sink a logger writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Structured,
    Text,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Structured => "structured",
            Self::Text => "text",
        })
    }
}

/// A destination for event records.
pub trait EventSink: Send + Sync {
    /// Record a batch of events as one unit: either every record is
    /// written or none is. Returns only after the write is durable (or
    /// failed).
    ///
    /// `own_nick` is the tracked client's current nickname.
    fn append_all(&self, events: &[Event], own_nick: &IrcStr) -> Result<(), LogError>;

    /// Record one event.
    fn append(&self, event: &Event, own_nick: &IrcStr) -> Result<(), LogError> {
        self.append_all(std::slice::from_ref(event), own_nick)
    }

    fn kind(&self) -> SinkKind;
}

/// Front end for whichever sink was configured.
#[derive(Clone)]
pub struct EventLogger {
    sink: Arc<dyn EventSink>,
}

impl EventLogger {
    /// Structured sink if `db` is present, text sink otherwise.
    pub fn from_config(config: &Config, db: Option<Arc<Database>>) -> Result<Self, LogError> {
        let sink: Arc<dyn EventSink> = match db {
            Some(db) => Arc::new(StructuredSink::new(db)?),
            None => Arc::new(TextSink::new(config)?),
        };
        info!(sink = %sink.kind(), "Event logger initialized");
        Ok(Self { sink })
    }

    pub fn with_sink(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn log(&self, event: &Event, own_nick: &IrcStr) -> Result<(), LogError> {
        self.sink.append(event, own_nick)
    }

    /// Log several events atomically.
    pub fn log_all(&self, events: &[Event], own_nick: &IrcStr) -> Result<(), LogError> {
        match events {
            [] => Ok(()),
            [event] => self.sink.append(event, own_nick),
            _ => self.sink.append_all(events, own_nick),
        }
    }

    pub fn sink_kind(&self) -> SinkKind {
        self.sink.kind()
    }
}

impl fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogger")
            .field("sink", &self.sink.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use std::sync::Mutex;

    /// Remembers each batch it was handed.
    #[derive(Default)]
    struct Recording(Mutex<Vec<Vec<Event>>>);

    impl EventSink for Recording {
        fn append_all(&self, events: &[Event], _own_nick: &IrcStr) -> Result<(), LogError> {
            self.0.lock().unwrap().push(events.to_vec());
            Ok(())
        }

        fn kind(&self) -> SinkKind {
            SinkKind::Text
        }
    }

    #[test]
    fn test_database_selects_structured_sink() {
        let config = Config::default();
        let logger = EventLogger::from_config(&config, Some(db::open_in_memory().unwrap())).unwrap();
        assert_eq!(logger.sink_kind(), SinkKind::Structured);
    }

    #[test]
    fn test_no_database_selects_text_sink() {
        let logger = EventLogger::from_config(&Config::default(), None).unwrap();
        assert_eq!(logger.sink_kind(), SinkKind::Text);
    }

    #[test]
    fn test_log_forwards_to_sink() {
        let sink = Arc::new(Recording::default());
        let logger = EventLogger::with_sink(sink.clone());
        logger.log(&Event::join("bob", "#a"), &IrcStr::new("me")).unwrap();
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_log_all_hands_over_one_batch() {
        let sink = Arc::new(Recording::default());
        let logger = EventLogger::with_sink(sink.clone());
        let me = IrcStr::new("me");
        let events = [Event::quit("bob", "bye"), Event::quit("bob", "bye")];

        logger.log_all(&events, &me).unwrap();
        logger.log_all(&[], &me).unwrap();

        let batches = sink.0.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn test_bad_offset_is_rejected() {
        let mut config = Config::default();
        config.locale.utc_offset = "somewhere".into();
        let err = EventLogger::from_config(&config, None).unwrap_err();
        assert!(matches!(err, LogError::InvalidOffset(_)));
    }
}
