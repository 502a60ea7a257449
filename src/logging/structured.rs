//! Redb-backed structured event log.
//!
//! Implements [`EventSink`] by appending one [`EventRecord`] per event to
//! the `event_log` table. Keys are a dense `u64` sequence so iteration
//! order is insertion order. A batch shares one write transaction.

use super::{EventSink, LogError, SinkKind};
use crate::logging::record::EventRecord;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use seshet_proto::{Event, IrcStr};
use std::sync::Arc;
use tracing::debug;

/// Name of the event log table; reserved in the namespace store.
pub const EVENT_LOG_TABLE: &str = "event_log";

const EVENT_LOG: TableDefinition<u64, &[u8]> = TableDefinition::new(EVENT_LOG_TABLE);

pub struct StructuredSink {
    db: Arc<Database>,
}

impl StructuredSink {
    /// Create the sink, making sure the table exists.
    pub fn new(db: Arc<Database>) -> Result<Self, LogError> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(EVENT_LOG)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Every record, oldest first.
    pub fn records(&self) -> Result<Vec<EventRecord>, LogError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENT_LOG)?;

        let mut records = Vec::new();
        for item in table.iter()? {
            let (_seq, value) = item?;
            let record: EventRecord = serde_json::from_slice(value.value())
                .map_err(|e| LogError::Serialization(e.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }

    /// Records addressed to `target`, oldest first.
    pub fn records_for(&self, target: &IrcStr) -> Result<Vec<EventRecord>, LogError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| *target == r.target)
            .collect())
    }
}

impl EventSink for StructuredSink {
    fn append_all(&self, events: &[Event], _own_nick: &IrcStr) -> Result<(), LogError> {
        let values = events
            .iter()
            .map(|event| serde_json::to_vec(&EventRecord::from_event(event)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LogError::Serialization(e.to_string()))?;

        let write_txn = self.db.begin_write()?;
        let first = {
            let mut table = write_txn.open_table(EVENT_LOG)?;
            let first = table.last()?.map_or(0, |(key, _)| key.value() + 1);
            for (seq, value) in (first..).zip(&values) {
                table.insert(seq, value.as_slice())?;
            }
            first
        };
        write_txn.commit()?;

        for (seq, event) in (first..).zip(events) {
            debug!(seq, kind = %event.kind, target = %event.target, "Event recorded");
        }
        Ok(())
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Structured
    }
}
