//! Database module for persistent storage.
//!
//! One redb file backs everything the bot persists:
//! - the structured event log (`event_log` table)
//! - the namespace registry and one table per materialized namespace
//!
//! Every write is a single redb transaction committed before the call
//! returns; there is no background writer.

use redb::Database;
use redb::backends::InMemoryBackend;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Path value that selects an in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),
    #[error("failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Open (or create) the database at `path`.
///
/// `:memory:` opens a private in-memory database, which is what tests use.
/// Missing parent directories are created.
pub fn open(path: &str) -> Result<Arc<Database>, DbError> {
    if path == MEMORY_PATH {
        return open_in_memory();
    }

    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::create(path)?;
    info!(path = %path, "Database opened");
    Ok(Arc::new(db))
}

/// Open a throwaway in-memory database.
pub fn open_in_memory() -> Result<Arc<Database>, DbError> {
    let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
    Ok(Arc::new(db))
}
