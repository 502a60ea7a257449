//! Namespaced persistent key/value store.
//!
//! One redb database holds a registry table (`namespaces`, namespace name to
//! backing table name) plus one table per materialized namespace. Modules
//! receive a [`NamespaceHandle`] when they are set up and use it for every
//! read and write, so two modules using the same key never collide.
//!
//! Values are stored as JSON. Storing a value that serializes to `null`
//! (for example `None::<T>`) deletes the key instead.

use crate::logging::EVENT_LOG_TABLE;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

mod namespace;

pub use namespace::NamespaceHandle;

/// Registry table name.
pub const REGISTRY_TABLE: &str = "namespaces";

/// Namespace reserved for the bot core itself.
pub const BOT_NAMESPACE: &str = "bot";

/// Names modules may not claim.
pub const RESERVED_NAMES: [&str; 3] = [BOT_NAMESPACE, REGISTRY_TABLE, EVENT_LOG_TABLE];

pub(crate) const REGISTRY: TableDefinition<&str, &str> = TableDefinition::new(REGISTRY_TABLE);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("cannot serialize value for '{key}': {reason}")]
    Serialization { key: String, reason: String },
    #[error("cannot deserialize value of '{key}': {reason}")]
    Deserialization { key: String, reason: String },
    #[error("namespace name '{0}' is reserved")]
    ReservedName(String),
    #[error("namespace name must not be empty")]
    EmptyName,
}

/// Entry point to the namespace store.
#[derive(Clone, Debug)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Wrap `db`, creating the registry table if needed.
    pub fn new(db: Arc<Database>) -> Result<Self, StoreError> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(REGISTRY)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Handle for a module's namespace. Nothing is created until the first
    /// write through the handle.
    pub fn namespace(&self, name: &str) -> Result<NamespaceHandle, StoreError> {
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name)) {
            return Err(StoreError::ReservedName(name.to_string()));
        }
        Ok(NamespaceHandle::new(self.db.clone(), name))
    }

    /// Handle for the bot-wide namespace.
    pub fn bot(&self) -> NamespaceHandle {
        NamespaceHandle::new(self.db.clone(), BOT_NAMESPACE)
    }

    /// Names of every materialized namespace, sorted.
    pub fn namespaces(&self) -> Result<Vec<String>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let registry = read_txn.open_table(REGISTRY)?;
        let mut names = Vec::new();
        for item in registry.iter()? {
            let (name, _) = item?;
            names.push(name.value().to_string());
        }
        Ok(names)
    }

    /// Remove a namespace and its table. Returns false if it was never
    /// materialized.
    pub fn drop_namespace(&self, name: &str) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let dropped = {
            let mut registry = write_txn.open_table(REGISTRY)?;
            let table = registry.remove(name)?.map(|t| t.value().to_string());
            match table {
                Some(table) => {
                    write_txn.delete_table(TableDefinition::<&str, &[u8]>::new(&table))?;
                    true
                }
                None => false,
            }
        };
        write_txn.commit()?;

        if dropped {
            info!(namespace = %name, "Namespace dropped");
        }
        Ok(dropped)
    }
}
