//! Per-module namespace handles.

use super::{REGISTRY, StoreError};
use redb::{
    Database, ReadOnlyTable, ReadTransaction, ReadableDatabase, ReadableTable, Table,
    TableDefinition, TableError,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

fn row_table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

/// Access to one namespace of the store.
///
/// Reads against a namespace that has never been written return absent
/// values. The first write materializes it.
#[derive(Clone)]
pub struct NamespaceHandle {
    db: Arc<Database>,
    name: String,
}

impl std::fmt::Debug for NamespaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceHandle")
            .field("name", &self.name)
            .finish()
    }
}

impl NamespaceHandle {
    pub(super) fn new(db: Arc<Database>, name: &str) -> Self {
        Self {
            db,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_materialized(&self) -> Result<bool, StoreError> {
        let read_txn = self.db.begin_read()?;
        Ok(lookup(&read_txn, &self.name)?.is_some())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let found = self.read(|table| Ok(table.get(key)?.map(|v| v.value().to_vec())))?;
        match found.flatten() {
            Some(bytes) => decode(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Store `value` under `key`. A value that serializes to `null` deletes
    /// the key.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        match encode(key, value)? {
            Some(bytes) => {
                self.write(true, |table| {
                    table.insert(key, bytes.as_slice())?;
                    Ok(())
                })?;
                debug!(namespace = %self.name, key = %key, "Key stored");
            }
            None => {
                self.delete(key)?;
            }
        }
        Ok(())
    }

    /// Remove `key`. Returns whether it was present.
    pub fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let removed = self.write(false, |table| Ok(table.remove(key)?.is_some()))?;
        Ok(removed.unwrap_or(false))
    }

    pub fn contains_key(&self, key: &str) -> Result<bool, StoreError> {
        let found = self.read(|table| Ok(table.get(key)?.is_some()))?;
        Ok(found.unwrap_or(false))
    }

    /// Every key, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.rows()?.into_iter().map(|(key, _)| key).collect())
    }

    /// Every value, in key order.
    pub fn values<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        self.rows()?
            .into_iter()
            .map(|(key, bytes)| decode(&key, &bytes))
            .collect()
    }

    /// Every `(key, value)` pair, in key order.
    pub fn items<T: DeserializeOwned>(&self) -> Result<Vec<(String, T)>, StoreError> {
        self.rows()?
            .into_iter()
            .map(|(key, bytes)| decode(&key, &bytes).map(|value| (key, value)))
            .collect()
    }

    /// Remove `key` and return its value.
    pub fn pop<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let removed = self.write(false, |table| {
            let bytes = table.remove(key)?.map(|v| v.value().to_vec());
            match bytes {
                Some(bytes) => decode(key, &bytes).map(Some),
                None => Ok(None),
            }
        })?;
        Ok(removed.flatten())
    }

    /// The value under `key`, storing `default` first if it is absent.
    pub fn get_or_insert<T>(&self, key: &str, default: T) -> Result<T, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let Some(bytes) = encode(key, &default)? else {
            return Ok(self.get(key)?.unwrap_or(default));
        };

        let stored = self.write(true, |table| {
            let existing = table.get(key)?.map(|v| v.value().to_vec());
            match existing {
                Some(existing) => decode(key, &existing).map(Some),
                None => {
                    table.insert(key, bytes.as_slice())?;
                    Ok(None)
                }
            }
        })?;
        Ok(stored.flatten().unwrap_or(default))
    }

    /// Store every pair in one transaction. `null` values delete their key.
    pub fn extend<I, K, T>(&self, items: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
        T: Serialize,
    {
        let mut rows = Vec::new();
        for (key, value) in items {
            let key = key.as_ref().to_string();
            let bytes = encode(&key, &value)?;
            rows.push((key, bytes));
        }
        if rows.is_empty() {
            return Ok(());
        }

        let materialize = rows.iter().any(|(_, bytes)| bytes.is_some());
        self.write(materialize, |table| {
            for (key, bytes) in &rows {
                match bytes {
                    Some(bytes) => {
                        table.insert(key.as_str(), bytes.as_slice())?;
                    }
                    None => {
                        table.remove(key.as_str())?;
                    }
                }
            }
            Ok(())
        })?;
        Ok(())
    }

    /// Remove every key. The namespace stays materialized.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let removed = self.write(false, |table| {
            let keys: Vec<String> = table
                .iter()?
                .map(|item| item.map(|(key, _)| key.value().to_string()))
                .collect::<Result<_, _>>()?;
            for key in &keys {
                table.remove(key.as_str())?;
            }
            Ok(keys.len())
        })?;
        Ok(removed.unwrap_or(0))
    }

    fn rows(&self) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let rows = self.read(|table| {
            let mut rows = Vec::new();
            for item in table.iter()? {
                let (key, value) = item?;
                rows.push((key.value().to_string(), value.value().to_vec()));
            }
            Ok(rows)
        })?;
        Ok(rows.unwrap_or_default())
    }

    /// Run `f` against the backing table, or return `None` if the namespace
    /// is not materialized.
    fn read<R>(
        &self,
        f: impl FnOnce(&ReadOnlyTable<&'static str, &'static [u8]>) -> Result<R, StoreError>,
    ) -> Result<Option<R>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let Some(table_name) = lookup(&read_txn, &self.name)? else {
            return Ok(None);
        };
        let table = match read_txn.open_table(row_table(&table_name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        f(&table).map(Some)
    }

    /// Run `f` against the backing table in a write transaction and commit.
    ///
    /// With `materialize`, a missing namespace is registered and its table
    /// created in the same transaction; otherwise `None` is returned and
    /// nothing is written. An error from `f` discards the transaction.
    fn write<R>(
        &self,
        materialize: bool,
        f: impl FnOnce(&mut Table<'_, &'static str, &'static [u8]>) -> Result<R, StoreError>,
    ) -> Result<Option<R>, StoreError> {
        let write_txn = self.db.begin_write()?;

        let target = {
            let mut registry = write_txn.open_table(REGISTRY)?;
            let existing = registry
                .get(self.name.as_str())?
                .map(|v| v.value().to_string());
            match existing {
                Some(table_name) => Some((table_name, false)),
                None if materialize => {
                    let table_name = backing_table_name(&self.name);
                    registry.insert(self.name.as_str(), table_name.as_str())?;
                    Some((table_name, true))
                }
                None => None,
            }
        };
        let Some((table_name, created)) = target else {
            write_txn.abort()?;
            return Ok(None);
        };

        let result = {
            let mut table = write_txn.open_table(row_table(&table_name))?;
            f(&mut table)?
        };
        write_txn.commit()?;

        if created {
            info!(namespace = %self.name, table = %table_name, "Namespace materialized");
        }
        Ok(Some(result))
    }
}

fn lookup(read_txn: &ReadTransaction, name: &str) -> Result<Option<String>, StoreError> {
    let registry = match read_txn.open_table(REGISTRY) {
        Ok(registry) => registry,
        Err(TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(registry.get(name)?.map(|v| v.value().to_string()))
}

fn backing_table_name(namespace: &str) -> String {
    format!("ns_{}_{}", namespace, Uuid::new_v4().simple())
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Option<Vec<u8>>, StoreError> {
    let value = serde_json::to_value(value).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    if value.is_null() {
        return Ok(None);
    }
    serde_json::to_vec(&value)
        .map(Some)
        .map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Deserialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::Store;
    use super::*;
    use crate::db;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Quote {
        author: String,
        text: String,
        tags: Vec<String>,
    }

    fn store() -> Store {
        Store::new(db::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn test_reads_before_first_write_are_absent() {
        let ns = store().namespace("karma").unwrap();
        assert_eq!(ns.get::<i64>("alice").unwrap(), None);
        assert!(!ns.contains_key("alice").unwrap());
        assert!(ns.keys().unwrap().is_empty());
        assert!(ns.items::<i64>().unwrap().is_empty());
        assert!(!ns.delete("alice").unwrap());
        assert_eq!(ns.pop::<i64>("alice").unwrap(), None);
        assert_eq!(ns.clear().unwrap(), 0);
        assert!(!ns.is_materialized().unwrap());
    }

    #[test]
    fn test_round_trip_structured_values() {
        let ns = store().namespace("misc").unwrap();
        let quote = Quote {
            author: "alice".into(),
            text: "hello".into(),
            tags: vec!["greeting".into()],
        };

        ns.set("s", "text").unwrap();
        ns.set("n", &42_i64).unwrap();
        ns.set("q", &quote).unwrap();

        assert_eq!(ns.get::<String>("s").unwrap().as_deref(), Some("text"));
        assert_eq!(ns.get::<i64>("n").unwrap(), Some(42));
        assert_eq!(ns.get::<Quote>("q").unwrap(), Some(quote));
        assert!(ns.is_materialized().unwrap());
    }

    #[test]
    fn test_setting_none_deletes() {
        let ns = store().namespace("misc").unwrap();
        ns.set("k", &Some(1)).unwrap();
        ns.set("k", &None::<i32>).unwrap();
        assert_eq!(ns.get::<i32>("k").unwrap(), None);
        assert!(!ns.contains_key("k").unwrap());
    }

    #[test]
    fn test_setting_none_does_not_materialize() {
        let ns = store().namespace("misc").unwrap();
        ns.set("k", &None::<String>).unwrap();
        assert!(!ns.is_materialized().unwrap());
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let store = store();
        let a = store.namespace("a").unwrap();
        let b = store.namespace("b").unwrap();
        a.set("k", &1).unwrap();
        b.set("k", &2).unwrap();
        assert_eq!(a.get::<i32>("k").unwrap(), Some(1));
        assert_eq!(b.get::<i32>("k").unwrap(), Some(2));
        assert_eq!(store.bot().get::<i32>("k").unwrap(), None);
    }

    #[test]
    fn test_enumeration_is_key_ordered() {
        let ns = store().namespace("karma").unwrap();
        ns.extend([("carol", 3), ("alice", 1), ("bob", 2)]).unwrap();
        assert_eq!(ns.keys().unwrap(), vec!["alice", "bob", "carol"]);
        assert_eq!(ns.values::<i32>().unwrap(), vec![1, 2, 3]);
        let items: BTreeMap<String, i32> = ns.items().unwrap().into_iter().collect();
        assert_eq!(items["bob"], 2);
    }

    #[test]
    fn test_pop_removes() {
        let ns = store().namespace("karma").unwrap();
        ns.set("alice", &5).unwrap();
        assert_eq!(ns.pop::<i32>("alice").unwrap(), Some(5));
        assert_eq!(ns.pop::<i32>("alice").unwrap(), None);
    }

    #[test]
    fn test_get_or_insert() {
        let ns = store().namespace("karma").unwrap();
        assert_eq!(ns.get_or_insert("alice", 1).unwrap(), 1);
        assert_eq!(ns.get_or_insert("alice", 9).unwrap(), 1);
        assert_eq!(ns.get::<i32>("alice").unwrap(), Some(1));
    }

    #[test]
    fn test_extend_with_nulls_deletes() {
        let ns = store().namespace("karma").unwrap();
        ns.extend([("alice", Some(1)), ("bob", Some(2))]).unwrap();
        ns.extend([("alice", None), ("carol", Some(3))]).unwrap();
        assert_eq!(ns.keys().unwrap(), vec!["bob", "carol"]);
    }

    #[test]
    fn test_clear_keeps_namespace() {
        let ns = store().namespace("karma").unwrap();
        ns.extend([("a", 1), ("b", 2)]).unwrap();
        assert_eq!(ns.clear().unwrap(), 2);
        assert!(ns.keys().unwrap().is_empty());
        assert!(ns.is_materialized().unwrap());
    }

    #[test]
    fn test_type_mismatch_is_deserialization_error() {
        let ns = store().namespace("karma").unwrap();
        ns.set("alice", "not a number").unwrap();
        let err = ns.get::<i64>("alice").unwrap_err();
        assert!(matches!(err, StoreError::Deserialization { key, .. } if key == "alice"));
    }

    #[test]
    fn test_unserializable_value_is_rejected() {
        let ns = store().namespace("karma").unwrap();
        let mut bad = BTreeMap::new();
        bad.insert(vec![1_u8], 1);
        let err = ns.set("bad", &bad).unwrap_err();
        assert!(matches!(err, StoreError::Serialization { .. }));
        assert!(!ns.is_materialized().unwrap());
    }
}
