//! Integration tests for the namespace store on an on-disk database.

mod common;

use common::db_path;
use serde::{Deserialize, Serialize};
use seshet::db;
use seshet::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Reminder {
    nick: String,
    text: String,
    due: i64,
    repeat: Option<u32>,
}

fn open(dir: &std::path::Path) -> Store {
    let db = db::open(db_path(dir).to_str().unwrap()).expect("Failed to open database");
    Store::new(db).expect("Failed to open store")
}

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let reminder = Reminder {
        nick: "alice".into(),
        text: "stand-up".into(),
        due: 1_436_875_200,
        repeat: Some(7),
    };

    {
        let store = open(dir.path());
        let ns = store.namespace("remind").unwrap();
        ns.set("alice", &reminder).unwrap();
        ns.set("count", &1_u32).unwrap();
        store.bot().set("topic", "welcome").unwrap();
    }

    let store = open(dir.path());
    let ns = store.namespace("remind").unwrap();
    assert_eq!(ns.get::<Reminder>("alice").unwrap(), Some(reminder));
    assert_eq!(ns.get::<u32>("count").unwrap(), Some(1));
    assert_eq!(
        store.bot().get::<String>("topic").unwrap().as_deref(),
        Some("welcome")
    );
    assert_eq!(store.namespaces().unwrap(), vec!["bot", "remind"]);
}

#[test]
fn test_same_key_in_two_namespaces() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    let karma = store.namespace("karma").unwrap();
    let seen = store.namespace("seen").unwrap();

    karma.set("k", &10).unwrap();
    seen.set("k", "yesterday").unwrap();

    assert_eq!(karma.get::<i32>("k").unwrap(), Some(10));
    assert_eq!(seen.get::<String>("k").unwrap().as_deref(), Some("yesterday"));

    karma.delete("k").unwrap();
    assert_eq!(karma.get::<i32>("k").unwrap(), None);
    assert!(seen.contains_key("k").unwrap());
}

#[test]
fn test_absent_marker_deletes_row() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    let ns = store.namespace("karma").unwrap();

    ns.set("alice", &Some(3)).unwrap();
    ns.set("alice", &Option::<i32>::None).unwrap();
    assert_eq!(ns.get::<i32>("alice").unwrap(), None);
    assert!(ns.keys().unwrap().is_empty());
    assert!(ns.is_materialized().unwrap());
}

#[test]
fn test_handles_share_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    let first = store.namespace("karma").unwrap();
    let second = store.namespace("karma").unwrap();

    first.set("alice", &1).unwrap();
    assert_eq!(second.get::<i32>("alice").unwrap(), Some(1));
    assert_eq!(second.name(), "karma");
}

#[test]
fn test_reserved_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    for name in ["bot", "namespaces", "event_log"] {
        assert!(matches!(
            store.namespace(name),
            Err(StoreError::ReservedName(n)) if n == name
        ));
    }
}
