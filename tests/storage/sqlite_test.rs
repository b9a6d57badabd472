//! SQLite key-value backend coverage.

use std::sync::Arc;

use eventmanager::events::store::{EventStore, KvEventStore};
use eventmanager::events::EventRecord;
use eventmanager::storage::sqlite::SqliteStore;
use eventmanager::storage::{load_json, save_json, KeyValueStore};

async fn open(dir: &tempfile::TempDir) -> SqliteStore {
    let path = dir.path().join("nested").join("eventmanager.db");
    match SqliteStore::open(&path).await {
        Ok(store) => store,
        Err(err) => panic!("store should open: {err:#}"),
    }
}

#[tokio::test]
async fn open_creates_parent_directories() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = open(&dir).await;
    assert!(dir.path().join("nested").join("eventmanager.db").exists());
    store.close().await;
}

#[tokio::test]
async fn get_set_remove_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = open(&dir).await;

    assert_eq!(store.get("missing").await.expect("get"), None);
    assert!(store.set("k", "v1").await.is_ok());
    assert!(store.set("k", "v2").await.is_ok());
    assert_eq!(store.get("k").await.expect("get").as_deref(), Some("v2"));
    assert!(store.remove("k").await.is_ok());
    assert_eq!(store.get("k").await.expect("get"), None);
    store.close().await;
}

#[tokio::test]
async fn json_helpers_default_when_absent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = open(&dir).await;

    let empty: Vec<String> = load_json(&store, "list").await.expect("load");
    assert!(empty.is_empty());

    let values = vec!["a".to_owned(), "b".to_owned()];
    assert!(save_json(&store, "list", &values).await.is_ok());
    let loaded: Vec<String> = load_json(&store, "list").await.expect("load");
    assert_eq!(loaded, values);
    store.close().await;
}

#[tokio::test]
async fn events_survive_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let record = EventRecord {
        name: "Tech Conf".to_owned(),
        id: "TECH-01".to_owned(),
        timezone: "UTC".to_owned(),
        date: "2023-12-15 14:30".to_owned(),
        location: "Main Hall".to_owned(),
        description: "A gathering of engineers".to_owned(),
    };

    {
        let kv: Arc<dyn KeyValueStore> = Arc::new(open(&dir).await);
        let events = KvEventStore::new(kv);
        assert!(events.save(&record).await.is_ok());
    }

    let reopened = Arc::new(open(&dir).await);
    let events = KvEventStore::new(reopened.clone());
    let all = events.all().await.expect("all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].record, record);
    reopened.close().await;
}
