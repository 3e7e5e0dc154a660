use pump_core::error::DeviceError;
use pump_core::store::{HistoryEntry, JsonUserStore, UserRecord, UserStore};
use tempfile::tempdir;

fn record(username: &str) -> UserRecord {
    UserRecord {
        username: username.into(),
        password: "salt$digest".into(),
        email: format!("{username}@example.com"),
        age: 40,
        weight: 72.0,
        created_at: 1_700_000_000,
        injection_history: Vec::new(),
    }
}

fn entry() -> HistoryEntry {
    HistoryEntry {
        timestamp: 1_700_000_100,
        glucose: 210,
        dose: 2.0,
        duration: 20.0,
    }
}

#[test]
fn missing_file_is_an_empty_store() {
    let dir = tempdir().unwrap();
    let store = JsonUserStore::new(dir.path().join("users.json"));
    assert!(store.load("alice").unwrap().is_none());
}

#[test]
fn create_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let mut store = JsonUserStore::new(dir.path().join("users.json"));

    store.create(record("alice")).unwrap();
    let loaded = store.load("alice").unwrap().expect("record exists");
    assert_eq!(loaded.email, "alice@example.com");
    assert_eq!(loaded.age, 40);
    assert!(loaded.injection_history.is_empty());
}

#[test]
fn duplicate_username_is_a_validation_error() {
    let dir = tempdir().unwrap();
    let mut store = JsonUserStore::new(dir.path().join("users.json"));

    store.create(record("alice")).unwrap();
    let err = store.create(record("alice")).unwrap_err();
    match err.downcast_ref::<DeviceError>() {
        Some(DeviceError::Validation(msg)) => assert_eq!(msg, "username already taken"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn history_appends_in_order_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.json");
    let mut store = JsonUserStore::new(&path);

    store.create(record("alice")).unwrap();
    store.append_history("alice", entry()).unwrap();
    let mut second = entry();
    second.timestamp += 60;
    second.dose = 0.5;
    store.append_history("alice", second.clone()).unwrap();

    // A fresh handle sees both entries, in append order.
    let reopened = JsonUserStore::new(&path);
    let loaded = reopened.load("alice").unwrap().expect("record exists");
    assert_eq!(loaded.injection_history.len(), 2);
    assert_eq!(loaded.injection_history[0], entry());
    assert_eq!(loaded.injection_history[1], second);
}

#[test]
fn history_for_unknown_user_is_a_storage_error() {
    let dir = tempdir().unwrap();
    let mut store = JsonUserStore::new(dir.path().join("users.json"));
    let err = store.append_history("ghost", entry()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeviceError>(),
        Some(DeviceError::Storage(_))
    ));
}

#[test]
fn unreadable_document_surfaces_as_storage_error_not_empty() {
    // A corrupt store must never masquerade as "no users".
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    let store = JsonUserStore::new(&path);
    let err = store.load("alice").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeviceError>(),
        Some(DeviceError::Storage(_))
    ));
}

#[test]
fn records_missing_history_field_deserialize_with_empty_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(
        &path,
        r#"{"bob":{"username":"bob","password":"s$d","email":"b@x","age":50,"weight":80.0,"created_at":0}}"#,
    )
    .unwrap();

    let store = JsonUserStore::new(&path);
    let loaded = store.load("bob").unwrap().expect("record exists");
    assert!(loaded.injection_history.is_empty());
}
