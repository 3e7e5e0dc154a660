use pump_core::error::DeviceError;
use pump_core::mocks::MemoryUserStore;
use pump_core::store::{UserRecord, UserStore};
use pump_core::{SessionStore, password};

fn store_with_alice() -> MemoryUserStore {
    let mut users = MemoryUserStore::new();
    users
        .create(UserRecord {
            username: "alice".into(),
            password: password::hash("secret1"),
            email: "alice@example.com".into(),
            age: 34,
            weight: 61.5,
            created_at: 0,
            injection_history: Vec::new(),
        })
        .unwrap();
    users
}

fn auth_message(err: &eyre::Report) -> &str {
    match err.downcast_ref::<DeviceError>() {
        Some(DeviceError::Auth(msg)) => msg,
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[test]
fn login_round_trip() {
    let users = store_with_alice();
    let mut sessions = SessionStore::new();

    let token = sessions.login(&users, "alice", "secret1").unwrap();
    assert!(sessions.is_authenticated(&token));
    assert_eq!(sessions.current_user(&token), Some("alice"));

    sessions.logout(&token).unwrap();
    assert!(!sessions.is_authenticated(&token));
    assert_eq!(sessions.current_user(&token), None);
}

#[test]
fn failure_message_never_reveals_which_field_was_wrong() {
    let users = store_with_alice();
    let mut sessions = SessionStore::new();

    let wrong_password = sessions.login(&users, "alice", "nope").unwrap_err();
    let unknown_user = sessions.login(&users, "mallory", "secret1").unwrap_err();
    assert_eq!(auth_message(&wrong_password), "invalid credentials");
    assert_eq!(auth_message(&unknown_user), "invalid credentials");
    assert_eq!(sessions.session_count(), 0);
}

#[test]
fn logout_of_unknown_token_fails() {
    let mut sessions = SessionStore::new();
    let err = sessions.logout("no-such-token").unwrap_err();
    assert_eq!(auth_message(&err), "not authenticated");
}

#[test]
fn tokens_are_unique_across_logins() {
    let users = store_with_alice();
    let mut sessions = SessionStore::new();

    let a = sessions.login(&users, "alice", "secret1").unwrap();
    let b = sessions.login(&users, "alice", "secret1").unwrap();
    assert_ne!(a, b);
    assert!(sessions.is_authenticated(&a));
    assert!(sessions.is_authenticated(&b));
    assert_eq!(sessions.session_count(), 2);
}
