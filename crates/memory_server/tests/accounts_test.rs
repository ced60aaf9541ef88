//! Tests for account registration and login.

use std::sync::Arc;

use argon2::Params;
use memory_server::{AccountError, AccountGate, Argon2Hasher, CredentialHasher, EventStore};
use tempfile::NamedTempFile;

/// Cheap parameters so tests stay fast.
fn test_hasher() -> Argon2Hasher {
    Argon2Hasher::new(Params::new(1024, 1, 1, None).expect("valid params"))
}

fn setup_gate() -> (NamedTempFile, AccountGate) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = EventStore::open(db_path).expect("Failed to open store");
    (db_file, AccountGate::new(store, Arc::new(test_hasher())))
}

#[test]
fn test_hasher_round_trip() {
    let hasher = test_hasher();
    let digest = hasher.hash("pw1").expect("hash");
    assert!(digest.starts_with("$argon2id$"));
    assert!(hasher.verify("pw1", &digest));
    assert!(!hasher.verify("pw2", &digest));
    assert!(!hasher.verify("pw1", "not-a-digest"));
}

#[test]
fn test_register_then_login() {
    let (_db, gate) = setup_gate();
    let user = gate.register("a@x.com", "pw1").expect("Register failed");
    assert_ne!(user.password_digest(), "pw1");

    let logged_in = gate.login("a@x.com", "pw1").expect("Login failed");
    assert_eq!(logged_in.id(), user.id());
}

#[test]
fn test_duplicate_register_conflicts() {
    let (_db, gate) = setup_gate();
    gate.register("a@x.com", "pw1").expect("Register failed");
    let result = gate.register("a@x.com", "other");
    assert!(matches!(result, Err(AccountError::Conflict(_))));
}

#[test]
fn test_wrong_password_and_unknown_email() {
    let (_db, gate) = setup_gate();
    gate.register("a@x.com", "pw1").expect("Register failed");

    assert!(matches!(
        gate.login("a@x.com", "nope"),
        Err(AccountError::InvalidCredentials)
    ));
    assert!(matches!(
        gate.login("b@x.com", "pw1"),
        Err(AccountError::InvalidCredentials)
    ));
}

#[test]
fn test_blank_fields_fail_validation() {
    let (_db, gate) = setup_gate();
    assert!(matches!(
        gate.register("   ", "pw1"),
        Err(AccountError::Validation(_))
    ));
    assert!(matches!(
        gate.login("a@x.com", ""),
        Err(AccountError::Validation(_))
    ));
}
