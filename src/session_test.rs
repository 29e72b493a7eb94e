use super::*;

fn temp_session_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("watchparty-test-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn anonymous_has_no_fields() {
    let s = Session::anonymous();
    assert_eq!(s.token(), None);
    assert_eq!(s.username(), None);
    assert!(!s.is_signed_in());
}

#[test]
fn signed_in_exposes_both_fields() {
    let s = Session::signed_in("abc", "alice");
    assert_eq!(s.token(), Some("abc"));
    assert_eq!(s.username(), Some("alice"));
    assert!(s.is_signed_in());
}

#[test]
fn signed_in_with_empty_token_is_anonymous() {
    assert_eq!(Session::signed_in("", "alice"), Session::anonymous());
}

#[test]
fn serializes_as_two_slots() {
    let json = serde_json::to_value(Session::signed_in("abc", "alice")).unwrap();
    assert_eq!(json, serde_json::json!({ "token": "abc", "username": "alice" }));

    let json = serde_json::to_value(Session::anonymous()).unwrap();
    assert_eq!(json, serde_json::json!({ "token": null, "username": null }));
}

#[test]
fn partial_record_deserializes_as_anonymous() {
    let s: Session = serde_json::from_str(r#"{ "token": "abc" }"#).unwrap();
    assert_eq!(s, Session::anonymous());

    let s: Session = serde_json::from_str(r#"{ "token": null, "username": "alice" }"#).unwrap();
    assert_eq!(s, Session::anonymous());
}

// =============================================================================
// MemorySessionStore
// =============================================================================

#[test]
fn memory_store_write_then_clear() {
    let store = MemorySessionStore::new();
    assert_eq!(store.read(), Session::anonymous());

    store.write("abc", "alice").unwrap();
    assert_eq!(store.read(), Session::signed_in("abc", "alice"));

    store.clear().unwrap();
    assert_eq!(store.read(), Session::anonymous());
}

#[test]
fn memory_store_rejects_empty_token() {
    let store = MemorySessionStore::with_session(Session::signed_in("abc", "alice"));
    let err = store.write("", "bob").unwrap_err();
    assert!(matches!(err, SessionError::EmptyToken));
    assert_eq!(store.read().token(), Some("abc"));
}

// =============================================================================
// FileSessionStore
// =============================================================================

#[test]
fn file_store_missing_file_is_anonymous() {
    let path = temp_session_path();
    let store = FileSessionStore::open(&path).unwrap();
    assert_eq!(store.read(), Session::anonymous());
    assert!(!path.exists());
}

#[test]
fn file_store_survives_reopen() {
    let path = temp_session_path();
    {
        let store = FileSessionStore::open(&path).unwrap();
        store.write("abc", "alice").unwrap();
    }
    let reopened = FileSessionStore::open(&path).unwrap();
    assert_eq!(reopened.read(), Session::signed_in("abc", "alice"));
    assert_eq!(reopened.path(), path.as_path());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_clear_survives_reopen() {
    let path = temp_session_path();
    let store = FileSessionStore::open(&path).unwrap();
    store.write("abc", "alice").unwrap();
    store.clear().unwrap();
    assert_eq!(store.read(), Session::anonymous());

    let reopened = FileSessionStore::open(&path).unwrap();
    assert_eq!(reopened.read(), Session::anonymous());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_leaves_no_temp_file() {
    let path = temp_session_path();
    let store = FileSessionStore::open(&path).unwrap();
    store.write("abc", "alice").unwrap();
    assert!(path.exists());
    assert!(!temp_path(&path).exists());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_corrupt_file_is_anonymous() {
    let path = temp_session_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "not json").unwrap();

    let store = FileSessionStore::open(&path).unwrap();
    assert_eq!(store.read(), Session::anonymous());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_partial_file_is_anonymous() {
    let path = temp_session_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{ "token": "abc", "username": null }"#).unwrap();

    let store = FileSessionStore::open(&path).unwrap();
    assert_eq!(store.read(), Session::anonymous());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_failed_write_keeps_cached_session() {
    // A directory in place of the temp file makes the write fail.
    let path = temp_session_path();
    let store = FileSessionStore::open(&path).unwrap();
    store.write("abc", "alice").unwrap();
    std::fs::create_dir_all(temp_path(&path)).unwrap();

    let err = store.write("def", "bob").unwrap_err();
    assert!(matches!(err, SessionError::Io { .. }));
    assert_eq!(store.read(), Session::signed_in("abc", "alice"));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn temp_path_appends_suffix() {
    assert_eq!(temp_path(Path::new("/a/session.json")), PathBuf::from("/a/session.json.tmp"));
}
