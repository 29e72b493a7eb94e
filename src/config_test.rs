use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn from_lookup_uses_defaults_when_unset() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.api_base_url, DEFAULT_API_URL);
    assert_eq!(cfg.session_path, PathBuf::from(DEFAULT_SESSION_FILE));
    assert_eq!(cfg.timeouts, VerifyTimeouts::default());
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("WATCHPARTY_API_URL", "https://party.example.test/"),
        ("WATCHPARTY_SESSION_FILE", "/tmp/wp/session.json"),
        ("WATCHPARTY_VERIFY_TIMEOUT_SECS", "3"),
        ("WATCHPARTY_CONNECT_TIMEOUT_SECS", " 1 "),
    ]))
    .unwrap();
    assert_eq!(cfg.api_base_url, "https://party.example.test");
    assert_eq!(cfg.session_path, PathBuf::from("/tmp/wp/session.json"));
    assert_eq!(cfg.timeouts, VerifyTimeouts { request_secs: 3, connect_secs: 1 });
}

#[test]
fn from_lookup_blank_session_file_falls_back_to_default() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("WATCHPARTY_SESSION_FILE", "   ")])).unwrap();
    assert_eq!(cfg.session_path, PathBuf::from(DEFAULT_SESSION_FILE));
}

#[test]
fn from_lookup_rejects_bad_timeout() {
    let err = ClientConfig::from_lookup(lookup_from(&[("WATCHPARTY_VERIFY_TIMEOUT_SECS", "soon")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidNumber { key: "WATCHPARTY_VERIFY_TIMEOUT_SECS", value: "soon".to_owned() }
    );
}

#[test]
fn from_lookup_rejects_schemeless_url() {
    let err = ClientConfig::from_lookup(lookup_from(&[("WATCHPARTY_API_URL", "localhost:5000")])).unwrap_err();
    assert!(err.to_string().contains("localhost:5000"));
}

#[test]
fn normalize_base_url_strips_trailing_slashes() {
    assert_eq!(normalize_base_url("http://a.test//").unwrap(), "http://a.test");
}

#[test]
fn normalize_base_url_requires_host() {
    assert!(normalize_base_url("https://").is_err());
    assert!(normalize_base_url("").is_err());
}

#[test]
fn timeouts_convert_to_durations() {
    let t = VerifyTimeouts { request_secs: 7, connect_secs: 2 };
    assert_eq!(t.request(), Duration::from_secs(7));
    assert_eq!(t.connect(), Duration::from_secs(2));
}
