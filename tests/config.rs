use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use kashtat_admin_client::{ApiClient, Config, ConfigLocation, Error, read_config};

#[test]
fn file_config_applies_defaults() {
    let cfg = serde_json::json!({
        "api_url": "https://api.kashtat.co/v2",
        "token_url": "https://api.kashtat.co/v2/auth/token",
        "admin_url": "https://app.kashtat.co/api/admin/v1"
    });
    let mut cfg_path = PathBuf::from("target");
    fs::create_dir_all(&cfg_path).ok();
    cfg_path.push("config-defaults.json");
    fs::write(&cfg_path, serde_json::to_string(&cfg).unwrap()).unwrap();

    let config = read_config(ConfigLocation::File(cfg_path.to_string_lossy().to_string()))
        .expect("config file");

    assert_eq!(config.max_refresh_retries(), 3);
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert!(config.retry_on_bare_401());
    assert!(config.store_path.is_none());
    assert!(config.user_agent().starts_with("kashtat-admin-client"));
}

#[test]
fn invalid_api_url_fails_fast() {
    let cfg = Config::from_values(
        "://not-a-valid-url",
        "https://api.kashtat.co/v2/auth/token",
        "https://app.kashtat.co/api/admin/v1",
        None,
        None,
        None,
        None,
    );

    match ApiClient::new(cfg) {
        Err(Error::Config(msg)) => assert!(msg.contains("Invalid api_url")),
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("expected invalid URL error"),
    }
}

#[test]
fn zero_timeout_is_rejected() {
    let cfg = Config::from_values(
        "https://api.kashtat.co/v2",
        "https://api.kashtat.co/v2/auth/token",
        "https://app.kashtat.co/api/admin/v1",
        None,
        None,
        Some(0),
        None,
    );

    assert!(matches!(ApiClient::new(cfg), Err(Error::Config(_))));
}
