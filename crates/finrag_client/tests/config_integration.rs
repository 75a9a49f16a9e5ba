//! Integration tests for config load/save and path resolution.

use finrag_client::{config, Config};
use predicates::prelude::*;
use std::time::Duration;

#[test]
fn load_existing_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        r#"
api:
  base_url: "http://10.0.0.5:9000"
chat:
  session_id: "analyst-1"
metrics:
  refresh_interval_secs: 10
"#,
    )
    .unwrap();

    let cfg = config::load(&config_path).expect("load should succeed");
    assert_eq!(cfg.base_url(), "http://10.0.0.5:9000");
    assert_eq!(cfg.session_id(), "analyst-1");
    assert_eq!(cfg.refresh_interval(), Duration::from_secs(10));
}

#[test]
fn partial_config_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "chat:\n  session_id: s2\n").unwrap();

    let cfg = config::load(&config_path).unwrap();
    assert_eq!(cfg.base_url(), "http://127.0.0.1:8000");
    assert_eq!(cfg.session_id(), "s2");
    assert_eq!(cfg.refresh_interval(), Duration::from_secs(30));
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "api: [unclosed").unwrap();

    let err = config::load(&config_path).unwrap_err();
    assert!(matches!(err, config::ConfigError::Parse { .. }));
}

#[test]
fn save_creates_directory_and_file_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("finrag");
    let config_path = config_dir.join("config.yaml");
    assert!(!config_dir.exists(), "config dir should not exist yet");

    let mut config = Config::default();
    config.api.base_url = Some("http://localhost:8000".into());
    config.metrics.refresh_interval_secs = Some(60);

    config::save(&config_path, &config).expect("save should succeed");
    assert!(
        predicates::path::exists().eval(&config_path),
        "config file should exist after save"
    );

    let reloaded = config::load(&config_path).unwrap();
    assert_eq!(reloaded, config);
    let contents = std::fs::read_to_string(&config_path).unwrap();
    assert!(predicates::str::contains("refresh_interval_secs").eval(&contents));
    assert!(
        !predicates::str::contains("session_id").eval(&contents),
        "unset fields are not written"
    );
}

#[test]
fn resolve_with_explicit_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    let err = config::resolve(Some(&missing)).unwrap_err();
    assert!(matches!(err, config::ConfigError::Io { .. }));
}

/// Config path resolves to `~/.finrag/config.yaml` using the current platform's home dir.
/// We override the HOME env var to a temp dir to verify the resolution.
#[test]
fn default_config_path_uses_home_directory() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_str().unwrap().to_string();

    let key = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let original = std::env::var(key).ok();

    std::env::set_var(key, &home);
    let path = config::default_config_path();
    match original {
        Some(v) => std::env::set_var(key, v),
        None => std::env::remove_var(key),
    }

    let path = path.expect("should resolve a config path");
    assert_eq!(path, dir.path().join(".finrag").join("config.yaml"));
}
