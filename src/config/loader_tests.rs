//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

/// RAII guard to ensure environment variable cleanup even under test parallelism.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(name);
    fs::write(&path, contents).expect("Failed to write test config");
    path
}

#[test]
fn default_config_path_points_into_convsync_dir() {
    let path = default_config_path().expect("Should have default path");
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("convsync") && path_str.ends_with("config.toml"),
        "Path should contain 'convsync' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn default_log_path_ends_with_convsync_log() {
    let path = default_log_path();
    assert!(
        path.to_string_lossy().ends_with("convsync.log"),
        "Default log path should end with 'convsync.log', got: {:?}",
        path
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let config_path = write_temp(
        "convsync_test_config.toml",
        r#"
page_size = 5
top_threshold = 4
request_timeout_ms = 2500
latency_ms = 0
failed_sends = "retain"
auto_reply = true
log_file_path = "/tmp/convsync-test.log"
"#,
    );

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(config.page_size, Some(5));
    assert_eq!(config.top_threshold, Some(4));
    assert_eq!(config.request_timeout_ms, Some(2500));
    assert_eq!(config.latency_ms, Some(0));
    assert_eq!(config.failed_sends, Some(FailedSendPolicy::Retain));
    assert_eq!(config.auto_reply, Some(true));
    assert_eq!(
        config.log_file_path,
        Some(PathBuf::from("/tmp/convsync-test.log"))
    );

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let config_path = write_temp("convsync_test_invalid.toml", "this is not valid TOML ][}{");

    match load_config_file(&config_path) {
        Err(ConfigError::ParseError { path, reason: _ }) => assert_eq!(path, config_path),
        other => panic!("Expected ParseError, got {:?}", other),
    }

    fs::remove_file(config_path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str("theme = \"monokai\"");
    assert!(result.is_err(), "Unknown fields should be rejected");
}

#[test]
fn config_file_rejects_unknown_failed_send_policy() {
    let result: Result<ConfigFile, _> = toml::from_str("failed_sends = \"keep\"");
    assert!(result.is_err());
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_uses_defaults_for_none_fields() {
    let config_file = ConfigFile {
        latency_ms: Some(0),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(config_file));
    let defaults = ResolvedConfig::default();

    assert_eq!(resolved.latency_ms, 0);
    assert_eq!(resolved.page_size, defaults.page_size);
    assert_eq!(resolved.request_timeout_ms, defaults.request_timeout_ms);
    assert_eq!(resolved.failed_sends, defaults.failed_sends);
}

#[test]
fn merge_config_clamps_page_size_to_one() {
    let config_file = ConfigFile {
        page_size: Some(0),
        ..ConfigFile::default()
    };
    assert_eq!(merge_config(Some(config_file)).page_size, 1);
}

#[test]
fn resolved_config_default_has_expected_values() {
    let config = ResolvedConfig::default();

    assert_eq!(config.page_size, 20);
    assert_eq!(config.request_timeout_ms, 10_000);
    assert_eq!(config.failed_sends, FailedSendPolicy::Discard);
    assert!(!config.auto_reply);
}

#[test]
#[serial(convsync_env)]
fn apply_env_overrides_reads_latency_and_policy() {
    let _latency = EnvGuard::new(LATENCY_ENV);
    let _policy = EnvGuard::new(FAILED_SENDS_ENV);
    env::set_var(LATENCY_ENV, "25");
    env::set_var(FAILED_SENDS_ENV, "retain");

    let result = apply_env_overrides(ResolvedConfig::default());

    assert_eq!(result.latency_ms, 25);
    assert_eq!(result.failed_sends, FailedSendPolicy::Retain);
}

#[test]
#[serial(convsync_env)]
fn apply_env_overrides_ignores_invalid_values() {
    let _latency = EnvGuard::new(LATENCY_ENV);
    let _policy = EnvGuard::new(FAILED_SENDS_ENV);
    env::set_var(LATENCY_ENV, "soon");
    env::set_var(FAILED_SENDS_ENV, "sometimes");

    let base = ResolvedConfig::default();
    let result = apply_env_overrides(base.clone());

    assert_eq!(result, base);
}

#[test]
#[serial(convsync_env)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    let _latency = EnvGuard::new(LATENCY_ENV);
    let _policy = EnvGuard::new(FAILED_SENDS_ENV);

    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(convsync_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV);
    let explicit_path = write_temp("convsync_explicit.toml", "page_size = 3");
    let env_path = write_temp("convsync_env.toml", "page_size = 7");
    env::set_var(CONFIG_ENV, env_path.to_str().unwrap());

    let config = load_config_with_precedence(Some(explicit_path.clone()))
        .unwrap()
        .unwrap();

    assert_eq!(
        config.page_size,
        Some(3),
        "Should use explicit path, not CONVSYNC_CONFIG env var"
    );

    fs::remove_file(explicit_path).ok();
    fs::remove_file(env_path).ok();
}

#[test]
#[serial(convsync_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV);
    let env_path = write_temp("convsync_env_only.toml", "page_size = 7");
    env::set_var(CONFIG_ENV, env_path.to_str().unwrap());

    let config = load_config_with_precedence(None).unwrap().unwrap();

    assert_eq!(config.page_size, Some(7));

    fs::remove_file(env_path).ok();
}

#[test]
#[serial(convsync_config)]
fn load_config_with_precedence_missing_env_file_is_not_an_error() {
    let _guard = EnvGuard::new(CONFIG_ENV);
    env::set_var(CONFIG_ENV, "/nonexistent/convsync/config.toml");

    assert_eq!(load_config_with_precedence(None), Ok(None));
}

#[test]
fn apply_cli_overrides_only_touches_given_flags() {
    let base = ResolvedConfig::default();

    let result = apply_cli_overrides(base.clone(), Some(0), None);
    assert_eq!(result.latency_ms, 0);
    assert_eq!(result.auto_reply, base.auto_reply);

    let result = apply_cli_overrides(base.clone(), None, Some(true));
    assert!(result.auto_reply);
    assert_eq!(result.latency_ms, base.latency_ms);

    assert_eq!(apply_cli_overrides(base.clone(), None, None), base);
}

#[test]
#[serial(convsync_env)]
fn precedence_chain_file_then_env_then_cli() {
    let _latency = EnvGuard::new(LATENCY_ENV);
    let _policy = EnvGuard::new(FAILED_SENDS_ENV);
    let config_file = ConfigFile {
        latency_ms: Some(10),
        auto_reply: Some(false),
        page_size: Some(4),
        ..ConfigFile::default()
    };
    env::set_var(LATENCY_ENV, "20");

    let resolved = apply_cli_overrides(
        apply_env_overrides(merge_config(Some(config_file))),
        None,
        Some(true),
    );

    assert_eq!(resolved.page_size, 4, "file beats defaults");
    assert_eq!(resolved.latency_ms, 20, "env beats file");
    assert!(resolved.auto_reply, "CLI beats file");
}
