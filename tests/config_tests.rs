use std::path::PathBuf;
use std::time::Duration;

use market_pulse::config::Config;

fn temp_config(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "market-pulse-{}-{}.toml",
        name,
        std::process::id()
    ));
    std::fs::write(&path, body).expect("write temp config");
    path
}

#[test]
fn shipped_default_config_parses_and_validates() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
    let config = Config::from_path(&path).expect("default config should parse");
    config.validate().expect("default config should validate");
    assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
    assert_eq!(config.api.history_limit, 50);
    assert_eq!(config.poll.interval(), Duration::from_secs(5));
    assert_eq!(config.reveal.tick(), Duration::from_millis(15));
    assert_eq!(config.api.timeout(), Duration::from_secs(10));
    assert_eq!(config.api.analyze_timeout(), Duration::from_secs(120));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let path = std::env::temp_dir().join("market-pulse-does-not-exist.toml");
    let config = Config::from_path(&path).expect("defaults");
    assert_eq!(config.ui.default_symbol, "BTC-USD");
    assert_eq!(config.poll.interval_ms, 5000);
}

#[test]
fn partial_file_keeps_defaults_for_omitted_sections() {
    let path = temp_config("partial", "[poll]\ninterval_ms = 2000\n");
    let config = Config::from_path(&path).expect("partial config");
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.poll.interval(), Duration::from_secs(2));
    assert_eq!(config.api.history_limit, 50);
    assert_eq!(config.reveal.tick_ms, 15);
}

#[test]
fn malformed_file_is_an_error() {
    let path = temp_config("malformed", "[poll\ninterval_ms = ");
    let result = Config::from_path(&path);
    let _ = std::fs::remove_file(&path);
    assert!(result.is_err());
}

#[test]
fn validate_rejects_zero_interval() {
    let path = temp_config("zero", "[poll]\ninterval_ms = 0\n");
    let config = Config::from_path(&path).expect("parses");
    let _ = std::fs::remove_file(&path);
    assert!(config.validate().is_err());
}
