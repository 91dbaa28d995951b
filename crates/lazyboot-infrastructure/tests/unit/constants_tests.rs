//! Constants Tests

use lazyboot_infrastructure::config::AppConfig;
use lazyboot_infrastructure::constants::*;
use lazyboot_infrastructure::logging::parse_log_level;

#[test]
fn test_config_constants() {
    assert_eq!(DEFAULT_CONFIG_FILENAME, "lazyboot.toml");
    assert_eq!(CONFIG_ENV_PREFIX, "LAZYBOOT");
    assert_eq!(CONFIG_ENV_SEPARATOR, "__");
}

#[test]
fn test_default_log_level_is_valid() {
    assert!(parse_log_level(DEFAULT_LOG_LEVEL).is_ok());
}

#[test]
fn test_defaults_flow_into_app_config() {
    let config = AppConfig::default();
    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
    assert_eq!(config.data.connection_url, DEFAULT_CONNECTION_URL);
    assert_eq!(config.data.connect_delay_ms, DEFAULT_CONNECT_DELAY_MS);
    assert_eq!(
        config.bootstrap.worker_init_delay_ms,
        DEFAULT_WORKER_INIT_DELAY_MS
    );
    assert!(config.bootstrap.prewarm.is_empty());
}
