//! Configuration Loader Tests
//!
//! Environment and working-directory changes run inside `figment::Jail`,
//! which serializes jailed tests and restores both afterwards.

use figment::Jail;
use lazyboot_domain::Error;
use lazyboot_infrastructure::config::{AppConfig, ConfigLoader, WorkerKind};
use lazyboot_infrastructure::constants::{DEFAULT_CONNECTION_URL, DEFAULT_LOG_LEVEL};
use tempfile::TempDir;

#[test]
fn test_config_loader_defaults() {
    Jail::expect_with(|_jail| {
        let config = ConfigLoader::new().load().unwrap();

        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.data.connection_url, DEFAULT_CONNECTION_URL);
        assert!(config.bootstrap.prewarm.is_empty());
        Ok(())
    });
}

#[test]
fn test_explicit_config_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
                [logging]
                level = "debug"

                [bootstrap]
                prewarm = ["report", "export"]

                [data]
                connection_url = "postgres://file"
            "#,
        )?;

        let loader = ConfigLoader::new().with_config_path("custom.toml");
        let config = loader.load().unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.bootstrap.prewarm,
            [WorkerKind::Report, WorkerKind::Export]
        );
        assert_eq!(config.data.connection_url, "postgres://file");
        // Keys missing from the file keep their defaults
        assert_eq!(
            config.data.connect_delay_ms,
            AppConfig::default().data.connect_delay_ms
        );
        assert_eq!(
            loader.config_path().unwrap().to_str(),
            Some("custom.toml")
        );
        Ok(())
    });
}

#[test]
fn test_missing_explicit_file_falls_back_to_defaults() {
    Jail::expect_with(|_jail| {
        let config = ConfigLoader::new()
            .with_config_path("absent.toml")
            .load()
            .unwrap();
        assert_eq!(config, AppConfig::default());
        Ok(())
    });
}

#[test]
fn test_default_file_in_working_directory() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "lazyboot.toml",
            r#"
                [data]
                connect_delay_ms = 5
            "#,
        )?;

        assert!(ConfigLoader::find_default_config_path().is_some());
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.data.connect_delay_ms, 5);
        Ok(())
    });
}

#[test]
fn test_env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "lazyboot.toml",
            r#"
                [data]
                connection_url = "postgres://file"
            "#,
        )?;
        jail.set_env("LAZYBOOT_DATA__CONNECTION_URL", "postgres://env");
        jail.set_env("LAZYBOOT_LOGGING__JSON_FORMAT", "true");

        let config = ConfigLoader::new().load().unwrap();

        assert_eq!(config.data.connection_url, "postgres://env");
        assert!(config.logging.json_format);
        Ok(())
    });
}

#[test]
fn test_custom_env_prefix() {
    Jail::expect_with(|jail| {
        jail.set_env("LAZYBOOT_DATA__CONNECTION_URL", "postgres://ignored");
        jail.set_env("WORKER_DATA__CONNECTION_URL", "postgres://worker");

        let config = ConfigLoader::new()
            .with_env_prefix("WORKER")
            .load()
            .unwrap();

        assert_eq!(config.data.connection_url, "postgres://worker");
        Ok(())
    });
}

#[test]
fn test_validation_rejects_invalid_values() {
    Jail::expect_with(|jail| {
        jail.set_env("LAZYBOOT_DATA__CONNECTION_URL", " ");
        let error = ConfigLoader::new().load().unwrap_err();
        assert!(matches!(error, Error::Configuration { .. }));

        jail.clear_env();
        jail.set_env("LAZYBOOT_LOGGING__LEVEL", "loud");
        let error = ConfigLoader::new().load().unwrap_err();
        assert!(error.to_string().contains("Invalid log level"));
        Ok(())
    });
}

#[test]
fn test_unknown_worker_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "lazyboot.toml",
            r#"
                [bootstrap]
                prewarm = ["billing"]
            "#,
        )?;
        assert!(ConfigLoader::new().load().is_err());
        Ok(())
    });
}

#[test]
fn test_config_save_load() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("saved.toml");

    Jail::expect_with(|_jail| {
        let mut original = AppConfig::default();
        original.data.connection_url = "postgres://saved".to_string();
        original.bootstrap.prewarm = vec![WorkerKind::Report];

        let loader = ConfigLoader::new().with_config_path(&config_path);
        loader.save_to_file(&original, &config_path).unwrap();
        let loaded = loader.load().unwrap();

        assert_eq!(loaded.data.connection_url, "postgres://saved");
        assert_eq!(loaded.bootstrap.prewarm, [WorkerKind::Report]);
        Ok(())
    });
}
