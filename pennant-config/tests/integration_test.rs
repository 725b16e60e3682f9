//! Integration tests for pennant-config

use pennant_config::*;
use std::env;
use std::io::Write;

#[test]
fn test_env_layer() {
    unsafe {
        env::set_var("PNTEST_ENV_SWITCH_DEFAULT", "true");
        env::set_var("PNTEST_ENV_CACHE_TTL", "120");
        env::set_var("PNTEST_ENV_UNRELATED", "ignored");
    }

    let resolver = SettingsBuilder::new()
        .with_prefix("PNTEST_ENV")
        .load_env()
        .build()
        .unwrap();

    assert!(resolver.switch_default());
    assert_eq!(resolver.read(|s| s.cache_ttl), 120);

    unsafe {
        env::remove_var("PNTEST_ENV_SWITCH_DEFAULT");
        env::remove_var("PNTEST_ENV_CACHE_TTL");
        env::remove_var("PNTEST_ENV_UNRELATED");
    }
}

#[test]
fn test_env_layer_rejects_malformed_value() {
    unsafe {
        env::set_var("PNTEST_BAD_FLAG_DEFAULT", "sometimes");
    }

    let result = SettingsBuilder::new()
        .with_prefix("PNTEST_BAD")
        .load_env()
        .build();
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));

    unsafe {
        env::remove_var("PNTEST_BAD_FLAG_DEFAULT");
    }
}

#[test]
fn test_env_loader_with_prefix() {
    unsafe {
        env::set_var("PNTEST_LOADER_COOKIE", "rollout_%s");
    }

    let loader = EnvLoader::new("PNTEST_LOADER");
    assert_eq!(loader.load_var("cookie").unwrap(), "rollout_%s");
    assert_eq!(loader.load().unwrap().get("COOKIE").unwrap(), "rollout_%s");

    unsafe {
        env::remove_var("PNTEST_LOADER_COOKIE");
    }
}

#[test]
fn test_file_layers_apply_in_order() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("pennant.toml");
    let mut toml_file = std::fs::File::create(&toml_path).unwrap();
    writeln!(toml_file, "FLAG_DEFAULT = true\nCACHE_PREFIX = \"app:\"\nUNKNOWN = 1").unwrap();

    let json_path = dir.path().join("pennant.json");
    std::fs::write(&json_path, r#"{"flag_default": false, "override": true}"#).unwrap();

    let resolver = SettingsBuilder::new()
        .add_file(toml_path.to_str().unwrap(), FileFormat::Toml)
        .add_file(json_path.to_str().unwrap(), FileFormat::Json)
        .build()
        .unwrap();

    let settings = resolver.snapshot();
    assert!(!settings.flag_default);
    assert!(settings.override_enabled);
    assert_eq!(settings.flag_key("beta"), "app:flag:beta");
}

#[test]
fn test_missing_file_is_load_error() {
    let result = SettingsBuilder::new()
        .add_file("/nonexistent/pennant.toml", FileFormat::Toml)
        .build();
    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::UnknownSetting("COLOR".to_string());
    assert!(err.to_string().contains("COLOR"));
}
