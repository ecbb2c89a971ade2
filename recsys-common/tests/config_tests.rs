//! Config file resolution and loading
//!
//! Tests that set RECSYS_CONFIG are #[serial] to avoid environment races.

use recsys_common::config::{ConfigLocation, ConfigResolver, TomlConfig, CONFIG_ENV_VAR};
use recsys_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_cli_path_takes_priority_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/recsys-from-env.toml");

    let resolver = ConfigResolver::new(Some(PathBuf::from("/tmp/recsys-from-cli.toml")));
    assert_eq!(
        resolver.locate(),
        ConfigLocation::Explicit(PathBuf::from("/tmp/recsys-from-cli.toml"))
    );

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_path() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/recsys-from-env.toml");

    let resolver = ConfigResolver::new(None);
    assert_eq!(
        resolver.locate(),
        ConfigLocation::Explicit(PathBuf::from("/tmp/recsys-from-env.toml"))
    );

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_no_overrides_points_at_default_location() {
    env::remove_var(CONFIG_ENV_VAR);

    match ConfigResolver::new(None).locate() {
        ConfigLocation::Default(path) => {
            assert!(path.ends_with("recsys/config.toml"), "{:?}", path)
        }
        ConfigLocation::Unavailable => {}
        other => panic!("Unexpected location: {:?}", other),
    }
}

#[test]
fn test_load_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        source_database = "/data/vish.db"

        [clustering]
        loose = 8.0
        tight = 3.0
        top_subjects = 7

        [ranking]
        concurrency = 2
        "#,
    );

    let config = ConfigResolver::new(Some(path))
        .with_env_var("RECSYS_CONFIG_UNUSED_IN_TEST")
        .load()
        .unwrap();

    assert_eq!(config.source_database, PathBuf::from("/data/vish.db"));
    assert_eq!(config.clustering.loose, 8.0);
    assert_eq!(config.clustering.tight, 3.0);
    assert_eq!(config.clustering.top_subjects, 7);
    assert_eq!(config.ranking.concurrency, 2);
    assert_eq!(config.recsys_database, TomlConfig::default().recsys_database);
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let resolver = ConfigResolver::new(Some(dir.path().join("absent.toml")));

    assert!(matches!(resolver.load(), Err(Error::Config(_))));
}

#[test]
fn test_inverted_thresholds_fail_at_load() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[clustering]\nloose = 2.0\ntight = 6.0\n");

    let result = ConfigResolver::new(Some(path)).load();
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("loose"), "{}", msg),
        other => panic!("Expected config error, got {:?}", other),
    }
}
