//! Integration tests for config discovery and loading.

use std::fs;
use tempfile::TempDir;
use xml_sync::config::{discover, load_or_default, CONFIG_FILE_NAME};
use xml_sync::{load_from_path, ConfigError, EngineConfig};

#[test]
fn test_discover_walks_ancestors() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("resources").join("formatters");
    fs::create_dir_all(&nested).unwrap();
    assert_eq!(discover(&nested), None);

    let config = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&config, "[format]\nmax_line_length = 120\n").unwrap();
    assert_eq!(discover(&nested), Some(config.clone()));

    // Closest wins
    let closer = nested.join(CONFIG_FILE_NAME);
    fs::write(&closer, "").unwrap();
    assert_eq!(discover(&nested), Some(closer));
}

#[test]
fn test_load_or_default() {
    let dir = TempDir::new().unwrap();
    assert_eq!(load_or_default(None, dir.path()).unwrap(), EngineConfig::default());

    fs::write(dir.path().join(CONFIG_FILE_NAME), "[format]\nmax_line_length = 120\n").unwrap();
    let config = load_or_default(None, dir.path()).unwrap();
    assert_eq!(config.format.max_line_length, 120);

    // An explicit path beats discovery
    let explicit = dir.path().join("other.toml");
    fs::write(&explicit, "[tables]\nextra = [\"Specimen\"]\n").unwrap();
    let config = load_or_default(Some(&explicit), dir.path()).unwrap();
    assert_eq!(config.format.max_line_length, 80);
    assert_eq!(config.table_registry().resolve("SPECIMEN"), Some("Specimen"));
}

#[test]
fn test_errors_carry_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");
    match load_from_path(&missing) {
        Err(ConfigError::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("unexpected result: {other:?}"),
    }

    let bad = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&bad, "[tables]\nextra = [\"two words\"]\n").unwrap();
    let error = load_from_path(&bad).unwrap_err();
    assert!(matches!(error, ConfigError::Validation { path: Some(_), .. }));
    let message = error.to_string();
    assert!(message.contains(CONFIG_FILE_NAME), "{message}");
    assert!(message.contains("two words"), "{message}");
}

#[test]
fn test_class_prefix_override() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&file, "[tables]\nclass_prefix = \"org.example.model.\"\n").unwrap();
    let tables = load_from_path(&file).unwrap().table_registry();
    assert_eq!(tables.class_prefix(), "org.example.model");
    assert_eq!(tables.class_name("Agent"), "org.example.model.Agent");
}
