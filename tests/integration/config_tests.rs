use figment::providers::{Env, Format, Serialized};
use figment::Figment;
use loracat::catalog::CatalogManager;
use loracat::config::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config.cache_file_name, ".model_cache.json");
    assert_eq!(config.metadata_key, "ssmd");
    assert!(!config.follow_symlinks);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("LORACAT_METADATA_KEY", "modelspec");
    std::env::set_var("LORACAT_FOLLOW_SYMLINKS", "true");
    std::env::set_var("LORACAT_NAME_SUBSTITUTIONS__XL", "超清");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("LORACAT_").split("__"));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.metadata_key, "modelspec");
    assert!(config.follow_symlinks);
    assert_eq!(
        config.name_substitutions.get("xl").map(String::as_str),
        Some("超清")
    );

    std::env::remove_var("LORACAT_METADATA_KEY");
    std::env::remove_var("LORACAT_FOLLOW_SYMLINKS");
    std::env::remove_var("LORACAT_NAME_SUBSTITUTIONS__XL");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
catalog_dir = "/srv/lora"
cache_file_name = "catalog.json"
extensions = ["safetensors"]
ignore_patterns = ["archive/"]

[name_substitutions]
xl = "XL"
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load_from(&config_path).unwrap();

    assert_eq!(config.catalog_dir, PathBuf::from("/srv/lora"));
    assert_eq!(config.cache_file_name, "catalog.json");
    assert_eq!(config.extensions, vec!["safetensors"]);
    assert_eq!(config.ignore_patterns, vec!["archive/"]);
    assert_eq!(config.name_substitutions["xl"], "XL");
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let temp_dir = tempdir().unwrap();
    let config = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.cache_file_name, Config::default().cache_file_name);
}

#[test]
fn test_config_invalid_toml_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "extensions = 5").unwrap();

    assert!(Config::load_from(&config_path).is_err());
}

#[test]
fn test_config_save_and_reload() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.catalog_dir = PathBuf::from("/data/models");
    config.follow_symlinks = true;
    config.save_to(&config_path).unwrap();

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(figment::providers::Toml::file(&config_path));
    let reloaded: Config = figment.extract().unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_manager_config_applies_settings() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("archive")).unwrap();
    fs::write(root.join("archive").join("old.pt"), b"old").unwrap();
    fs::write(root.join("current.pt"), b"new").unwrap();
    fs::write(root.join("skipped.ckpt"), b"ckpt").unwrap();

    let config = Config {
        catalog_dir: root.to_path_buf(),
        cache_file_name: "catalog.json".to_string(),
        extensions: vec!["pt".to_string()],
        ignore_patterns: vec!["archive/".to_string()],
        ..Default::default()
    };

    let mut manager =
        CatalogManager::with_config(&config.catalog_dir, config.manager_config()).unwrap();
    let records = manager.scan(false).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].internal_name, "current");
    assert!(root.join("catalog.json").exists());
    assert!(!root.join(".model_cache.json").exists());
}
