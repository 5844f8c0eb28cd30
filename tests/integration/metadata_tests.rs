//! Embedded metadata extraction as seen through a scan.

use loracat::catalog::{CatalogManager, ManagerConfig};
use loracat::metadata::safetensors::encode_metadata_only;
use loracat::metadata::{NameTable, SafetensorsParser};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_with_key(dir: &Path, name: &str, key: &str, payload: &str) {
    let mut meta = Map::new();
    meta.insert(key.to_string(), Value::String(payload.to_string()));
    fs::write(dir.join(name), encode_metadata_only(&meta)).unwrap();
}

#[test]
fn test_broken_metadata_falls_back_to_file_name() {
    let dir = TempDir::new().unwrap();
    write_with_key(dir.path(), "landscape_v2.safetensors", "ssmd", "{broken json");
    fs::write(dir.path().join("portrait_v1.safetensors"), b"garbage bytes").unwrap();

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    let (records, summary) = manager.scan_with_summary(false).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(summary.extraction_failures, 2);
    assert_eq!(
        manager.find_by_internal_name("landscape_v2").unwrap().display_name,
        "风景版本2"
    );
    let portrait = manager.find_by_internal_name("portrait_v1").unwrap();
    assert_eq!(portrait.display_name, "肖像版本1");
    assert!(portrait.tags.is_empty());
    assert!(portrait.description.is_empty());
}

#[test]
fn test_missing_metadata_is_not_a_failure() {
    let dir = TempDir::new().unwrap();
    write_with_key(dir.path(), "other_key.safetensors", "format", "pt");
    fs::write(dir.path().join("plain.ckpt"), b"pickle").unwrap();

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    let (_, summary) = manager.scan_with_summary(false).unwrap();

    assert_eq!(summary.rebuilt, 2);
    assert_eq!(summary.extraction_failures, 0);
    assert_eq!(
        manager.find_by_internal_name("other_key").unwrap().display_name,
        "otherkey"
    );
}

#[test]
fn test_empty_display_name_falls_back() {
    let dir = TempDir::new().unwrap();
    write_with_key(
        dir.path(),
        "portrait_v2.safetensors",
        "ssmd",
        &json!({"display_name": "", "tags": ["keep"]}).to_string(),
    );
    write_with_key(
        dir.path(),
        "spaced.safetensors",
        "ssmd",
        &json!({"display_name": "   "}).to_string(),
    );

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    manager.scan(false).unwrap();

    let record = manager.find_by_internal_name("portrait_v2").unwrap();
    assert_eq!(record.display_name, "肖像版本2");
    assert_eq!(record.tags, vec!["keep"]);
    assert_eq!(
        manager.find_by_internal_name("spaced").unwrap().display_name,
        "   "
    );
}

#[test]
fn test_null_tags_keep_embedded_display_name() {
    let dir = TempDir::new().unwrap();
    write_with_key(
        dir.path(),
        "ink_v1.safetensors",
        "ssmd",
        r#"{"display_name":"Ink","tags":null,"description":42}"#,
    );

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    let (_, summary) = manager.scan_with_summary(false).unwrap();

    let record = manager.find_by_internal_name("ink_v1").unwrap();
    assert_eq!(record.display_name, "Ink");
    assert!(record.tags.is_empty());
    assert!(record.description.is_empty());
    assert_eq!(summary.extraction_failures, 0);
}

#[test]
fn test_custom_key_and_name_table() {
    let dir = TempDir::new().unwrap();
    write_with_key(
        dir.path(),
        "with_meta.safetensors",
        "loracat",
        &json!({"display_name": "From custom key"}).to_string(),
    );
    fs::write(dir.path().join("anime_xl.pt"), b"x").unwrap();

    let config = ManagerConfig::default()
        .with_parser(SafetensorsParser::new("loracat"))
        .with_name_table(NameTable::empty().with_overrides([("xl", "XL"), ("anime", "Anime ")]));
    let mut manager = CatalogManager::with_config(dir.path(), config).unwrap();
    manager.scan(false).unwrap();

    assert_eq!(
        manager.find_by_internal_name("with_meta").unwrap().display_name,
        "From custom key"
    );
    assert_eq!(
        manager.find_by_internal_name("anime_xl").unwrap().display_name,
        "Anime XL"
    );
}

#[test]
fn test_metadata_change_needs_file_change() {
    let dir = TempDir::new().unwrap();
    write_with_key(
        dir.path(),
        "style.safetensors",
        "ssmd",
        &json!({"display_name": "Old"}).to_string(),
    );

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    manager.scan(false).unwrap();

    // New metadata with a different length changes the fingerprint.
    write_with_key(
        dir.path(),
        "style.safetensors",
        "ssmd",
        &json!({"display_name": "Brand new name"}).to_string(),
    );
    manager.scan(false).unwrap();

    assert_eq!(
        manager.find_by_internal_name("style").unwrap().display_name,
        "Brand new name"
    );
}
