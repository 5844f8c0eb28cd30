use loracat::catalog::{CatalogError, CatalogManager, CatalogStore};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_corrupt_snapshot_is_treated_as_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("style.pt"), b"weights").unwrap();
    fs::write(dir.path().join(".model_cache.json"), b"{ this is not json").unwrap();

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    assert!(manager.catalog().is_empty());

    let (records, summary) = manager.scan_with_summary(false).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(summary.rebuilt, 1);
    assert!(summary.persisted);

    // The rewritten snapshot decodes again.
    let reloaded = CatalogStore::new(manager.cache_path()).try_load().unwrap();
    assert_eq!(reloaded.unwrap().len(), 1);
}

#[test]
fn test_corrupt_snapshot_of_empty_directory_is_rewritten() {
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join(".model_cache.json");
    fs::write(&cache, b"\x00\x01garbage").unwrap();

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    let (records, summary) = manager.scan_with_summary(false).unwrap();

    assert!(records.is_empty());
    assert!(summary.persisted);
    assert_eq!(fs::read_to_string(&cache).unwrap().trim(), "{}");
}

#[test]
fn test_wrong_shape_snapshot_is_corrupt() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"["a", "list", "not", "a", "map"]"#).unwrap();

    let store = CatalogStore::new(file.path());
    assert!(matches!(
        store.try_load(),
        Err(CatalogError::Corrupt { .. })
    ));
    assert!(store.load().is_empty());
}

#[test]
fn test_truncated_snapshot_is_corrupt() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.pt"), b"a").unwrap();
    let mut manager = CatalogManager::open(dir.path()).unwrap();
    manager.scan(false).unwrap();

    let cache = manager.cache_path().to_path_buf();
    let full = fs::read(&cache).unwrap();
    fs::write(&cache, &full[..full.len() / 2]).unwrap();

    let store = CatalogStore::new(&cache);
    assert!(matches!(
        store.try_load(),
        Err(CatalogError::Corrupt { .. })
    ));
}

#[test]
fn test_stale_temp_file_is_ignored() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.pt"), b"a").unwrap();
    fs::write(dir.path().join(".model_cache.json.tmp"), b"half written").unwrap();

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    let records = manager.scan(false).unwrap();

    assert_eq!(records.len(), 1);
    assert!(!dir.path().join(".model_cache.json.tmp").exists());
}

#[cfg(unix)]
#[test]
fn test_unwritable_snapshot_propagates_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("models");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.pt"), b"a").unwrap();

    let mut manager = CatalogManager::open(&root).unwrap();
    fs::set_permissions(&root, fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores permission bits; only assert when the write really fails.
    let probe = fs::write(root.join("probe"), b"");
    if probe.is_err() {
        let err = manager.scan(false).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
}
