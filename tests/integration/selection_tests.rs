//! Resolving selectors against a scanned catalog.

use loracat::catalog::CatalogManager;
use loracat::selection::{
    choices, resolve_and_apply, search, AdapterLoader, ArtifactPair, BoxError, ErrorKind,
    LoadRequest, ProbeLoader, SENTINEL_NONE,
};
use serde_json::{json, Map, Value};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Loader that scales a weight by strength and counts calls.
#[derive(Default)]
struct Scaling {
    calls: Cell<usize>,
}

impl AdapterLoader<f64, f64> for Scaling {
    fn apply(
        &self,
        base: ArtifactPair<f64, f64>,
        path: &Path,
        strength_model: f64,
        strength_clip: f64,
    ) -> Result<ArtifactPair<f64, f64>, BoxError> {
        self.calls.set(self.calls.get() + 1);
        if !path.exists() {
            return Err(format!("{} vanished", path.display()).into());
        }
        Ok(ArtifactPair::new(
            base.model * strength_model,
            base.clip * strength_clip,
        ))
    }
}

fn write_tagged(dir: &Path, name: &str, display: &str, tags: &[&str]) {
    let ssmd = json!({"display_name": display, "tags": tags}).to_string();
    let mut meta = Map::new();
    meta.insert("ssmd".to_string(), Value::String(ssmd));
    fs::write(
        dir.join(name),
        loracat::metadata::safetensors::encode_metadata_only(&meta),
    )
    .unwrap();
}

#[test]
fn test_choices_start_with_sentinel() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.pt"), b"a").unwrap();
    fs::write(dir.path().join("b.pt"), b"b").unwrap();

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    let records = manager.scan(false).unwrap();
    let offered = choices(&records);

    assert_eq!(offered.len(), 3);
    assert_eq!(offered[0], SENTINEL_NONE);
    assert!(offered.contains(&"a".to_string()));
    assert!(offered.contains(&"b".to_string()));
}

#[test]
fn test_search_matches_display_name_and_tags() {
    let dir = TempDir::new().unwrap();
    write_tagged(dir.path(), "one.safetensors", "Ink Portrait", &["monochrome"]);
    write_tagged(dir.path(), "two.safetensors", "Sunset", &["landscape", "warm"]);
    write_tagged(dir.path(), "three.safetensors", "City", &[]);

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    let records = manager.scan(false).unwrap();

    let names = |kw: &str| {
        let mut found: Vec<_> = search(&records, kw)
            .into_iter()
            .map(|r| r.internal_name.clone())
            .collect();
        found.sort();
        found
    };

    assert_eq!(names("portrait"), vec!["one"]);
    assert_eq!(names("landscape"), vec!["two"]);
    assert_eq!(names("MONO"), vec!["one"]);
    assert!(names("forest").is_empty());
    assert_eq!(names("").len(), 3);
}

#[test]
fn test_resolve_applies_strength_to_both_halves() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("detail.pt"), b"weights").unwrap();

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    let loader = Scaling::default();

    let out = resolve_and_apply(
        &mut manager,
        &loader,
        ArtifactPair::new(2.0, 4.0),
        "detail",
        0.5,
    )
    .unwrap();

    assert_eq!(out, ArtifactPair::new(1.0, 2.0));
    assert_eq!(loader.calls.get(), 1);
}

#[test]
fn test_resolve_passthrough_skips_everything() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("detail.pt"), b"weights").unwrap();

    let mut manager = CatalogManager::open(dir.path()).unwrap();
    let loader = Scaling::default();

    for (name, strength) in [("None", 1.0), ("NONE", 0.5), ("detail", 0.0)] {
        let out = resolve_and_apply(
            &mut manager,
            &loader,
            ArtifactPair::new(2.0, 4.0),
            name,
            strength,
        )
        .unwrap();
        assert_eq!(out, ArtifactPair::new(2.0, 4.0));
    }

    assert_eq!(loader.calls.get(), 0);
    assert!(!manager.cache_path().exists());
}

#[test]
fn test_resolve_unknown_name() {
    let dir = TempDir::new().unwrap();
    let mut manager = CatalogManager::open(dir.path()).unwrap();

    let err = resolve_and_apply(
        &mut manager,
        &Scaling::default(),
        ArtifactPair::new(1.0, 1.0),
        "missing",
        1.0,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.hints()[0].contains("exists"));
}

#[test]
fn test_resolve_with_probe_loader() {
    let dir = TempDir::new().unwrap();
    write_tagged(dir.path(), "meta_only.safetensors", "Meta", &[]);
    fs::write(dir.path().join("ok.pt"), b"pickle").unwrap();

    let mut manager = CatalogManager::open(dir.path()).unwrap();

    let pair =
        resolve_and_apply(&mut manager, &ProbeLoader, ProbeLoader::base(), "ok", 1.2).unwrap();
    let report = pair.model.unwrap();
    assert_eq!(report.size, 6);
    assert_eq!(report.strength_model, 1.2);

    let err = resolve_and_apply(
        &mut manager,
        &ProbeLoader,
        ProbeLoader::base(),
        "meta_only",
        1.0,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
    assert!(err.to_string().contains("header declares no tensors"));
}

#[test]
fn test_change_token_tracks_arguments() {
    let base = LoadRequest::new("detail", 1.0).change_token().unwrap();

    assert_eq!(base, LoadRequest::new("detail", 1.0).change_token().unwrap());
    assert_ne!(base, LoadRequest::new("detail", 0.9).change_token().unwrap());
    assert_ne!(base, LoadRequest::new("Detail", 1.0).change_token().unwrap());
    assert_ne!(base, LoadRequest::new("None", 1.0).change_token().unwrap());
}
