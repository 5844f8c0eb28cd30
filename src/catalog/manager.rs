//! Catalog cache manager: scan, reconcile, persist.
//!
//! # Overview
//!
//! [`CatalogManager`] is meant to be constructed once and kept alive by
//! whatever hosts it. It loads the snapshot a single time at construction,
//! then every [`CatalogManager::scan`] walks the directory and decides per
//! file whether the cached record can be carried forward:
//!
//! 1. **Walk** - collect allow-listed files under the catalog root
//! 2. **Reuse** - same path and same fingerprint keeps the cached record,
//!    `add_time` included (skipped entirely when `force_update` is set)
//! 3. **Rebuild** - everything else is re-extracted and stamped with now
//! 4. **Persist** - only when a record was rebuilt or the set of paths
//!    differs from the previous snapshot
//!
//! # Example
//!
//! ```no_run
//! use loracat::catalog::CatalogManager;
//!
//! let mut manager = CatalogManager::open("/srv/lora_models")?;
//! for record in manager.scan(false)? {
//!     println!("{} -> {}", record.internal_name, record.display_name);
//! }
//! # Ok::<(), loracat::catalog::CatalogError>(())
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;

use super::record::sorted_by_add_time;
use super::store::{CatalogStore, DEFAULT_CACHE_FILE};
use super::{Catalog, CatalogError, CatalogRecord};
use crate::metadata::{
    generate_fingerprint, parse_embedded_metadata, MetadataParser, NameTable, SafetensorsParser,
};
use crate::scanner::path_utils::{names_equal, normalize_name, relative_name};
use crate::scanner::{FileEntry, Walker, WalkerConfig};

/// Configuration for a [`CatalogManager`].
pub struct ManagerConfig {
    /// Snapshot file name, created inside the catalog directory.
    pub cache_file_name: String,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Token substitutions for fallback display names.
    pub name_table: NameTable,
    /// Reader for embedded metadata.
    pub parser: Box<dyn MetadataParser>,
}

impl fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("cache_file_name", &self.cache_file_name)
            .field("walker_config", &self.walker_config)
            .field("name_table", &self.name_table)
            .field("parser", &"<parser>")
            .finish()
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            cache_file_name: DEFAULT_CACHE_FILE.to_string(),
            walker_config: WalkerConfig::default(),
            name_table: NameTable::default(),
            parser: Box::new(SafetensorsParser::default()),
        }
    }
}

impl ManagerConfig {
    /// Use a different metadata parser.
    #[must_use]
    pub fn with_parser(mut self, parser: impl MetadataParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Use a different fallback naming table.
    #[must_use]
    pub fn with_name_table(mut self, table: NameTable) -> Self {
        self.name_table = table;
        self
    }

    /// Use a different walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Use a different snapshot file name.
    #[must_use]
    pub fn with_cache_file_name(mut self, name: impl Into<String>) -> Self {
        self.cache_file_name = name.into();
        self
    }
}

/// What a scan did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Weight files found by the walk and fingerprinted
    pub total_files: usize,
    /// Records carried forward from the snapshot
    pub reused: usize,
    /// Records built from scratch
    pub rebuilt: usize,
    /// Snapshot records whose file is gone
    pub dropped: usize,
    /// Files whose embedded metadata was present but unreadable
    pub extraction_failures: usize,
    /// Entries the walk or fingerprinting could not read
    pub walk_errors: usize,
    /// Whether the snapshot was rewritten
    pub persisted: bool,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

/// Owner of the catalog snapshot for one directory.
pub struct CatalogManager {
    catalog_dir: PathBuf,
    store: CatalogStore,
    config: ManagerConfig,
    /// Catalog as last loaded or persisted.
    persisted: Catalog,
    /// Set when the snapshot on disk could not be decoded.
    snapshot_damaged: bool,
    /// Result of the most recent scan, newest first.
    latest: Vec<CatalogRecord>,
}

impl fmt::Debug for CatalogManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogManager")
            .field("catalog_dir", &self.catalog_dir)
            .field("store", &self.store)
            .field("config", &self.config)
            .field("records", &self.persisted.len())
            .field("snapshot_damaged", &self.snapshot_damaged)
            .finish()
    }
}

impl CatalogManager {
    /// Open the catalog rooted at `dir` with default settings.
    ///
    /// # Errors
    ///
    /// See [`CatalogManager::with_config`].
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::with_config(dir, ManagerConfig::default())
    }

    /// Open the catalog rooted at `dir`, creating the directory if needed,
    /// and load its snapshot once.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotADirectory`] if `dir` is a file,
    /// [`CatalogError::Io`] if it cannot be created or resolved.
    /// A corrupt snapshot is not an error.
    pub fn with_config(dir: impl AsRef<Path>, config: ManagerConfig) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        if dir.exists() && !dir.is_dir() {
            return Err(CatalogError::NotADirectory(dir.to_path_buf()));
        }

        let io_err = |source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        };
        fs::create_dir_all(dir).map_err(io_err)?;
        let catalog_dir = dir.canonicalize().map_err(io_err)?;

        let store = CatalogStore::new(catalog_dir.join(&config.cache_file_name));
        let (persisted, snapshot_damaged) = match store.try_load() {
            Ok(catalog) => (catalog.unwrap_or_default(), false),
            Err(e) => {
                log::warn!("Treating catalog as empty: {}", e);
                (Catalog::new(), true)
            }
        };

        log::debug!(
            "Opened catalog {} with {} cached records",
            catalog_dir.display(),
            persisted.len()
        );

        Ok(Self {
            catalog_dir,
            store,
            config,
            persisted,
            snapshot_damaged,
            latest: Vec::new(),
        })
    }

    /// Absolute catalog root.
    #[must_use]
    pub fn catalog_dir(&self) -> &Path {
        &self.catalog_dir
    }

    /// Absolute path of the snapshot file.
    #[must_use]
    pub fn cache_path(&self) -> &Path {
        self.store.path()
    }

    /// Catalog as held in memory (last loaded or persisted).
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.persisted
    }

    /// Records of the most recent scan, newest first. Empty before any scan.
    #[must_use]
    pub fn latest(&self) -> &[CatalogRecord] {
        &self.latest
    }

    /// Re-read the snapshot from disk. Missing or corrupt yields empty.
    #[must_use]
    pub fn load(&self) -> Catalog {
        self.store.load()
    }

    /// Write `catalog` as the snapshot.
    ///
    /// # Errors
    ///
    /// Propagates [`CatalogStore::persist`] failures.
    pub fn persist(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        self.store.persist(catalog)
    }

    /// Delete the snapshot and forget every cached record.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the snapshot cannot be removed.
    pub fn clear(&mut self) -> Result<(), CatalogError> {
        self.store.remove()?;
        self.persisted.clear();
        self.latest.clear();
        self.snapshot_damaged = false;
        log::info!("Cleared catalog snapshot {}", self.store.path().display());
        Ok(())
    }

    /// Linear lookup over the latest scan result.
    #[must_use]
    pub fn find_by_internal_name(&self, name: &str) -> Option<&CatalogRecord> {
        self.latest
            .iter()
            .find(|record| names_equal(&record.internal_name, name))
    }

    /// Scan the catalog directory and return every record, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error only if the updated snapshot cannot be written.
    /// Per-file problems are logged and skipped or degraded.
    pub fn scan(&mut self, force_update: bool) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.scan_with_summary(force_update)
            .map(|(records, _)| records)
    }

    /// [`CatalogManager::scan`], also reporting what the scan did.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogManager::scan`].
    pub fn scan_with_summary(
        &mut self,
        force_update: bool,
    ) -> Result<(Vec<CatalogRecord>, ScanSummary), CatalogError> {
        let started = Instant::now();
        let mut summary = ScanSummary::default();
        let mut catalog = Catalog::new();
        let mut pending: Vec<(FileEntry, String)> = Vec::new();

        let walker = Walker::new(&self.catalog_dir, self.config.walker_config.clone());
        for result in walker.walk() {
            let entry = match result {
                Ok(entry) => entry,
                Err(_) => {
                    // Already logged by the walker.
                    summary.walk_errors += 1;
                    continue;
                }
            };

            let fingerprint = match generate_fingerprint(&entry.path) {
                Ok(fingerprint) => fingerprint,
                Err(e) => {
                    log::warn!("Cannot fingerprint {}: {}", entry.path.display(), e);
                    summary.walk_errors += 1;
                    continue;
                }
            };
            summary.total_files += 1;

            if !force_update {
                if let Some(cached) = self.persisted.get(&entry.path) {
                    if cached.fingerprint == fingerprint {
                        log::trace!("Reusing cached record: {}", entry.path.display());
                        catalog.insert(entry.path, cached.clone());
                        summary.reused += 1;
                        continue;
                    }
                }
            }

            pending.push((entry, fingerprint));
        }

        // Rebuilt records are named after every reused name is claimed, so a
        // newcomer can never steal an existing record's identifier.
        let mut taken: HashSet<String> = catalog
            .values()
            .map(|record| normalize_name(&record.internal_name).into_owned())
            .collect();

        for (entry, fingerprint) in pending {
            let (record, failed) = self.build_record(&entry, fingerprint, &mut taken);
            if failed {
                summary.extraction_failures += 1;
            }
            log::debug!(
                "Rebuilt record {} for {}",
                record.internal_name,
                entry.path.display()
            );
            catalog.insert(entry.path, record);
            summary.rebuilt += 1;
        }

        summary.dropped = self
            .persisted
            .keys()
            .filter(|path| !catalog.contains_key(*path))
            .count();

        let same_paths = catalog.keys().eq(self.persisted.keys());
        if summary.rebuilt > 0 || !same_paths || self.snapshot_damaged {
            self.store.persist(&catalog)?;
            summary.persisted = true;
            self.snapshot_damaged = false;
        } else {
            log::trace!("Catalog unchanged, snapshot left untouched");
        }
        self.persisted = catalog;
        self.latest = sorted_by_add_time(&self.persisted);

        summary.scan_duration = started.elapsed();
        log::info!(
            "Scanned {}: {} files, {} reused, {} rebuilt, {} dropped",
            self.catalog_dir.display(),
            summary.total_files,
            summary.reused,
            summary.rebuilt,
            summary.dropped
        );

        Ok((self.latest.clone(), summary))
    }

    /// Build a fresh record for `entry`. Returns whether extraction failed.
    fn build_record(
        &self,
        entry: &FileEntry,
        fingerprint: String,
        taken: &mut HashSet<String>,
    ) -> (CatalogRecord, bool) {
        let (embedded, failed) = parse_embedded_metadata(self.config.parser.as_ref(), &entry.path);

        let file_name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let display_name = match embedded.usable_display_name() {
            Some(name) => name.to_string(),
            None => self.config.name_table.derive_display_name(&file_name),
        };

        let stem = entry.stem();
        let internal_name = if taken.contains(&*normalize_name(&stem)) {
            let qualified = relative_name(&self.catalog_dir, &entry.path);
            let free = unclaimed_name(&qualified, taken);
            log::warn!("Internal name '{}' already in use, using '{}'", stem, free);
            free
        } else {
            stem
        };
        taken.insert(normalize_name(&internal_name).into_owned());

        let record = CatalogRecord {
            fingerprint,
            display_name,
            internal_name,
            tags: embedded.tags,
            description: embedded.description.unwrap_or_default(),
            add_time: Utc::now(),
            path: entry.path.clone(),
        };
        (record, failed)
    }
}

/// `base`, or `base#2`, `base#3`, ... whichever is not yet in `taken`.
fn unclaimed_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(&*normalize_name(base)) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}#{n}"))
        .find(|candidate| !taken.contains(&*normalize_name(candidate)))
        .unwrap_or_else(|| base.to_string())
}
