//! JSON snapshot persistence for the catalog.
//!
//! The whole catalog is stored as one pretty-printed JSON object keyed by
//! absolute file path. Writes go to a sibling temporary file which is then
//! renamed over the snapshot, so a crash mid-write leaves the previous
//! snapshot intact.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{Catalog, CatalogError};

/// Default snapshot file name inside the catalog directory.
pub const DEFAULT_CACHE_FILE: &str = ".model_cache.json";

/// Location of the persisted catalog snapshot.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    /// Store backed by the snapshot at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Load the snapshot, treating a missing or corrupt file as empty.
    ///
    /// The catalog is only an optimization over the filesystem, so a
    /// damaged snapshot is logged and discarded instead of failing.
    #[must_use]
    pub fn load(&self) -> Catalog {
        match self.try_load() {
            Ok(Some(catalog)) => {
                log::debug!(
                    "Loaded {} cached records from {}",
                    catalog.len(),
                    self.path.display()
                );
                catalog
            }
            Ok(None) => {
                log::debug!("No catalog snapshot at {}", self.path.display());
                Catalog::new()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable catalog snapshot: {}", e);
                Catalog::new()
            }
        }
    }

    /// Load the snapshot, reporting corruption.
    ///
    /// Returns `Ok(None)` when no snapshot exists.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Io`] if the file exists but cannot be read,
    /// [`CatalogError::Corrupt`] if it does not decode.
    pub fn try_load(&self) -> Result<Option<Catalog>, CatalogError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CatalogError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut catalog: Catalog =
            serde_json::from_str(&content).map_err(|source| CatalogError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        for (path, record) in &mut catalog {
            record.path.clone_from(path);
        }
        Ok(Some(catalog))
    }

    /// Write `catalog` as the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the temporary file cannot be written
    /// or renamed into place.
    pub fn persist(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let temp = self.temp_path();
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| CatalogError::Io { path, source }
        };

        {
            let file = File::create(&temp).map_err(io_err(&temp))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, catalog).map_err(CatalogError::Serialize)?;
            writer.flush().map_err(io_err(&temp))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(io_err(&temp))?;
        }

        fs::rename(&temp, &self.path).map_err(io_err(&self.path))?;
        log::debug!(
            "Persisted {} records to {}",
            catalog.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Delete the snapshot. A missing snapshot is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] for any other removal failure.
    pub fn remove(&self) -> Result<(), CatalogError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CatalogError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
