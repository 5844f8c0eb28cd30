//! Scanner module for discovering weight files in a catalog directory.
//!
//! This module provides functionality for:
//! - Recursive, deterministic directory walking using walkdir
//! - Filtering by the weight-container extension allow-list
//! - Gitignore-style exclusion patterns
//! - Unicode name normalization
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`path_utils`]: NFC normalization used for name comparison
//!
//! # Example
//!
//! ```no_run
//! use loracat::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("lora_models"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{} ({})", file.path.display(), file.format),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod path_utils;
pub mod walker;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use walker::Walker;

/// Weight-container formats recognized by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightFormat {
    /// Safe serialized tensors (`.safetensors`), the only format with embedded metadata.
    SafeTensors,
    /// Generic pickled checkpoint (`.pt`, `.pth`, `.ckpt`).
    Checkpoint,
}

impl WeightFormat {
    /// All formats, in allow-list order.
    pub const ALL: [WeightFormat; 2] = [WeightFormat::SafeTensors, WeightFormat::Checkpoint];

    /// File extensions (lowercase, without dot) belonging to this format.
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::SafeTensors => &["safetensors"],
            Self::Checkpoint => &["pt", "pth", "ckpt"],
        }
    }

    /// Look up a format by extension, ignoring ASCII case.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }

    /// Detect the format of a path from its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Every extension of every format.
    #[must_use]
    pub fn all_extensions() -> Vec<String> {
        Self::ALL
            .iter()
            .flat_map(|format| format.extensions().iter().map(|e| (*e).to_string()))
            .collect()
    }
}

impl fmt::Display for WeightFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SafeTensors => write!(f, "safetensors"),
            Self::Checkpoint => write!(f, "checkpoint"),
        }
    }
}

/// A candidate weight file discovered by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Container format inferred from the extension
    pub format: WeightFormat,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, format: WeightFormat) -> Self {
        Self { path, format }
    }

    /// File name without its extension.
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Glob patterns to ignore (gitignore-style), relative to the root.
    pub ignore_patterns: Vec<String>,

    /// Lowercase extensions (without dot) that make a file a candidate.
    pub extensions: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            extensions: WeightFormat::all_extensions(),
        }
    }
}

impl WalkerConfig {
    /// Whether `path` has an allow-listed extension with a known format.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> Option<WeightFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if !self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)) {
            return None;
        }
        WeightFormat::from_extension(&ext)
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The path cannot be represented as UTF-8 and cannot be cataloged.
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
