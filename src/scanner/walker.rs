//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a catalog
//! directory and yielding the weight files it contains. Traversal is
//! single-threaded and visits children in file-name order, so two walks of
//! an unchanged tree yield the same sequence.
//!
//! # Features
//!
//! - Extension allow-list filtering
//! - Configurable symlink following
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Errors are yielded, never fatal to the walk
//!
//! # Example
//!
//! ```no_run
//! use loracat::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/srv/lora_models"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} weight files", files.len());
//! ```

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for weight file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Build the gitignore matcher from config patterns.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a path should be ignored based on configured patterns.
    fn should_ignore(&self, path: &Path, is_dir: bool, gitignore: Option<&Gitignore>) -> bool {
        let Some(gi) = gitignore else {
            return false;
        };

        // Patterns are matched against root-relative paths with forward slashes.
        let relative_path = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative_path.to_string_lossy();
        let normalized_path = if cfg!(windows) {
            path_str.replace('\\', "/")
        } else {
            path_str.into_owned()
        };

        gi.matched(normalized_path, is_dir).is_ignore()
    }

    /// Walk the directory tree, yielding weight file entries.
    ///
    /// Returns an iterator over [`FileEntry`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let gitignore = self.build_gitignore();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        let mut iter = walk_dir.into_iter();
        std::iter::from_fn(move || loop {
            let entry = match iter.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(self.handle_walkdir_error(e))),
            };

            // Skip the root directory itself
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                if self.should_ignore(path, true, gitignore.as_ref()) {
                    log::trace!("Ignoring directory: {}", path.display());
                    iter.skip_current_dir();
                }
                continue;
            }

            // Unfollowed links are listed when they point at a file. Linked
            // directories are never descended.
            let is_file = if file_type.is_symlink() {
                match std::fs::metadata(path) {
                    Ok(meta) if meta.is_file() => true,
                    Ok(_) => {
                        log::trace!("Skipping symlinked directory: {}", path.display());
                        false
                    }
                    Err(e) => {
                        log::debug!("Skipping dangling symlink {}: {}", path.display(), e);
                        false
                    }
                }
            } else {
                file_type.is_file()
            };

            if !is_file {
                continue;
            }

            let Some(format) = self.config.accepts(path) else {
                log::trace!("Skipping unsupported file: {}", path.display());
                continue;
            };

            if self.should_ignore(path, false, gitignore.as_ref()) {
                log::trace!("Ignoring file: {}", path.display());
                continue;
            }

            if path.to_str().is_none() {
                log::warn!("Skipping non UTF-8 path: {}", path.display());
                return Some(Err(ScanError::NonUtf8Path(path.to_path_buf())));
            }

            return Some(Ok(FileEntry::new(path.to_path_buf(), format)));
        })
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walkdir_error(&self, error: walkdir::Error) -> ScanError {
        use std::io::ErrorKind;

        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        match error.io_error().map(std::io::Error::kind) {
            Some(ErrorKind::PermissionDenied) => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            Some(ErrorKind::NotFound) => {
                log::debug!("Path not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("Walker error for {}: {}", path.display(), error);
                let source = error
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                ScanError::Io { path, source }
            }
        }
    }
}
