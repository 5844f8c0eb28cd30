//! Resolving a selector and delegating to the external loader.

use std::path::{Path, PathBuf};

use super::is_sentinel;
use crate::catalog::{CatalogError, CatalogManager};

/// Error type returned by external loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The pair of base artifacts a LoRA modifies (e.g. a diffusion model and
/// its text encoder).
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPair<M, C> {
    /// Primary model artifact
    pub model: M,
    /// Companion encoder artifact
    pub clip: C,
}

impl<M, C> ArtifactPair<M, C> {
    /// Pair up two artifacts.
    pub fn new(model: M, clip: C) -> Self {
        Self { model, clip }
    }
}

/// External operation that applies weight file `path` to a base pair.
pub trait AdapterLoader<M, C> {
    /// Apply the adapter at `path` with separate strengths for each half.
    ///
    /// # Errors
    ///
    /// Any failure related to file integrity or compatibility.
    fn apply(
        &self,
        base: ArtifactPair<M, C>,
        path: &Path,
        strength_model: f64,
        strength_clip: f64,
    ) -> Result<ArtifactPair<M, C>, BoxError>;
}

/// Programmatic category of a [`SelectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The selector matched no catalog entry.
    NotFound,
    /// The external loader failed.
    Load,
    /// The catalog could not be refreshed.
    Catalog,
}

/// Failure of [`resolve_and_apply`].
///
/// `Display` gives the short message; [`SelectError::hints`] gives the
/// remediation lines separately.
#[derive(thiserror::Error, Debug)]
pub enum SelectError {
    /// The selector matched no catalog entry.
    #[error("Model '{name}' not found")]
    NotFound {
        /// The requested internal name
        name: String,
    },

    /// The external load operation failed.
    #[error("Load failed for '{name}' ({path}): {source}")]
    Load {
        /// The requested internal name
        name: String,
        /// File handed to the loader
        path: PathBuf,
        /// Error raised by the loader
        #[source]
        source: BoxError,
    },

    /// Refreshing the catalog before resolving failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl SelectError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Load { .. } => ErrorKind::Load,
            Self::Catalog(_) => ErrorKind::Catalog,
        }
    }

    /// Remediation suggestions for display.
    #[must_use]
    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            Self::NotFound { .. } => &[
                "Check that the file exists in the catalog directory",
                "Check the file extension (.safetensors, .pt, .pth, .ckpt)",
            ],
            Self::Load { .. } => &[
                "The model file may be corrupted",
                "The model may be incompatible with the base model",
            ],
            Self::Catalog(_) => &["Check that the catalog directory is readable and writable"],
        }
    }
}

/// Resolve `name` in the catalog and apply it to `base` with `strength`.
///
/// The sentinel selector or a strength of exactly zero returns `base`
/// unchanged without scanning or calling `loader`. Otherwise the catalog is
/// refreshed with a non-forced scan, `name` is looked up by internal name
/// and `loader` is called with `strength` on both halves of the pair.
///
/// # Errors
///
/// [`SelectError::NotFound`] when nothing matches, [`SelectError::Load`]
/// when the loader fails, [`SelectError::Catalog`] when the refresh fails.
pub fn resolve_and_apply<L, M, C>(
    manager: &mut CatalogManager,
    loader: &L,
    base: ArtifactPair<M, C>,
    name: &str,
    strength: f64,
) -> Result<ArtifactPair<M, C>, SelectError>
where
    L: AdapterLoader<M, C> + ?Sized,
{
    if is_sentinel(name) || strength == 0.0 {
        log::debug!("Passthrough for selector '{}' at strength {}", name, strength);
        return Ok(base);
    }

    manager.scan(false)?;
    let record = manager
        .find_by_internal_name(name)
        .ok_or_else(|| SelectError::NotFound {
            name: name.to_string(),
        })?;

    log::info!(
        "Loading LoRA: {} (strength: {})",
        record.display_name,
        strength
    );
    let path = record.path.clone();

    loader
        .apply(base, &path, strength, strength)
        .map_err(|source| {
            log::error!("Load failed for {}: {}", path.display(), source);
            SelectError::Load {
                name: name.to_string(),
                path,
                source,
            }
        })
}
