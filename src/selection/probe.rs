//! A dry-run [`AdapterLoader`] that validates a weight file without
//! applying it.
//!
//! Safetensors files must have a readable header declaring at least one
//! tensor; other formats only need to be readable and non-empty.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::loader::{AdapterLoader, ArtifactPair, BoxError};
use crate::metadata::safetensors::tensor_names;
use crate::scanner::WeightFormat;

/// What a probe found out about the selected file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    /// The file the selector resolved to
    pub path: PathBuf,
    /// Size of the file in bytes
    pub size: u64,
    /// Tensor count, when the format declares one
    pub tensors: Option<usize>,
    /// Strength for the primary model
    pub strength_model: f64,
    /// Strength for the companion encoder
    pub strength_clip: f64,
}

/// Base pair for probing; `None` until a file was applied.
pub type ProbePair = ArtifactPair<Option<ProbeReport>, Option<ProbeReport>>;

/// Loader that checks the file instead of patching weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeLoader;

impl ProbeLoader {
    /// An empty base pair.
    #[must_use]
    pub fn base() -> ProbePair {
        ArtifactPair::new(None, None)
    }
}

impl AdapterLoader<Option<ProbeReport>, Option<ProbeReport>> for ProbeLoader {
    fn apply(
        &self,
        _base: ProbePair,
        path: &Path,
        strength_model: f64,
        strength_clip: f64,
    ) -> Result<ProbePair, BoxError> {
        let size = fs::metadata(path)?.len();
        if size == 0 {
            return Err(format!("{} is empty", path.display()).into());
        }

        let tensors = match WeightFormat::from_path(path) {
            Some(WeightFormat::SafeTensors) => {
                let names = tensor_names(path)?;
                if names.is_empty() {
                    return Err("header declares no tensors".into());
                }
                Some(names.len())
            }
            _ => None,
        };

        let report = ProbeReport {
            path: path.to_path_buf(),
            size,
            tensors,
            strength_model,
            strength_clip,
        };
        Ok(ArtifactPair::new(Some(report.clone()), Some(report)))
    }
}
