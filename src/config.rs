//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory (or `--config PATH`)
//! 3. `LORACAT_*` environment variables (`__` separates nested keys)
//! 4. CLI flags, applied by the binary
//!
//! ```toml
//! catalog_dir = "/srv/lora_models"
//! metadata_key = "ssmd"
//! extensions = ["safetensors", "pt"]
//! ignore_patterns = ["archive/"]
//!
//! [name_substitutions]
//! xl = "XL"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::catalog::{ManagerConfig, DEFAULT_CACHE_FILE};
use crate::metadata::safetensors::DEFAULT_METADATA_KEY;
use crate::metadata::{NameTable, SafetensorsParser};
use crate::scanner::{WalkerConfig, WeightFormat};

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "LORACAT_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding the weight files.
    pub catalog_dir: PathBuf,
    /// Snapshot file name inside `catalog_dir`.
    pub cache_file_name: String,
    /// Side-channel key of the embedded metadata.
    pub metadata_key: String,
    /// Extensions (without dot) considered weight files.
    pub extensions: Vec<String>,
    /// Gitignore-style patterns excluded from scans.
    pub ignore_patterns: Vec<String>,
    /// Follow symbolic links during scans.
    pub follow_symlinks: bool,
    /// Extra or overriding fallback-name token substitutions.
    pub name_substitutions: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_dir: default_catalog_dir(),
            cache_file_name: DEFAULT_CACHE_FILE.to_string(),
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
            extensions: WeightFormat::all_extensions(),
            ignore_patterns: Vec::new(),
            follow_symlinks: false,
            name_substitutions: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    ///
    /// Never fails: problems are logged and defaults used.
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load defaults, then `path` if it exists, then the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment value is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Save the configuration as TOML to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = project_dirs()
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Walker configuration derived from these settings.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            ignore_patterns: self.ignore_patterns.clone(),
            extensions: self
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Fallback naming table: built-ins overridden by `name_substitutions`.
    #[must_use]
    pub fn name_table(&self) -> NameTable {
        NameTable::default().with_overrides(self.name_substitutions.clone())
    }

    /// Catalog manager settings derived from this configuration.
    #[must_use]
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig::default()
            .with_cache_file_name(self.cache_file_name.clone())
            .with_walker_config(self.walker_config())
            .with_name_table(self.name_table())
            .with_parser(SafetensorsParser::new(self.metadata_key.clone()))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "loracat", "loracat")
}

fn default_catalog_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("lora_models"))
        .unwrap_or_else(|| PathBuf::from("lora_models"))
}
