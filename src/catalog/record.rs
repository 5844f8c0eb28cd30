//! Catalog data model.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full mapping from absolute file path to its cached record.
pub type Catalog = BTreeMap<PathBuf, CatalogRecord>;

/// One file's cached metadata snapshot.
///
/// Records are never edited in place: a stale record is replaced by a
/// freshly built one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Size + mtime fingerprint of the file this record was built from.
    pub fingerprint: String,
    /// Human-facing label.
    pub display_name: String,
    /// Stable identifier derived from the file name, unique within a scan.
    pub internal_name: String,
    /// Author tags, possibly empty.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Author description, possibly empty.
    #[serde(default)]
    pub description: String,
    /// When this record was built.
    pub add_time: DateTime<Utc>,
    /// Absolute path of the file; the catalog key, repeated for consumers
    /// of the scan result. Not part of the persisted record.
    #[serde(skip)]
    pub path: PathBuf,
}

impl CatalogRecord {
    /// Whether `keyword` matches the display name (case-insensitive) or any tag.
    ///
    /// An empty keyword matches every record.
    #[must_use]
    pub fn matches(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.display_name.to_lowercase().contains(&keyword)
            || self.tags.iter().any(|tag| tag.contains(&keyword))
    }
}

/// Records of `catalog` ordered newest first by `add_time`.
#[must_use]
pub fn sorted_by_add_time(catalog: &Catalog) -> Vec<CatalogRecord> {
    let mut records: Vec<CatalogRecord> = catalog
        .iter()
        .map(|(path, record)| CatalogRecord {
            path: path.clone(),
            ..record.clone()
        })
        .collect();
    records.sort_by(|a, b| b.add_time.cmp(&a.add_time));
    records
}
