//! Selection and load surface consumed by a model-loading host.
//!
//! A host (a node-graph UI, a server) shows the catalog as a list of
//! choices, lets the user pick one with a strength, and asks this module to
//! apply it to a pair of base artifacts:
//!
//! * [`choices`] and [`search`]: what to offer the user
//! * [`loader::resolve_and_apply`]: name + strength to loaded artifacts
//! * [`token::change_token`]: whether a re-invocation would be redundant
//! * [`probe::ProbeLoader`]: a dry-run loader that only validates the file
//!
//! ```no_run
//! use loracat::catalog::CatalogManager;
//! use loracat::selection::{choices, search};
//!
//! let mut manager = CatalogManager::open("/srv/lora_models")?;
//! let records = manager.scan(false)?;
//! println!("{:?}", choices(&records));
//! for record in search(&records, "portrait") {
//!     println!("{}", record.display_name);
//! }
//! # Ok::<(), loracat::catalog::CatalogError>(())
//! ```

pub mod loader;
pub mod probe;
pub mod token;

use crate::catalog::CatalogRecord;

pub use loader::{resolve_and_apply, AdapterLoader, ArtifactPair, BoxError, ErrorKind, SelectError};
pub use probe::{ProbeLoader, ProbePair, ProbeReport};
pub use token::{change_token, LoadRequest};

/// Selector value meaning "apply nothing".
pub const SENTINEL_NONE: &str = "None";

/// Lowest accepted strength.
pub const STRENGTH_MIN: f64 = 0.0;
/// Highest accepted strength.
pub const STRENGTH_MAX: f64 = 2.0;
/// Strength a host should preselect.
pub const STRENGTH_DEFAULT: f64 = 1.0;
/// Granularity a host slider should use.
pub const STRENGTH_STEP: f64 = 0.1;

/// Whether `name` is the "apply nothing" selector (ASCII case-insensitive).
#[must_use]
pub fn is_sentinel(name: &str) -> bool {
    name.eq_ignore_ascii_case(SENTINEL_NONE)
}

/// Selector choices: the sentinel, then every internal name in scan order.
#[must_use]
pub fn choices(records: &[CatalogRecord]) -> Vec<String> {
    std::iter::once(SENTINEL_NONE.to_string())
        .chain(records.iter().map(|r| r.internal_name.clone()))
        .collect()
}

/// Records whose display name or tags match `keyword`, in scan order.
#[must_use]
pub fn search<'a>(records: &'a [CatalogRecord], keyword: &str) -> Vec<&'a CatalogRecord> {
    records.iter().filter(|r| r.matches(keyword)).collect()
}
