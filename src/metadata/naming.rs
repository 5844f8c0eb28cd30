//! Fallback display names derived from file names.

use std::collections::BTreeMap;

/// Built-in token substitutions: version and category markers.
pub const DEFAULT_SUBSTITUTIONS: [(&str, &str); 4] = [
    ("v1", "版本1"),
    ("v2", "版本2"),
    ("portrait", "肖像"),
    ("landscape", "风景"),
];

/// Token substitution table used by [`derive_display_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTable {
    substitutions: BTreeMap<String, String>,
}

impl Default for NameTable {
    fn default() -> Self {
        Self {
            substitutions: DEFAULT_SUBSTITUTIONS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }
}

impl NameTable {
    /// A table with no substitutions at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            substitutions: BTreeMap::new(),
        }
    }

    /// Add or override entries; later entries win.
    #[must_use]
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (token, label) in overrides {
            self.substitutions.insert(token.into(), label.into());
        }
        self
    }

    /// Replacement for a single token, if any.
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.substitutions.get(token).map(String::as_str)
    }

    /// Derive a display name from a raw file name.
    ///
    /// The extension is stripped, the rest split on `_`, each token mapped
    /// through the table and the results concatenated without a separator.
    /// Different raw names may produce the same display name.
    #[must_use]
    pub fn derive_display_name(&self, raw_filename: &str) -> String {
        let stem = strip_extension(raw_filename);
        stem.split('_')
            .map(|token| self.lookup(token).unwrap_or(token))
            .collect()
    }
}

/// [`NameTable::derive_display_name`] with the built-in table.
#[must_use]
pub fn derive_display_name(raw_filename: &str) -> String {
    NameTable::default().derive_display_name(raw_filename)
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        // A leading dot marks a hidden file, not an extension.
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}
