//! Unicode-aware name and path helpers.
//!
//! Internal names come from file names, and macOS stores those in NFD while
//! selectors typed by a user or sent by a host are usually NFC. Names are
//! therefore compared after NFC normalization:
//!
//! ```
//! use loracat::scanner::path_utils::names_equal;
//!
//! assert!(names_equal("café_v1", "cafe\u{0301}_v1"));
//! ```

use std::borrow::Cow;
use std::path::Path;

use unicode_normalization::{is_nfc, UnicodeNormalization};

/// Normalize a name to NFC, borrowing when it already is.
#[must_use]
pub fn normalize_name(s: &str) -> Cow<'_, str> {
    if is_nfc(s) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.nfc().collect())
    }
}

/// Check if two names are equal after NFC normalization.
#[must_use]
pub fn names_equal(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

/// Root-relative form of `path` with `/` separators on every platform.
///
/// Falls back to the full path when `path` is not under `root`.
#[must_use]
pub fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
