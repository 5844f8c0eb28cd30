//! Change-detection tokens for host caching layers.
//!
//! A host that memoizes node outputs asks for a token before re-running an
//! invocation; identical arguments give identical tokens, any differing
//! argument gives a different one.

use serde::{ser::Error as _, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Arguments of a load invocation, as seen by a host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadRequest {
    /// Selected internal name, or the sentinel.
    pub lora_name: String,
    /// Strength applied to both halves of the pair. Must be finite.
    #[serde(serialize_with = "finite")]
    pub strength: f64,
}

/// JSON has no encoding for NaN or infinities.
fn finite<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !value.is_finite() {
        return Err(S::Error::custom(format!("strength {value} is not finite")));
    }
    serializer.serialize_f64(*value)
}

impl LoadRequest {
    /// New request.
    pub fn new(lora_name: impl Into<String>, strength: f64) -> Self {
        Self {
            lora_name: lora_name.into(),
            strength,
        }
    }

    /// Token for this request.
    ///
    /// # Errors
    ///
    /// Fails when `strength` is NaN or infinite.
    pub fn change_token(&self) -> Result<String, serde_json::Error> {
        change_token(self)
    }
}

/// SHA-256 hex digest of the compact JSON encoding of `args`.
///
/// # Errors
///
/// Returns an error if `args` cannot be serialized.
pub fn change_token<T: Serialize + ?Sized>(args: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(args)?;
    let digest = Sha256::digest(&json);
    Ok(format!("{:x}", digest))
}
