//! Content hashing for compiled-query fingerprints.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::compile::CompileOptions;
use crate::intent::QueryIntent;

/// Compute SHA256 hash of a serializable value.
///
/// The value is serialized to JSON before hashing, ensuring deterministic output.
/// Returns a 64-character lowercase hexadecimal string.
///
/// # Errors
/// Returns an error if the value cannot be serialized to JSON.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    intent: &'a QueryIntent,
    options: &'a CompileOptions,
}

/// Fingerprint of everything that determines the SQL for one catalog:
/// the intent and the compile options.
pub fn fingerprint(
    intent: &QueryIntent,
    options: &CompileOptions,
) -> Result<String, serde_json::Error> {
    compute_hash(&FingerprintInput { intent, options })
}
