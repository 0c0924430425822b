//! Document hashing for change correlation.
//!
//! Digests are computed over the canonical JSON rendering of a payload so
//! the same document always yields the same digest, whatever the YAML
//! formatting of its source file.

use sha2::{Digest, Sha256};

/// Hasher for computing service document digests.
#[derive(Debug, Default)]
pub struct DocumentHasher;

impl DocumentHasher {
    /// Creates a new document hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the hex-encoded SHA-256 digest of a payload.
    #[must_use]
    pub fn digest(&self, payload: &serde_json::Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(canonicalize(payload).to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Rebuilds objects with their keys sorted, recursively.
fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter()
                .map(|k| (k.clone(), canonicalize(&map[k])))
                .collect::<serde_json::Map<_, _>>()
                .into()
        }
        serde_json::Value::Array(items) => items.iter().map(canonicalize).collect(),
        other => other.clone(),
    }
}
