//! Content keys addressing cached diagnoses

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex characters kept from the digest (64 bits)
const KEY_LEN: usize = 16;

/// Short fixed-length identifier derived from image bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

impl ContentKey {
    /// Reserved key for empty input, never analyzed
    pub const EMPTY: &'static str = "0000000000000000";

    /// Derive the key for `bytes`. Depends on content only.
    pub fn derive(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self(Self::EMPTY.to_string());
        }

        let digest = Sha256::digest(bytes);
        let mut hex = format!("{:x}", digest);
        hex.truncate(KEY_LEN);
        Self(hex)
    }

    pub fn is_analyzable(&self) -> bool {
        self.0 != Self::EMPTY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
