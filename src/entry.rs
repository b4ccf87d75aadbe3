//! Entry data model: a stored hash record with its recovered plaintext,
//! resolved type tag, and provenance source.
//!
//! Instances are owned by the [`crate::store::EntryStore`], which assigns
//! ids and enforces validation at the storage boundary. The serialized
//! field names (`id`, `pwd`, `hash`, `type`, `source`) are the wire
//! contract consumed by exports and any presentation layer.
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::hashtype::HashType;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("empty hash")]
    EmptyHash,
    #[error("hash is not a hex digest: {0}")]
    NotHex(String),
}

/// A single hash record. `hash` and `source` are fixed at creation;
/// `hash_type` and `pwd` are set once resolution succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u64,
    pub pwd: String,
    pub hash: String,
    #[serde(rename = "type")]
    pub hash_type: String,
    pub source: String,
}

fn hex_pattern() -> &'static Regex {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| Regex::new(r"^[0-9a-f]+$").expect("valid hex pattern"))
}

impl Entry {
    /// Construct an unresolved entry. The hash is trimmed and lowercased
    /// so lookups and deduplication are case-insensitive.
    pub fn new(hash: &str, source: &str) -> Self {
        Self {
            id: 0,
            pwd: String::new(),
            hash: hash.trim().to_lowercase(),
            hash_type: String::new(),
            source: source.trim().to_string(),
        }
    }

    /// An entry is resolved once both the type tag and plaintext are known.
    pub fn is_resolved(&self) -> bool {
        !self.hash_type.is_empty() && !self.pwd.is_empty()
    }

    /// Record a successful resolution.
    pub fn resolve(&mut self, hash_type: HashType, pwd: &str) {
        self.hash_type = hash_type.tag().to_string();
        self.pwd = pwd.to_string();
    }

    /// Plausible types for this entry's digest, by length.
    pub fn inferred_candidates(&self) -> Vec<HashType> {
        HashType::candidates_for(&self.hash)
    }

    /// Boundary validation: the hash must be a non-empty hex string.
    pub fn validate(&self) -> Result<(), EntryError> {
        if self.hash.is_empty() {
            return Err(EntryError::EmptyHash);
        }
        if !hex_pattern().is_match(&self.hash) {
            return Err(EntryError::NotHex(self.hash.clone()));
        }
        Ok(())
    }
}
