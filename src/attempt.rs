//! The attempt capability boundary.
//!
//! `Attempter` is the opaque crack/lookup primitive the coordinator drives.
//! An infrastructure `Error` outcome is distinct from `Failed`: a broken
//! capability says nothing about the hash type, so the coordinator never
//! records it in the ledger.
//!
//! `DictionaryAttempter` is the built-in implementation: it hashes a word
//! list under the candidate type and looks the entry's digest up in the
//! resulting index. Indexes are built lazily, once per type.
use std::collections::HashMap;
use std::sync::RwLock;

use log::debug;
use rayon::prelude::*;

use crate::digest::digest_hex;
use crate::entry::Entry;
use crate::hashtype::HashType;

/// Result of one attempt against one candidate type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The plaintext was recovered.
    Succeeded(String),
    /// The capability ran and the candidate type did not match.
    Failed,
    /// The capability itself malfunctioned (timeout, backend down).
    Error(String),
}

pub trait Attempter: Sync {
    fn attempt(&self, entry: &Entry, hash_type: HashType) -> AttemptOutcome;
}

/// Wordlist-backed attempter. One digest index per hash type, built on
/// first use for that type.
pub struct DictionaryAttempter {
    words: Vec<String>,
    indexes: RwLock<HashMap<u32, HashMap<String, String>>>,
}

impl DictionaryAttempter {
    /// Build from candidate plaintexts. Order is kept; duplicates are
    /// dropped so index building does not redo work.
    pub fn new(words: Vec<String>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let words = words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty() && seen.insert(w.clone()))
            .collect();
        Self {
            words,
            indexes: RwLock::new(HashMap::new()),
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Look a digest up in the index for `hash_type`, building the index
    /// if this is the first attempt for that type.
    pub fn lookup(&self, hash_type: HashType, hash: &str) -> Option<String> {
        let id = hash_type.id();
        {
            let indexes = self.indexes.read().expect("dictionary index lock poisoned");
            if let Some(index) = indexes.get(&id) {
                return index.get(hash).cloned();
            }
        }
        let built: HashMap<String, String> = self
            .words
            .par_iter()
            .map(|w| (digest_hex(hash_type, w), w.clone()))
            .collect();
        debug!(
            "built {} index over {} words",
            hash_type.tag(),
            self.words.len()
        );
        let mut indexes = self.indexes.write().expect("dictionary index lock poisoned");
        let index = indexes.entry(id).or_insert(built);
        index.get(hash).cloned()
    }
}

impl Attempter for DictionaryAttempter {
    fn attempt(&self, entry: &Entry, hash_type: HashType) -> AttemptOutcome {
        match self.lookup(hash_type, &entry.hash) {
            Some(word) => AttemptOutcome::Succeeded(word),
            None => AttemptOutcome::Failed,
        }
    }
}
