//! Input loading: hash lists into the store, known `hash:plaintext` pairs,
//! and bulk generation of fully-hashed entries from plaintext lists.
use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use log::{debug, warn};
use rayon::prelude::*;

use crate::digest::digest_hex;
use crate::entry::Entry;
use crate::hashtype::HashType;
use crate::io::{collect_words, iter_lines_auto};
use crate::store::{EntryStore, StoreError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("malformed hash line: {0}")]
    MalformedLine(String),
}

/// Parse one hash-list line: `hash` or `hash:source`. A missing or empty
/// source falls back to `default_source`.
pub fn parse_hash_line(line: &str, default_source: &str) -> Result<Entry, IngestError> {
    let (hash, source) = match line.split_once(':') {
        Some((h, s)) => (h.trim(), s.trim()),
        None => (line.trim(), ""),
    };
    if hash.is_empty() {
        return Err(IngestError::MalformedLine(line.to_string()));
    }
    let source = if source.is_empty() {
        default_source
    } else {
        source
    };
    Ok(Entry::new(hash, source))
}

/// Parse one known-pair line: `hash:plaintext`. Only the first colon
/// splits, so plaintexts may contain colons.
pub fn parse_known_line(line: &str) -> Result<(String, String), IngestError> {
    match line.split_once(':') {
        Some((hash, pw)) if !hash.trim().is_empty() => {
            Ok((hash.trim().to_lowercase(), pw.trim().to_string()))
        }
        _ => Err(IngestError::MalformedLine(line.to_string())),
    }
}

/// Stream hash-list files into the store. Malformed or non-hex lines are
/// counted and skipped, not fatal. Returns the number of entries created.
pub fn load_hash_files<P: AsRef<Path>>(
    store: &EntryStore,
    paths: &[P],
    threshold_bytes: u64,
) -> Result<usize> {
    let mut created = 0usize;
    let mut skipped = 0usize;
    for p in paths {
        let source = p.as_ref().display().to_string();
        for line in iter_lines_auto(p, threshold_bytes)?.flatten() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let entry = match parse_hash_line(trimmed, &source) {
                Ok(e) => e,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            match store.create(entry) {
                Ok(_) => created += 1,
                Err(StoreError::Invalid(e)) => {
                    debug!("skipping line {trimmed:?}: {e}");
                    skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    if skipped > 0 {
        warn!("skipped {skipped} malformed hash lines");
    }
    Ok(created)
}

/// Merge known `hash:plaintext` files into one map, later files winning.
pub fn load_known_pairs<P: AsRef<Path>>(
    paths: &[P],
    threshold_bytes: u64,
) -> Result<HashMap<String, String>> {
    let mut pairs = HashMap::new();
    for p in paths {
        for line in iter_lines_auto(p, threshold_bytes)?.flatten() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Ok((hash, pw)) = parse_known_line(trimmed) {
                pairs.insert(hash, pw);
            }
        }
    }
    Ok(pairs)
}

/// Hash each plaintext under every supported type, producing resolved
/// entries tagged `source = "generated"`. Work fans out across the rayon
/// pool; a long wordlist is the dominant cost here.
pub fn entries_from_passwords(passwords: &[String]) -> Vec<Entry> {
    passwords
        .par_iter()
        .flat_map_iter(|pw| {
            HashType::ALL.iter().map(move |&t| {
                let mut entry = Entry::new(&digest_hex(t, pw), "generated");
                entry.resolve(t, pw);
                entry
            })
        })
        .collect()
}

/// Generate and batch-insert entries for every word in the given lists.
/// Returns the number of entries created.
pub fn generate_from_wordlists<P: AsRef<Path>>(
    store: &EntryStore,
    paths: &[P],
    threshold_bytes: u64,
) -> Result<usize> {
    let words = collect_words(paths, threshold_bytes)?;
    let entries = entries_from_passwords(&words);
    let count = entries.len();
    store.create_batch(entries)?;
    debug!("generated {count} entries from {} words", words.len());
    Ok(count)
}
