//! Export helpers for writing results to CSV and plain text files.
//!
//! - `save_entries_csv` writes every entry in the serde wire shape
//!   (`id,pwd,hash,type,source`).
//! - `save_stats_csv` writes one `HashStats` row per recorded type
//!   (`ID,SuccessRate,FailureRate,UpdatedAt`).
//! - `save_recovered_txt` writes `hash:plaintext` for resolved entries,
//!   a format other tooling can consume directly as a known-pairs file.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use csv::Writer;

use crate::ledger::StatsLedger;
use crate::store::EntryStore;

pub fn save_entries_csv<P: AsRef<Path>>(store: &EntryStore, path: P) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    for entry in store.list() {
        wtr.serialize(&entry)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_stats_csv<P: AsRef<Path>>(ledger: &StatsLedger, path: P) -> Result<()> {
    let mut rows: Vec<_> = ledger.snapshot().into_values().collect();
    rows.sort_by_key(|s| s.id);
    let mut wtr = Writer::from_path(path)?;
    for stats in rows {
        wtr.serialize(&stats)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_recovered_txt<P: AsRef<Path>>(store: &EntryStore, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    for entry in store.list() {
        if entry.is_resolved() {
            writeln!(f, "{}:{}", entry.hash, entry.pwd)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;
    use crate::hashtype::HashType;
    use tempfile::tempdir;

    #[test]
    fn writes_entries_stats_and_recovered_files() {
        let store = EntryStore::new();
        let resolved_id = store
            .create(Entry::new("d41d8cd98f00b204e9800998ecf8427e", "import"))
            .unwrap();
        store
            .create(Entry::new(&"f".repeat(32), "import"))
            .unwrap();
        store
            .update(resolved_id, |e| e.resolve(HashType::Md5, "pw"))
            .unwrap();

        let ledger = StatsLedger::default();
        ledger.record_outcome(HashType::Md5, true);
        ledger.record_outcome(HashType::Sha1, false);

        let dir = tempdir().unwrap();
        let entries_path = dir.path().join("entries.csv");
        let stats_path = dir.path().join("stats.csv");
        let recovered_path = dir.path().join("recovered.txt");
        save_entries_csv(&store, &entries_path).unwrap();
        save_stats_csv(&ledger, &stats_path).unwrap();
        save_recovered_txt(&store, &recovered_path).unwrap();

        let entries = std::fs::read_to_string(entries_path).unwrap();
        assert!(entries.starts_with("id,pwd,hash,type,source"));
        assert!(entries.contains("d41d8cd98f00b204e9800998ecf8427e"));

        let stats = std::fs::read_to_string(stats_path).unwrap();
        assert!(stats.starts_with("ID,SuccessRate,FailureRate,UpdatedAt"));
        assert_eq!(stats.lines().count(), 3); // header + md5 + sha1

        let recovered = std::fs::read_to_string(recovered_path).unwrap();
        assert_eq!(
            recovered.trim(),
            "d41d8cd98f00b204e9800998ecf8427e:pw"
        );
    }
}
