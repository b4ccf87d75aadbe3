//! AttemptCoordinator: drives one entry's resolution from a ranked
//! candidate list to a terminal outcome, feeding every decisive attempt
//! back into the stats ledger.
//!
//! Per-entry state machine: Pending -> Attempting -> Resolved | Exhausted.
//! A `failed` attempt records a failure and moves to the next candidate; an
//! infrastructure `error` is retried once and then skipped without touching
//! the ledger. Distinct entries resolve fully in parallel; within one entry
//! attempts are strictly sequential. No lock is held across an attempt.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use rayon::prelude::*;

use crate::attempt::{AttemptOutcome, Attempter};
use crate::entry::Entry;
use crate::hashtype::HashType;
use crate::ledger::StatsLedger;
use crate::rank::rank_candidates;
use crate::store::{EntryStore, StoreError};

/// Cooperative cancellation flag, checked before each candidate attempt.
/// Outcomes already recorded are never rolled back.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal outcome of one resolution request. `Cancelled` leaves the
/// entry unresolved and re-resolvable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { hash_type: HashType, pwd: String },
    Exhausted,
    Cancelled,
}

pub struct AttemptCoordinator<'a> {
    store: &'a EntryStore,
    ledger: &'a StatsLedger,
    attempter: &'a dyn Attempter,
}

impl<'a> AttemptCoordinator<'a> {
    pub fn new(
        store: &'a EntryStore,
        ledger: &'a StatsLedger,
        attempter: &'a dyn Attempter,
    ) -> Self {
        Self {
            store,
            ledger,
            attempter,
        }
    }

    /// Resolve one entry. `candidates` is the universe of plausible types;
    /// when empty, candidates are inferred from the digest length.
    /// Resolving an already-resolved entry returns the stored resolution
    /// without invoking the attempt capability.
    pub fn resolve(
        &self,
        id: u64,
        candidates: &[HashType],
        cancel: &CancelFlag,
    ) -> Result<Resolution, StoreError> {
        let entry = self.store.get(id)?;
        if entry.is_resolved() {
            if let Some(hash_type) = HashType::from_tag(&entry.hash_type) {
                debug!("entry {id} already resolved as {hash_type}");
                return Ok(Resolution::Resolved {
                    hash_type,
                    pwd: entry.pwd,
                });
            }
            // foreign tag from an import; treat as unresolved and re-try
        }

        let candidates = if candidates.is_empty() {
            entry.inferred_candidates()
        } else {
            candidates.to_vec()
        };
        let ranked = rank_candidates(&self.ledger.snapshot(), &candidates);
        debug!("entry {id}: trying {} candidates", ranked.len());

        for hash_type in ranked {
            if cancel.is_cancelled() {
                debug!("entry {id}: cancelled before {hash_type}");
                return Ok(Resolution::Cancelled);
            }
            match self.try_candidate(&entry, hash_type) {
                Some(AttemptOutcome::Succeeded(pwd)) => {
                    self.ledger.record_outcome(hash_type, true);
                    let updated = self.store.update(id, |e| e.resolve(hash_type, &pwd))?;
                    debug!("entry {id}: resolved as {hash_type}");
                    return Ok(Resolution::Resolved {
                        hash_type,
                        pwd: updated.pwd,
                    });
                }
                Some(AttemptOutcome::Failed) => {
                    self.ledger.record_outcome(hash_type, false);
                }
                _ => {} // second error: candidate skipped, ledger untouched
            }
        }
        Ok(Resolution::Exhausted)
    }

    /// Run one candidate, retrying a single time on an infrastructure
    /// error. Returns `None` when both invocations errored.
    fn try_candidate(&self, entry: &Entry, hash_type: HashType) -> Option<AttemptOutcome> {
        match self.attempter.attempt(entry, hash_type) {
            AttemptOutcome::Error(reason) => {
                warn!(
                    "attempt error for entry {} under {hash_type}: {reason}; retrying",
                    entry.id
                );
                match self.attempter.attempt(entry, hash_type) {
                    AttemptOutcome::Error(reason) => {
                        warn!(
                            "attempt error persists for entry {} under {hash_type}: {reason}; skipping candidate",
                            entry.id
                        );
                        None
                    }
                    outcome => Some(outcome),
                }
            }
            outcome => Some(outcome),
        }
    }

    /// Resolve entries one after another.
    pub fn resolve_all(
        &self,
        ids: &[u64],
        cancel: &CancelFlag,
    ) -> Vec<(u64, Result<Resolution, StoreError>)> {
        ids.iter()
            .map(|&id| (id, self.resolve(id, &[], cancel)))
            .collect()
    }

    /// Resolve distinct entries fully in parallel. Ordering between
    /// entries is not guaranteed beyond the returned vector's order.
    pub fn resolve_all_parallel(
        &self,
        ids: &[u64],
        cancel: &CancelFlag,
    ) -> Vec<(u64, Result<Resolution, StoreError>)> {
        ids.par_iter()
            .map(|&id| (id, self.resolve(id, &[], cancel)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    /// Scripted attempter: a queue of outcomes per hash type, plus a call
    /// counter for idempotence checks.
    struct Scripted {
        outcomes: Mutex<HashMap<u32, Vec<AttemptOutcome>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(script: &[(HashType, &[AttemptOutcome])]) -> Self {
            let outcomes = script
                .iter()
                .map(|(t, seq)| (t.id(), seq.to_vec()))
                .collect();
            Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Attempter for Scripted {
        fn attempt(&self, _entry: &Entry, hash_type: HashType) -> AttemptOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut outcomes = self.outcomes.lock().unwrap();
            let queue = outcomes.entry(hash_type.id()).or_default();
            if queue.is_empty() {
                AttemptOutcome::Failed
            } else {
                queue.remove(0)
            }
        }
    }

    fn store_with_one_sha1_length_entry() -> (EntryStore, u64) {
        let store = EntryStore::new();
        let id = store.create(Entry::new(&"a".repeat(40), "test")).unwrap();
        (store, id)
    }

    #[test]
    fn fail_then_succeed_resolves_with_the_second_candidate() {
        let (store, id) = store_with_one_sha1_length_entry();
        let ledger = StatsLedger::default();
        // candidates by length: SHA1 (id 1) then RIPEMD160 (id 3)
        let scripted = Scripted::new(&[
            (HashType::Sha1, &[AttemptOutcome::Failed]),
            (
                HashType::Ripemd160,
                &[AttemptOutcome::Succeeded("pw".to_string())],
            ),
        ]);
        let coordinator = AttemptCoordinator::new(&store, &ledger, &scripted);

        let resolution = coordinator.resolve(id, &[], &CancelFlag::new()).unwrap();
        assert_eq!(
            resolution,
            Resolution::Resolved {
                hash_type: HashType::Ripemd160,
                pwd: "pw".to_string()
            }
        );
        let entry = store.get(id).unwrap();
        assert_eq!(entry.hash_type, "RIPEMD160");
        assert_eq!(entry.pwd, "pw");
        assert_eq!(ledger.get(HashType::Sha1).success_rate, 0.0);
        assert_eq!(ledger.get(HashType::Ripemd160).success_rate, 1.0);
    }

    #[test]
    fn all_failures_exhaust_without_mutating_the_store() {
        let (store, id) = store_with_one_sha1_length_entry();
        let ledger = StatsLedger::default();
        let scripted = Scripted::new(&[]);
        let coordinator = AttemptCoordinator::new(&store, &ledger, &scripted);

        let resolution = coordinator.resolve(id, &[], &CancelFlag::new()).unwrap();
        assert_eq!(resolution, Resolution::Exhausted);
        let entry = store.get(id).unwrap();
        assert!(entry.hash_type.is_empty());
        assert!(entry.pwd.is_empty());
        assert_eq!(ledger.get(HashType::Sha1).success_rate, 0.0);
        assert_eq!(ledger.get(HashType::Ripemd160).success_rate, 0.0);
    }

    #[test]
    fn re_resolving_a_resolved_entry_is_a_no_op() {
        let (store, id) = store_with_one_sha1_length_entry();
        let ledger = StatsLedger::default();
        let scripted = Scripted::new(&[(
            HashType::Sha1,
            &[AttemptOutcome::Succeeded("pw".to_string())],
        )]);
        let coordinator = AttemptCoordinator::new(&store, &ledger, &scripted);

        let first = coordinator.resolve(id, &[], &CancelFlag::new()).unwrap();
        let calls_after_first = scripted.calls();
        let second = coordinator.resolve(id, &[], &CancelFlag::new()).unwrap();
        assert_eq!(first, second);
        assert_eq!(scripted.calls(), calls_after_first);
    }

    #[test]
    fn infrastructure_errors_retry_once_then_skip_without_stats() {
        let (store, id) = store_with_one_sha1_length_entry();
        let ledger = StatsLedger::default();
        let err = || AttemptOutcome::Error("backend down".to_string());
        let scripted = Scripted::new(&[
            (HashType::Sha1, &[err(), err()]),
            (
                HashType::Ripemd160,
                &[err(), AttemptOutcome::Succeeded("pw".to_string())],
            ),
        ]);
        let coordinator = AttemptCoordinator::new(&store, &ledger, &scripted);

        let resolution = coordinator.resolve(id, &[], &CancelFlag::new()).unwrap();
        assert_eq!(
            resolution,
            Resolution::Resolved {
                hash_type: HashType::Ripemd160,
                pwd: "pw".to_string()
            }
        );
        // sha1 double-errored: skipped, no ledger record
        assert_eq!(ledger.get(HashType::Sha1).success_rate, 0.5);
        assert_eq!(ledger.recorded_types(), 1);
    }

    #[test]
    fn cancellation_stops_before_the_next_attempt() {
        let (store, id) = store_with_one_sha1_length_entry();
        let ledger = StatsLedger::default();
        let scripted = Scripted::new(&[]);
        let coordinator = AttemptCoordinator::new(&store, &ledger, &scripted);

        let cancel = CancelFlag::new();
        cancel.cancel();
        let resolution = coordinator.resolve(id, &[], &cancel).unwrap();
        assert_eq!(resolution, Resolution::Cancelled);
        assert_eq!(scripted.calls(), 0);
        assert_eq!(ledger.recorded_types(), 0);
    }

    #[test]
    fn missing_entry_surfaces_not_found() {
        let store = EntryStore::new();
        let ledger = StatsLedger::default();
        let scripted = Scripted::new(&[]);
        let coordinator = AttemptCoordinator::new(&store, &ledger, &scripted);
        assert_eq!(
            coordinator.resolve(42, &[], &CancelFlag::new()),
            Err(StoreError::NotFound(42))
        );
    }

    #[test]
    fn explicit_candidates_override_inference() {
        let (store, id) = store_with_one_sha1_length_entry();
        let ledger = StatsLedger::default();
        let scripted = Scripted::new(&[(
            HashType::Sha256,
            &[AttemptOutcome::Succeeded("pw".to_string())],
        )]);
        let coordinator = AttemptCoordinator::new(&store, &ledger, &scripted);

        let resolution = coordinator
            .resolve(id, &[HashType::Sha256], &CancelFlag::new())
            .unwrap();
        assert!(matches!(resolution, Resolution::Resolved { hash_type, .. }
            if hash_type == HashType::Sha256));
    }

    #[test]
    fn parallel_resolution_covers_every_entry() {
        let store = EntryStore::new();
        let ledger = StatsLedger::default();
        let mut ids = Vec::new();
        for n in 0..16 {
            ids.push(
                store
                    .create(Entry::new(&format!("{n:032x}"), "test"))
                    .unwrap(),
            );
        }
        let scripted = Scripted::new(&[]);
        let coordinator = AttemptCoordinator::new(&store, &ledger, &scripted);
        let results = coordinator.resolve_all_parallel(&ids, &CancelFlag::new());
        assert_eq!(results.len(), ids.len());
        assert!(
            results
                .iter()
                .all(|(_, r)| matches!(r, Ok(Resolution::Exhausted)))
        );
    }
}
