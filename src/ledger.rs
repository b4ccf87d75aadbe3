//! StatsLedger: per-hash-type success statistics.
//!
//! Outcomes are folded in with an exponential moving average so recent
//! attempts weigh more than history. Success and failure rates stay
//! complementary and inside [0,1] by construction. A type that has never
//! seen an attempt reads back as the neutral (0.5, 0.5) prior without a
//! record being persisted, so ranking always has a usable score.
//!
//! Same-type writes are serialized through a per-type mutex; writes for
//! distinct types proceed independently. Reads clone and may be slightly
//! stale, which is fine for ranking.
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hashtype::HashType;

/// Default EMA decay factor: each new outcome carries 10% of the weight.
pub const DEFAULT_ALPHA: f64 = 0.1;

/// Per-type statistics record. Serialized field names are the wire
/// contract consumed by exports and the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashStats {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "SuccessRate")]
    pub success_rate: f64,
    #[serde(rename = "FailureRate")]
    pub failure_rate: f64,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl HashStats {
    /// The neutral prior for a type with no recorded history.
    pub fn neutral(hash_type: HashType) -> Self {
        Self {
            id: hash_type.id(),
            success_rate: 0.5,
            failure_rate: 0.5,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn first_outcome(hash_type: HashType, succeeded: bool) -> Self {
        let success_rate = if succeeded { 1.0 } else { 0.0 };
        Self {
            id: hash_type.id(),
            success_rate,
            failure_rate: 1.0 - success_rate,
            updated_at: Utc::now(),
        }
    }
}

/// Snapshot of the ledger table, keyed by hash-type identifier.
pub type StatsSnapshot = HashMap<u32, HashStats>;

#[derive(Debug)]
pub struct StatsLedger {
    alpha: f64,
    table: RwLock<HashMap<u32, Mutex<HashStats>>>,
}

impl Default for StatsLedger {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl StatsLedger {
    /// Create a ledger with the given decay factor. The factor is clamped
    /// into [0,1]; outside that range the EMA would diverge.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            table: RwLock::new(HashMap::new()),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Fold one outcome into the record for `hash_type`, creating it on
    /// first use, and return the updated record.
    pub fn record_outcome(&self, hash_type: HashType, succeeded: bool) -> HashStats {
        let id = hash_type.id();
        {
            let table = self.table.read().expect("stats table lock poisoned");
            if let Some(slot) = table.get(&id) {
                return self.apply(slot, succeeded);
            }
        }
        let mut table = self.table.write().expect("stats table lock poisoned");
        if let Some(slot) = table.get(&id) {
            // another writer created the record between our locks
            return self.apply(slot, succeeded);
        }
        let stats = HashStats::first_outcome(hash_type, succeeded);
        table.insert(id, Mutex::new(stats.clone()));
        stats
    }

    fn apply(&self, slot: &Mutex<HashStats>, succeeded: bool) -> HashStats {
        let mut stats = slot.lock().expect("stats record lock poisoned");
        let observation = if succeeded { 1.0 } else { 0.0 };
        let blended = stats.success_rate * (1.0 - self.alpha) + observation * self.alpha;
        stats.success_rate = blended.clamp(0.0, 1.0);
        stats.failure_rate = 1.0 - stats.success_rate;
        stats.updated_at = Utc::now();
        stats.clone()
    }

    /// Current record for a type, or the neutral prior when unseen.
    /// Reading never creates a record.
    pub fn get(&self, hash_type: HashType) -> HashStats {
        let table = self.table.read().expect("stats table lock poisoned");
        table
            .get(&hash_type.id())
            .map(|slot| slot.lock().expect("stats record lock poisoned").clone())
            .unwrap_or_else(|| HashStats::neutral(hash_type))
    }

    /// Clone the whole table for ranking.
    pub fn snapshot(&self) -> StatsSnapshot {
        let table = self.table.read().expect("stats table lock poisoned");
        table
            .iter()
            .map(|(&id, slot)| {
                let stats = slot.lock().expect("stats record lock poisoned").clone();
                (id, stats)
            })
            .collect()
    }

    /// Number of types with a recorded history.
    pub fn recorded_types(&self) -> usize {
        self.table
            .read()
            .expect("stats table lock poisoned")
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_outcome_sets_extremes() {
        let ledger = StatsLedger::default();
        let s = ledger.record_outcome(HashType::Md5, true);
        assert_eq!(s.success_rate, 1.0);
        assert_eq!(s.failure_rate, 0.0);

        let s = ledger.record_outcome(HashType::Sha1, false);
        assert_eq!(s.success_rate, 0.0);
        assert_eq!(s.failure_rate, 1.0);
    }

    #[test]
    fn rates_stay_complementary_and_bounded() {
        let ledger = StatsLedger::new(0.3);
        let outcomes = [true, false, false, true, true, false, true, true];
        for &ok in &outcomes {
            let s = ledger.record_outcome(HashType::Sha256, ok);
            assert!((s.success_rate + s.failure_rate - 1.0).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&s.success_rate));
            assert!(s.success_rate.is_finite() && s.failure_rate.is_finite());
        }
    }

    #[test]
    fn nine_successes_one_failure_beats_the_prior() {
        let ledger = StatsLedger::new(DEFAULT_ALPHA);
        for _ in 0..9 {
            ledger.record_outcome(HashType::Md5, true);
        }
        let after = ledger.record_outcome(HashType::Md5, false);
        assert!(after.success_rate > 0.5);
        assert!(after.success_rate > ledger.get(HashType::Sha1).success_rate);
    }

    #[test]
    fn get_on_unseen_type_is_neutral_and_side_effect_free() {
        let ledger = StatsLedger::default();
        let s = ledger.get(HashType::Ripemd160);
        assert_eq!(s.success_rate, 0.5);
        assert_eq!(s.failure_rate, 0.5);
        assert_eq!(ledger.recorded_types(), 0);
        assert!(ledger.snapshot().is_empty());
    }

    #[test]
    fn ema_follows_the_update_rule() {
        let ledger = StatsLedger::new(0.1);
        ledger.record_outcome(HashType::Md5, true); // 1.0
        let s = ledger.record_outcome(HashType::Md5, false);
        assert!((s.success_rate - 0.9).abs() < 1e-12);
        let s = ledger.record_outcome(HashType::Md5, true);
        assert!((s.success_rate - (0.9 * 0.9 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn updated_at_moves_forward_on_writes() {
        let ledger = StatsLedger::default();
        let before = Utc::now();
        let s = ledger.record_outcome(HashType::Md5, true);
        assert!(s.updated_at >= before);
        assert!(HashStats::neutral(HashType::Md5).updated_at < before);
    }

    #[test]
    fn concurrent_same_type_writes_all_land() {
        use std::sync::Arc;
        let ledger = Arc::new(StatsLedger::default());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    ledger.record_outcome(HashType::Md5, true);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        let s = ledger.get(HashType::Md5);
        assert_eq!(s.success_rate, 1.0);
        assert_eq!(ledger.recorded_types(), 1);
    }
}
