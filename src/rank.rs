//! Candidate ordering over ledger snapshots.
//!
//! Ranking is a pure function of the snapshot and the candidate list, so
//! two calls over the same inputs always produce the same order. Types
//! absent from the snapshot score the neutral prior, which keeps
//! unexplored types competitive with established ones.
use crate::hashtype::HashType;
use crate::ledger::StatsSnapshot;

/// Score for a hash type with no recorded history.
pub const NEUTRAL_PRIOR: f64 = 0.5;

/// Current success score for one candidate.
pub fn score_of(snapshot: &StatsSnapshot, hash_type: HashType) -> f64 {
    snapshot
        .get(&hash_type.id())
        .map(|s| s.success_rate)
        .unwrap_or(NEUTRAL_PRIOR)
}

/// Order candidates by descending success score, ties broken by ascending
/// type identifier. Never fails; empty candidates yield an empty order.
pub fn rank_candidates(snapshot: &StatsSnapshot, candidates: &[HashType]) -> Vec<HashType> {
    let mut scored: Vec<(f64, HashType)> = candidates
        .iter()
        .map(|&t| (score_of(snapshot, t), t))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id().cmp(&b.1.id())));
    scored.into_iter().map(|(_, t)| t).collect()
}
