//! Human-readable report rendering for terminal output.
//!
//! Produces a colored summary covering entry counts, the per-type success
//! rate table (in ranked order), resolution outcomes, and the most reused
//! recovered passwords.
use std::collections::HashMap;

use colored::*;

use crate::coordinator::Resolution;
use crate::hashtype::HashType;
use crate::ledger::StatsLedger;
use crate::rank::rank_candidates;
use crate::store::EntryStore;

fn visible_len(s: &str) -> usize {
    // count printable chars, skipping ANSI color sequences
    let mut len = 0;
    let mut in_escape = false;
    for ch in s.chars() {
        if in_escape {
            if ch == 'm' {
                in_escape = false;
            }
        } else if ch == '\u{1b}' {
            in_escape = true;
        } else {
            len += 1;
        }
    }
    len
}

fn section_header(title: &str) -> String {
    format!("\n{}\n{}\n\n", title, "─".repeat(visible_len(title)))
}

/// Top-N most reused recovered passwords, count descending then plaintext
/// ascending so the ordering is stable.
pub fn top_recovered_passwords(store: &EntryStore, top_n: usize) -> Vec<(String, usize)> {
    use std::cmp::Reverse;
    let mut freq: HashMap<String, usize> = HashMap::new();
    for entry in store.list() {
        if entry.is_resolved() {
            *freq.entry(entry.pwd).or_insert(0) += 1;
        }
    }
    let mut items: Vec<(String, usize)> = freq.into_iter().collect();
    items.sort_by(|a, b| (Reverse(a.1), &a.0).cmp(&(Reverse(b.1), &b.0)));
    items.truncate(top_n);
    items
}

pub fn render_summary(
    store: &EntryStore,
    ledger: &StatsLedger,
    results: &[(u64, Resolution)],
) -> String {
    render_summary_with_top(store, ledger, results, 10)
}

pub fn render_summary_with_top(
    store: &EntryStore,
    ledger: &StatsLedger,
    results: &[(u64, Resolution)],
    top_n: usize,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        "HashHound: Adaptive Hash Resolution Results".bold().cyan()
    ));

    // Entry statistics
    let entries = store.list();
    let resolved = entries.iter().filter(|e| e.is_resolved()).count();
    let mut per_type: HashMap<&str, usize> = HashMap::new();
    let mut per_source: HashMap<&str, usize> = HashMap::new();
    for e in &entries {
        if e.is_resolved() {
            *per_type.entry(e.hash_type.as_str()).or_insert(0) += 1;
        }
        *per_source.entry(e.source.as_str()).or_insert(0) += 1;
    }
    out.push_str(&section_header(
        &"Entry Statistics".bold().yellow().to_string(),
    ));
    out.push_str(&format!("Total entries: {}\n", entries.len()));
    out.push_str(&format!("Resolved: {}\n", resolved));
    out.push_str(&format!("Unresolved: {}\n", entries.len() - resolved));
    let mut sources: Vec<_> = per_source.into_iter().collect();
    sources.sort();
    for (source, count) in sources {
        out.push_str(&format!("  {}: {}\n", source, count));
    }

    // Per-type success rates, best first
    out.push_str(&section_header(
        &"Hash Type Success Rates".bold().cyan().to_string(),
    ));
    let snapshot = ledger.snapshot();
    for hash_type in rank_candidates(&snapshot, &HashType::ALL) {
        let resolved_count = per_type.get(hash_type.tag()).copied().unwrap_or(0);
        match snapshot.get(&hash_type.id()) {
            Some(stats) => out.push_str(&format!(
                "{:<10} success {:.3}  failure {:.3}  resolved {}  updated {}\n",
                hash_type.tag().bold().blue(),
                stats.success_rate,
                stats.failure_rate,
                resolved_count,
                stats.updated_at.format("%Y-%m-%d %H:%M:%S"),
            )),
            None => out.push_str(&format!(
                "{:<10} {}\n",
                hash_type.tag().bold().blue(),
                "(no attempts)".dimmed()
            )),
        }
    }

    // Resolution outcomes
    out.push_str(&section_header(
        &"Resolution Outcomes".bold().cyan().to_string(),
    ));
    if results.is_empty() {
        out.push_str("(No resolutions attempted)\n");
    } else {
        let resolved_now = results
            .iter()
            .filter(|(_, r)| matches!(r, Resolution::Resolved { .. }))
            .count();
        let exhausted = results
            .iter()
            .filter(|(_, r)| matches!(r, Resolution::Exhausted))
            .count();
        let cancelled = results
            .iter()
            .filter(|(_, r)| matches!(r, Resolution::Cancelled))
            .count();
        out.push_str(&format!(
            "Resolved {}/{} (exhausted {}, cancelled {})\n",
            resolved_now,
            results.len(),
            exhausted,
            cancelled
        ));
        let mut lines: Vec<String> = Vec::new();
        for (id, resolution) in results {
            if let Resolution::Resolved { hash_type, pwd } = resolution {
                lines.push(format!("  {}: {} ({})", id, pwd.red(), hash_type.tag()));
            }
        }
        lines.sort();
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
    }

    // Top recovered passwords
    out.push_str(&section_header(
        &"Top Recovered Passwords".bold().magenta().to_string(),
    ));
    let top = top_recovered_passwords(store, top_n);
    if top.is_empty() {
        out.push_str("(No recovered passwords)\n");
    } else {
        for (pw, count) in top {
            out.push_str(&format!("  {}: {}\n", pw, count));
        }
    }

    out
}
