//! Eligible candidate pool
//!
//! The pool is always derived, never stored: roster minus everyone who
//! already has a win record. Recomputing it before every draw is what keeps
//! a candidate from winning twice.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{Candidate, WinRecord};

/// Candidates without a win record, in roster order, each at most once
pub fn eligible(candidates: &[Candidate], records: &[WinRecord]) -> Vec<Candidate> {
    let won: HashSet<Uuid> = records.iter().map(|r| r.candidate.id).collect();
    let mut seen = HashSet::with_capacity(candidates.len());

    candidates
        .iter()
        .filter(|c| !won.contains(&c.id) && seen.insert(c.id))
        .cloned()
        .collect()
}

/// Count of eligible candidates without building the list
pub fn eligible_count(candidates: &[Candidate], records: &[WinRecord]) -> usize {
    let won: HashSet<Uuid> = records.iter().map(|r| r.candidate.id).collect();
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .iter()
        .filter(|c| !won.contains(&c.id) && seen.insert(c.id))
        .count()
}
