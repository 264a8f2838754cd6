//! Winner selection
//!
//! Stateless uniform choice over whatever pool the caller passes in.

use crate::error::{Error, Result};
use crate::models::Candidate;
use crate::random::RandomSource;

/// Pick one candidate uniformly at random
pub fn select(eligible: &[Candidate], rng: &mut dyn RandomSource) -> Result<Candidate> {
    if eligible.is_empty() {
        return Err(Error::EmptyPool);
    }
    let index = rng.index(eligible.len());
    Ok(eligible[index].clone())
}

/// Pick `count` pairwise-distinct candidates, one per reel.
///
/// Each pick is removed from the pool before the next one, so no two reels
/// of the same draw can land on the same person.
pub fn select_distinct(
    eligible: &[Candidate],
    count: usize,
    rng: &mut dyn RandomSource,
) -> Result<Vec<Candidate>> {
    if eligible.is_empty() {
        return Err(Error::EmptyPool);
    }
    if count > eligible.len() {
        return Err(Error::NotEnoughCandidates {
            requested: count,
            available: eligible.len(),
        });
    }

    let mut pool = eligible.to_vec();
    let mut winners = Vec::with_capacity(count);
    for _ in 0..count {
        let winner = select(&pool, rng)?;
        pool.retain(|c| c.id != winner.id);
        winners.push(winner);
    }
    Ok(winners)
}
