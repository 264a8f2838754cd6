//! Landing sequence construction
//!
//! Layout: `[buffer] [tease] [gap] [winner] [tail]`. The reel decelerates
//! onto the tease, holds, then slides on to the real winner.

use crate::models::Candidate;
use crate::random::{pick, RandomSource};
use crate::settings::ReelLayout;

/// The concrete strip a reel lands on
#[derive(Debug, Clone)]
pub struct Landing {
    pub items: Vec<Candidate>,
    /// Index of the false stop. `None` when the pool has no one but the winner.
    pub tease_index: Option<usize>,
    pub winner_index: usize,
}

impl Landing {
    /// Build a landing strip for `winner` from the draw pool.
    ///
    /// The tease is drawn from everyone except the winner, and so is the
    /// filler, so the winner shows up exactly once on the strip. With no one
    /// else in the pool the tease stop is skipped.
    pub fn build(winner: &Candidate, pool: &[Candidate], rng: &mut dyn RandomSource) -> Self {
        let others: Vec<Candidate> = pool.iter().filter(|c| c.id != winner.id).cloned().collect();
        let filler_source: &[Candidate] = if others.is_empty() {
            std::slice::from_ref(winner)
        } else {
            &others
        };

        let filler = |count: usize, rng: &mut dyn RandomSource| -> Vec<Candidate> {
            (0..count)
                .filter_map(|_| pick(filler_source, rng).cloned())
                .collect()
        };

        let mut items = filler(ReelLayout::LANDING_BUFFER, rng);

        let tease_index = match pick(&others, rng) {
            Some(tease) => {
                items.push(tease.clone());
                Some(items.len() - 1)
            }
            None => None,
        };

        items.extend(filler(ReelLayout::LANDING_GAP, rng));
        items.push(winner.clone());
        let winner_index = items.len() - 1;
        items.extend(filler(ReelLayout::LANDING_TAIL, rng));

        Self {
            items,
            tease_index,
            winner_index,
        }
    }

    pub fn winner(&self) -> &Candidate {
        &self.items[self.winner_index]
    }

    pub fn tease(&self) -> Option<&Candidate> {
        self.tease_index.map(|i| &self.items[i])
    }
}
