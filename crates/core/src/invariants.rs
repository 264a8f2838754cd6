//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{Prize, WinRecord};
use crate::reel::Landing;

/// Validate that a prize's stock is within bounds
pub fn assert_prize_invariants(prize: &Prize) {
    debug_assert!(
        prize.remaining <= prize.total,
        "Prize {} has {} remaining but only {} in total",
        prize.name,
        prize.remaining,
        prize.total
    );

    debug_assert!(
        prize.id != Uuid::nil(),
        "Prize {} has nil id",
        prize.name
    );
}

/// Validate that no candidate holds more than one win
pub fn assert_no_double_win(records: &[WinRecord]) {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        debug_assert!(
            seen.insert(record.candidate.id),
            "Candidate {} ({}) has more than one win",
            record.candidate.name,
            record.candidate.id
        );
    }
}

/// Validate a landing strip before a reel animates onto it
pub fn assert_landing_invariants(landing: &Landing) {
    debug_assert!(
        landing.winner_index < landing.items.len(),
        "Winner index {} outside strip of {}",
        landing.winner_index,
        landing.items.len()
    );

    if let Some(tease) = landing.tease_index {
        debug_assert!(
            tease < landing.winner_index,
            "Tease stop {} is not before the winner {}",
            tease,
            landing.winner_index
        );

        // The near miss must never be the actual winner
        debug_assert!(
            landing.items[tease].id != landing.items[landing.winner_index].id,
            "Tease candidate {} is the winner",
            landing.items[tease].name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candidate;

    fn make_landing() -> Landing {
        let a = Candidate::new("Ada", "ada@example.com");
        let b = Candidate::new("Bo", "bo@example.com");
        Landing {
            items: vec![b.clone(), a.clone(), b],
            tease_index: Some(0),
            winner_index: 1,
        }
    }

    #[test]
    fn test_valid_prize() {
        let mut prize = Prize::new("Mug", 2);
        assert_prize_invariants(&prize);
        prize.take_one().unwrap();
        assert_prize_invariants(&prize);
    }

    #[test]
    #[should_panic(expected = "remaining but only")]
    fn test_overstocked_prize() {
        let mut prize = Prize::new("Mug", 1);
        prize.remaining = 2;
        assert_prize_invariants(&prize);
    }

    #[test]
    fn test_distinct_winners() {
        let prize = Prize::new("Mug", 2);
        let records = vec![
            WinRecord::new(Candidate::new("A", "a@x.io"), prize.clone(), true),
            WinRecord::new(Candidate::new("B", "b@x.io"), prize, true),
        ];
        assert_no_double_win(&records);
    }

    #[test]
    #[should_panic(expected = "more than one win")]
    fn test_double_win() {
        let prize = Prize::new("Mug", 2);
        let winner = Candidate::new("A", "a@x.io");
        let records = vec![
            WinRecord::new(winner.clone(), prize.clone(), true),
            WinRecord::new(winner, prize, true),
        ];
        assert_no_double_win(&records);
    }

    #[test]
    fn test_valid_landing() {
        assert_landing_invariants(&make_landing());
    }

    #[test]
    #[should_panic(expected = "is the winner")]
    fn test_tease_is_winner() {
        let mut landing = make_landing();
        landing.items[0] = landing.items[1].clone();
        assert_landing_invariants(&landing);
    }
}
