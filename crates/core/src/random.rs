//! Injectable randomness
//!
//! Every random decision in the draw (winner pick, tease pick, reel filler,
//! spin hold jitter) goes through [`RandomSource`], so tests can pin the
//! sequence and production can plug in any `rand` generator.

use rand::Rng;

/// Uniform index source
pub trait RandomSource {
    /// Uniform index in `[0, len)`. `len` is never zero.
    fn index(&mut self, len: usize) -> usize;
}

/// Adapter from any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

impl RngSource<rand::rngs::StdRng> {
    /// Deterministic source for rehearsals and tests
    pub fn seeded(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// Source seeded from the operating system
    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::from_entropy())
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn index(&mut self, len: usize) -> usize {
        (**self).index(len)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn index(&mut self, len: usize) -> usize {
        (**self).index(len)
    }
}

/// Fisher-Yates shuffle in place
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

/// Up to `count` distinct items in random order
pub fn sample<T: Clone>(items: &[T], count: usize, rng: &mut dyn RandomSource) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffle(&mut shuffled, rng);
    shuffled.truncate(count);
    shuffled
}

/// One item drawn with replacement
pub fn pick<'a, T>(items: &'a [T], rng: &mut dyn RandomSource) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.index(items.len()))
}

/// Scripted source for tests: replays `values` modulo the requested length,
/// then keeps returning zero
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    values: std::collections::VecDeque<usize>,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(values: &[usize]) -> Self {
        Self {
            values: values.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn index(&mut self, len: usize) -> usize {
        self.values.pop_front().unwrap_or(0) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_source_in_range() {
        let mut rng = RngSource::seeded(7);
        for len in 1..50 {
            assert!(rng.index(len) < len);
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = RngSource::seeded(1);
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_sample_truncates_without_repeats() {
        let mut rng = RngSource::seeded(3);
        let items: Vec<u32> = (0..10).collect();
        let picked = sample(&items, 4, &mut rng);
        assert_eq!(picked.len(), 4);
        let mut dedup = picked.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), 4);

        assert_eq!(sample(&items, 50, &mut rng).len(), 10);
    }

    #[test]
    fn test_scripted_source_wraps() {
        let mut rng = ScriptedSource::new(&[5, 1]);
        assert_eq!(rng.index(3), 2);
        assert_eq!(rng.index(3), 1);
        assert_eq!(rng.index(3), 0);
    }

    #[test]
    fn test_pick_empty() {
        let mut rng = RngSource::seeded(0);
        let empty: [u8; 0] = [];
        assert!(pick(&empty, &mut rng).is_none());
    }
}
