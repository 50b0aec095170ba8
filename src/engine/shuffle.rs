use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Reshuffle attempts before accepting an arrangement that repeats an avoided one.
const MAX_RESHUFFLES: usize = 8;

/// Source of permutations for pools. Injected so tests can pin the order.
pub trait Shuffler {
    /// A permutation of `0..len`.
    fn permutation(&mut self, len: usize) -> Vec<usize>;
}

pub struct RngShuffler<R> {
    rng: R,
}

impl RngShuffler<SmallRng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RngShuffler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Shuffler for RngShuffler<R> {
    fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.rng);
        order
    }
}

/// Replays the given permutations in order, then yields the identity.
/// Entries whose length does not match the request are skipped.
#[derive(Clone, Debug, Default)]
pub struct ScriptedShuffler {
    script: VecDeque<Vec<usize>>,
}

impl ScriptedShuffler {
    pub fn new(script: Vec<Vec<usize>>) -> Self {
        Self {
            script: script.into(),
        }
    }

    pub fn identity() -> Self {
        Self::default()
    }
}

impl Shuffler for ScriptedShuffler {
    fn permutation(&mut self, len: usize) -> Vec<usize> {
        while let Some(next) = self.script.pop_front() {
            if next.len() == len {
                return next;
            }
        }
        (0..len).collect()
    }
}

/// Shuffle `items`, retrying while the result shows the same sequence as one of `avoid`.
/// Returns the arrangement as indices into `items`.
pub fn arrange<T: PartialEq>(
    shuffler: &mut dyn Shuffler,
    items: &[T],
    avoid: &[&[T]],
) -> Vec<usize> {
    let mut order = shuffler.permutation(items.len());
    for _ in 0..MAX_RESHUFFLES {
        if !avoid.iter().any(|prev| shows_same(items, &order, prev)) {
            break;
        }
        order = shuffler.permutation(items.len());
    }
    order
}

fn shows_same<T: PartialEq>(items: &[T], order: &[usize], shown: &[T]) -> bool {
    order.len() == shown.len() && order.iter().zip(shown).all(|(&idx, prev)| items[idx] == *prev)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(order: &[usize], len: usize) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        sorted == (0..len).collect::<Vec<_>>()
    }

    #[test]
    fn test_rng_shuffler_is_permutation() {
        let mut shuffler = RngShuffler::seeded(7);
        for len in [0, 1, 5, 12] {
            assert!(is_permutation(&shuffler.permutation(len), len));
        }
    }

    #[test]
    fn test_seeded_shuffler_is_deterministic() {
        let mut a = RngShuffler::seeded(42);
        let mut b = RngShuffler::seeded(42);
        assert_eq!(a.permutation(10), b.permutation(10));
    }

    #[test]
    fn test_scripted_shuffler_replays_then_identity() {
        let mut shuffler = ScriptedShuffler::new(vec![vec![2, 0, 1], vec![1, 0]]);
        assert_eq!(shuffler.permutation(3), vec![2, 0, 1]);
        // [1, 0] has the wrong length for 3 and is skipped
        assert_eq!(shuffler.permutation(3), vec![0, 1, 2]);
    }

    #[test]
    fn test_arrange_avoids_listed_arrangement() {
        let items = ["I", "like", "apples"];
        let correct: [&str; 3] = ["I", "like", "apples"];
        let mut shuffler = ScriptedShuffler::new(vec![vec![0, 1, 2], vec![0, 1, 2], vec![1, 2, 0]]);
        let order = arrange(&mut shuffler, &items, &[&correct[..]]);
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_arrange_compares_labels_not_indices() {
        // Swapping two identical words still shows the same sentence.
        let items = ["the", "the", "cat"];
        let shown: [&str; 3] = ["the", "the", "cat"];
        let mut shuffler = ScriptedShuffler::new(vec![vec![1, 0, 2], vec![2, 0, 1]]);
        let order = arrange(&mut shuffler, &items, &[&shown[..]]);
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_arrange_gives_up_on_single_item() {
        let items = ["alone"];
        let shown: [&str; 1] = ["alone"];
        let mut shuffler = RngShuffler::seeded(1);
        assert_eq!(arrange(&mut shuffler, &items, &[&shown[..]]), vec![0]);
    }
}
