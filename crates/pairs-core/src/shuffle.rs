use crate::rng::Rng;

/// Uniform random permutations (Fisher–Yates, swapping from the end)
#[derive(Debug, Clone, Default)]
pub struct Shuffler {
    rng: Rng,
}

impl Shuffler {
    pub fn new() -> Self {
        Self { rng: Rng::new() }
    }

    /// Create a shuffler with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
        }
    }

    /// Return a shuffled copy of `items`. The input is left untouched.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let j = self.rng.below(i + 1);
            out.swap(i, j);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sorted<T: Ord + Clone>(items: &[T]) -> Vec<T> {
        let mut v = items.to_vec();
        v.sort();
        v
    }

    #[test]
    fn test_shuffle_keeps_multiset() {
        let mut shuffler = Shuffler::with_seed(42);
        let input = vec![1, 1, 2, 3, 3, 3, 4, 5, 9, 9];
        for _ in 0..20 {
            let out = shuffler.shuffle(&input);
            assert_eq!(out.len(), input.len());
            assert_eq!(sorted(&out), sorted(&input));
        }
    }

    #[test]
    fn test_shuffle_does_not_mutate_input() {
        let mut shuffler = Shuffler::with_seed(1);
        let input = vec!['a', 'b', 'c', 'd'];
        let _ = shuffler.shuffle(&input);
        assert_eq!(input, vec!['a', 'b', 'c', 'd']);
    }

    #[test]
    fn test_short_inputs_unchanged() {
        let mut shuffler = Shuffler::new();
        let empty: Vec<u8> = Vec::new();
        assert!(shuffler.shuffle(&empty).is_empty());
        assert_eq!(shuffler.shuffle(&[7]), vec![7]);
    }

    #[test]
    fn test_every_permutation_shows_up() {
        // 3! = 6 permutations, each should appear roughly 1/6 of the time
        let mut shuffler = Shuffler::with_seed(2024);
        let mut counts: HashMap<Vec<u8>, usize> = HashMap::new();
        let trials = 6000;
        for _ in 0..trials {
            *counts.entry(shuffler.shuffle(&[0u8, 1, 2])).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        for (perm, count) in counts {
            assert!(
                (700..=1300).contains(&count),
                "permutation {:?} drawn {} times",
                perm,
                count
            );
        }
    }

    #[test]
    fn test_same_seed_same_order() {
        let input: Vec<u32> = (0..16).collect();
        let a = Shuffler::with_seed(5).shuffle(&input);
        let b = Shuffler::with_seed(5).shuffle(&input);
        assert_eq!(a, b);
    }
}
