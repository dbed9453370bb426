//! Random choice sources.
//!
//! The resolver and the budget planner pick "one of N" through a
//! [`ChoiceSource`] so callers can swap in a seeded or fixed source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;
use std::sync::Mutex;

/// Picks an index in `0..len`.
///
/// Implementations must return `0` when `len` is `0`; callers never index with
/// it in that case.
pub trait ChoiceSource: Send + Sync + Debug {
    fn choose(&self, len: usize) -> usize;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngChoice;

impl ChoiceSource for ThreadRngChoice {
    fn choose(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Uniform choice from a seeded generator; the sequence is reproducible.
#[derive(Debug)]
pub struct SeededChoice {
    rng: Mutex<StdRng>,
}

impl SeededChoice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ChoiceSource for SeededChoice {
    fn choose(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..len)
    }
}

/// Always the same index (wrapped to `len`).
#[derive(Debug, Clone, Copy)]
pub struct FixedChoice(pub usize);

impl ChoiceSource for FixedChoice {
    fn choose(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.0 % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_rng_in_range() {
        let source = ThreadRngChoice;
        for _ in 0..200 {
            assert!(source.choose(3) < 3);
        }
        assert_eq!(source.choose(0), 0);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = SeededChoice::new(42);
        let b = SeededChoice::new(42);
        let seq_a: Vec<usize> = (0..20).map(|_| a.choose(10)).collect();
        let seq_b: Vec<usize> = (0..20).map(|_| b.choose(10)).collect();
        assert_eq!(seq_a, seq_b);
        assert!(seq_a.iter().all(|&i| i < 10));
    }

    #[test]
    fn test_fixed_wraps() {
        assert_eq!(FixedChoice(1).choose(3), 1);
        assert_eq!(FixedChoice(4).choose(3), 1);
        assert_eq!(FixedChoice(4).choose(0), 0);
    }
}
