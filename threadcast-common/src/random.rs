//! Injectable randomness.
//!
//! Every random decision in a posting run (how many follow-ups to request,
//! which call-to-action phrase to use, which topic to pick, how long to wait
//! between replies) goes through [`RandomSource`] so tests can script them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of the uniform choices a posting run needs.
pub trait RandomSource: Send {
    /// Uniform index in `0..len`. Returns 0 when `len` is 0.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Uniform integer in `lo..=hi`.
    fn int_in(&mut self, lo: u32, hi: u32) -> u32;

    /// Uniform float in `lo..=hi`.
    fn float_in(&mut self, lo: f64, hi: f64) -> f64;
}

/// [`RandomSource`] backed by a seeded [`StdRng`].
pub struct SystemRandom {
    rng: StdRng,
}

impl SystemRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    fn int_in(&mut self, lo: u32, hi: u32) -> u32 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.rng.gen_range(lo..=hi)
    }

    fn float_in(&mut self, lo: f64, hi: f64) -> f64 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.rng.gen_range(lo..=hi)
    }
}

/// Replays a fixed script of choices.
///
/// `choices` feeds [`RandomSource::pick_index`] (taken modulo `len`) and
/// [`RandomSource::int_in`] (as an offset from `lo`, clamped to `hi`).
/// `floats` feeds [`RandomSource::float_in`], clamped into range. An exhausted
/// script yields the lowest value of the requested range.
///
/// ```
/// use threadcast_common::random::{RandomSource, ScriptedRandom};
///
/// let mut rng = ScriptedRandom::new()
///     .with_choices([1, 7])
///     .with_floats([12.5]);
/// assert_eq!(rng.int_in(1, 3), 2);
/// assert_eq!(rng.pick_index(4), 3);
/// assert_eq!(rng.float_in(5.0, 15.0), 12.5);
/// assert_eq!(rng.float_in(5.0, 15.0), 5.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    choices: VecDeque<usize>,
    floats: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_choices(mut self, choices: impl IntoIterator<Item = usize>) -> Self {
        self.choices.extend(choices);
        self
    }

    pub fn with_floats(mut self, floats: impl IntoIterator<Item = f64>) -> Self {
        self.floats.extend(floats);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.choices.pop_front().unwrap_or(0) % len
    }

    fn int_in(&mut self, lo: u32, hi: u32) -> u32 {
        let offset = self.choices.pop_front().unwrap_or(0) as u64;
        (lo as u64 + offset).min(hi as u64) as u32
    }

    fn float_in(&mut self, lo: f64, hi: f64) -> f64 {
        self.floats.pop_front().unwrap_or(lo).clamp(lo, hi)
    }
}
