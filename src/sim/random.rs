//! Randomness for procedural spawning
//!
//! Spawning only ever needs uniform draws in `[0, 1)`, so the source is a
//! one-method trait. Games use a seeded `Pcg32`; tests can script the values.

use rand::Rng;
use rand_pcg::Pcg32;

/// Uniform source of `f32` in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;
}

impl RandomSource for Pcg32 {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Uniform draw from `[min, max]`; a degenerate range yields `min`
pub fn sample<R: RandomSource + ?Sized>(min: f32, max: f32, rng: &mut R) -> f32 {
    if max <= min {
        return min;
    }
    (min + (max - min) * rng.next_unit()).min(max)
}

/// Uniform choice from a non-empty slice
pub fn pick<T: Copy, R: RandomSource + ?Sized>(choices: &[T], rng: &mut R) -> T {
    let last = choices.len().saturating_sub(1);
    let index = (rng.next_unit() * choices.len() as f32) as usize;
    choices[index.min(last)]
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Values are clamped into `[0, 1)`; an empty script always yields 0
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|v| v.clamp(0.0, 1.0 - f32::EPSILON))
                .collect(),
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
