//! RNG module - bag randomizer over catalog indices
//!
//! Each bag holds every catalog index exactly once, shuffled. Indices are
//! handed out in bag order; an exhausted bag is replaced by a fresh shuffle.
//! The generator is injected so tests and replays are deterministic.

/// Source of randomness for the sequencer
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Random value in range [0, max)
    fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Shuffle a slice using Fisher-Yates
    fn shuffle<T>(&mut self, slice: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce a degenerate first value
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        // High bits have a much longer period than the low ones
        self.state >> 8
    }
}

/// Bag sequencer producing catalog indices
#[derive(Debug, Clone)]
pub struct SpawnSequencer<R: RandomSource = SimpleRng> {
    bag: Vec<usize>,
    bag_index: usize,
    rng: R,
}

impl SpawnSequencer<SimpleRng> {
    pub fn seeded(count: usize, seed: u32) -> Self {
        Self::new(count, SimpleRng::new(seed))
    }
}

impl<R: RandomSource> SpawnSequencer<R> {
    /// Create a sequencer over indices `0..count`. `count` must be non-zero.
    pub fn new(count: usize, rng: R) -> Self {
        let mut sequencer = Self {
            bag: (0..count).collect(),
            bag_index: 0,
            rng,
        };
        sequencer.refill_bag();
        sequencer
    }

    fn refill_bag(&mut self) {
        for (slot, index) in self.bag.iter_mut().enumerate() {
            *index = slot;
        }
        self.rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    /// Number of indices per bag
    pub fn count(&self) -> usize {
        self.bag.len()
    }

    /// Draw the next index, reshuffling when the bag is exhausted
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> usize {
        if self.bag_index >= self.bag.len() {
            self.refill_bag();
        }
        let index = self.bag[self.bag_index];
        self.bag_index += 1;
        index
    }

    /// Indices left in the current bag
    pub fn remaining(&self) -> &[usize] {
        &self.bag[self.bag_index..]
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }
}

impl<R: RandomSource + Clone> SpawnSequencer<R> {
    /// Peek at the next index without consuming it.
    ///
    /// When the bag is exhausted the following bag is previewed with a clone
    /// of the generator, so the preview matches the next `next()`.
    pub fn peek(&self) -> usize {
        if let Some(&index) = self.bag.get(self.bag_index) {
            return index;
        }
        let mut preview = self.clone();
        preview.next()
    }
}
