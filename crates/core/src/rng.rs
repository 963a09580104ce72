//! RNG module - segment shuffling for the initial pool
//!
//! A simple LCG drives a Fisher-Yates shuffle. It is deterministic for a given
//! seed (tests and replays) and unbiased for the small ranges a puzzle needs,
//! but it is not cryptographic.
//!
//! The shuffled pool must not give away the answer, so [`SegmentShuffler`]
//! never hands back the canonical order when another order exists.

/// Re-draws attempted before falling back to a rotation.
const MAX_RESHUFFLES: usize = 8;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Draws from the high 16 bits (the low LCG bits have short periods) and
    /// rejects the tail that would bias small ranges.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max <= 1 {
            return 0;
        }
        if max > 1 << 16 {
            return self.next_u32() % max;
        }

        let span = 1u32 << 16;
        let limit = span - span % max;
        loop {
            let v = self.next_u32() >> 16;
            if v < limit {
                return v % max;
            }
        }
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Produces the initial pool order for a puzzle
#[derive(Debug, Clone, Default)]
pub struct SegmentShuffler {
    rng: SimpleRng,
}

impl SegmentShuffler {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Return a permutation of `segments` that differs from the canonical order
    /// whenever the values allow it.
    ///
    /// A single segment, or segments that are all equal, necessarily come back
    /// in canonical order.
    pub fn shuffled(&mut self, segments: &[String]) -> Vec<String> {
        let mut out = segments.to_vec();
        if out.len() < 2 {
            return out;
        }

        for _ in 0..MAX_RESHUFFLES {
            self.rng.shuffle(&mut out);
            if out != segments {
                return out;
            }
        }

        out.rotate_left(1);
        out
    }
}
