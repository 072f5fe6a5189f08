//! Seedable xorshift64 generator for emitter randomness.
//! Deterministic per seed, so recorded frames replay identically.

#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Random number in [0, upper_bound). Returns 0 for a zero bound.
    pub fn next_int(&mut self, upper_bound: u32) -> u32 {
        if upper_bound == 0 {
            return 0;
        }
        (self.next_u64() % upper_bound as u64) as u32
    }

    /// Uniform float in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        // Top 24 bits fill the f32 mantissa exactly.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform float in [min, max). Swapped bounds are accepted.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }
}
