use super::{CachedGaussian, RandomImpl};

const MULTIPLIER: u64 = 0x5DEECE66D;
const ADDEND: u64 = 0xB;
const MASK: u64 = (1 << 48) - 1;

const FLOAT_UNIT: f32 = 1.0 / (1 << 24) as f32;
const DOUBLE_UNIT: f64 = 1.0 / (1u64 << 53) as f64;

/// The 48-bit linear congruential generator of `java.util.Random`.
///
/// Output is bit-for-bit identical to the JVM for the same seed and the same sequence of
/// calls. The generator also counts how many raw `next(bits)` steps it has taken.
#[derive(Clone, Debug)]
pub struct LegacyRand {
    seed: u64,
    internal_next_gaussian: Option<f64>,
    draws: u64,
}

impl LegacyRand {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed: (seed ^ MULTIPLIER) & MASK,
            internal_next_gaussian: None,
            draws: 0,
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = (seed ^ MULTIPLIER) & MASK;
        self.internal_next_gaussian = None;
    }

    /// Number of raw generator steps taken since construction.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    fn next(&mut self, bits: u32) -> i32 {
        self.seed = self.seed.wrapping_mul(MULTIPLIER).wrapping_add(ADDEND) & MASK;
        self.draws += 1;
        (self.seed >> (48 - bits)) as i32
    }
}

impl CachedGaussian for LegacyRand {
    fn take_cached_gaussian(&mut self) -> Option<f64> {
        self.internal_next_gaussian.take()
    }

    fn cache_gaussian(&mut self, value: f64) {
        self.internal_next_gaussian = Some(value);
    }
}

impl RandomImpl for LegacyRand {
    fn next_i32(&mut self) -> i32 {
        self.next(32)
    }

    fn next_bounded_i32(&mut self, bound: i32) -> i32 {
        if bound <= 0 {
            return 0;
        }

        if (bound & bound.wrapping_neg()) == bound {
            // Power of two: take the high bits directly.
            ((i64::from(bound) * i64::from(self.next(31))) >> 31) as i32
        } else {
            loop {
                let bits = self.next(31);
                let value = bits % bound;
                // Reject the partial bucket at the top of the range.
                if bits.wrapping_sub(value).wrapping_add(bound - 1) >= 0 {
                    return value;
                }
            }
        }
    }

    fn next_i64(&mut self) -> i64 {
        let high = i64::from(self.next(32));
        let low = i64::from(self.next(32));
        (high << 32).wrapping_add(low)
    }

    fn next_bool(&mut self) -> bool {
        self.next(1) != 0
    }

    fn next_f32(&mut self) -> f32 {
        self.next(24) as f32 * FLOAT_UNIT
    }

    fn next_f64(&mut self) -> f64 {
        let high = i64::from(self.next(26));
        let low = i64::from(self.next(27));
        ((high << 27) + low) as f64 * DOUBLE_UNIT
    }

    fn next_gaussian(&mut self) -> f64 {
        self.polar_gaussian()
    }
}
