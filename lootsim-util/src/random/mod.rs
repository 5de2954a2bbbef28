use std::{
    sync::atomic::{AtomicU64, Ordering},
    time,
};

mod gaussian;
pub mod legacy_rand;

pub use gaussian::CachedGaussian;

static SEED_UNIQUIFIER: AtomicU64 = AtomicU64::new(8682522807148012u64);

/// A fresh seed for callers that did not pick one, mixed the same way `java.util.Random()`
/// seeds itself.
pub fn get_seed() -> u64 {
    let mut current = SEED_UNIQUIFIER.load(Ordering::Relaxed);
    let seed = loop {
        let next = current.wrapping_mul(1181783497276652981u64);
        match SEED_UNIQUIFIER.compare_exchange_weak(
            current,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break next,
            Err(actual) => current = actual,
        }
    };

    let nanos = time::SystemTime::now()
        .duration_since(time::SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();

    let nano_upper = (nanos >> 8) as u64;
    let nano_lower = nanos as u64;
    seed ^ nano_upper ^ nano_lower
}

/// The draw operations the loot engine consumes.
///
/// Every method advances the generator, so the order of calls is part of the observable
/// behaviour: two callers issuing the same calls in the same order from the same seed see
/// the same values.
pub trait RandomImpl {
    fn next_i32(&mut self) -> i32;

    /// Uniform value in `0..bound`. A non-positive bound yields `0` and draws nothing.
    fn next_bounded_i32(&mut self, bound: i32) -> i32;

    /// Uniform value in `min..=max`. A range wider than `i32::MAX` yields `min`.
    fn next_inbetween_i32(&mut self, min: i32, max: i32) -> i32 {
        self.next_bounded_i32(max.wrapping_sub(min).wrapping_add(1))
            .wrapping_add(min)
    }

    fn next_i64(&mut self) -> i64;

    fn next_bool(&mut self) -> bool;

    fn next_f32(&mut self) -> f32;

    fn next_f64(&mut self) -> f64;

    fn next_gaussian(&mut self) -> f64;

    fn skip(&mut self, count: i32) {
        for _ in 0..count {
            self.next_i64();
        }
    }
}
