use super::RandomImpl;

/// Marsaglia polar method as `java.util.Random::nextGaussian` runs it.
///
/// Each accepted attempt yields two normally distributed values. The second one is cached
/// and handed out on the next call without touching the generator.
pub trait CachedGaussian: RandomImpl {
    fn take_cached_gaussian(&mut self) -> Option<f64>;

    fn cache_gaussian(&mut self, value: f64);

    fn polar_gaussian(&mut self) -> f64 {
        if let Some(cached) = self.take_cached_gaussian() {
            return cached;
        }

        loop {
            let v1 = self.next_f64().mul_add(2.0, -1.0);
            let v2 = self.next_f64().mul_add(2.0, -1.0);
            let s = v1 * v1 + v2 * v2;

            if s < 1.0 && s != 0.0 {
                let multiplier = (-2.0 * s.ln() / s).sqrt();
                self.cache_gaussian(v2 * multiplier);
                return v1 * multiplier;
            }
        }
    }
}
