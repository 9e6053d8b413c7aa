//! Deterministic value generator backing the synthetic sensor.
//!
//! A 32-bit linear congruential generator with the Numerical Recipes
//! constants. The same seed always yields the same sequence, on every
//! platform, which is what lets a coordinator replay a node run.

use crate::config::RNG_SEED_DEFAULT;

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;

#[derive(Debug, Clone)]
pub struct ValueGenerator {
    seed: u32,
    state: u32,
    initialized: bool,
}

impl ValueGenerator {
    pub fn new() -> Self {
        Self::with_seed(RNG_SEED_DEFAULT)
    }

    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            state: seed,
            initialized: false,
        }
    }

    /// Marks the generator as initialized. Only the first call has an effect;
    /// returns whether this call was that first one.
    pub fn init(&mut self) -> bool {
        if self.initialized {
            tracing::debug!("RNG already initialized, ignoring re-init");
            return false;
        }
        self.initialized = true;
        tracing::info!("RNG initialized with seed {}", self.seed);
        true
    }

    /// Steps the recurrence `state = state * A + C (mod 2^32)` and returns the new state.
    pub fn advance(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Default for ValueGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_outputs_from_default_seed() {
        let mut rng = ValueGenerator::new();
        assert_eq!(rng.seed(), 12345);
        // (12345 * 1664525 + 1013904223) mod 2^32
        assert_eq!(rng.advance(), 87_628_868);
        assert_eq!(rng.advance(), 71_072_467);
        assert_eq!(rng.advance(), 2_332_836_374);
        assert_eq!(rng.state(), 2_332_836_374);
    }

    #[test]
    fn test_wraps_modulo_2_pow_32() {
        let mut rng = ValueGenerator::with_seed(u32::MAX);
        let expected = ((u32::MAX as u64 * 1_664_525 + 1_013_904_223) % (1u64 << 32)) as u32;
        assert_eq!(rng.advance(), expected);
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut rng = ValueGenerator::new();
        assert!(!rng.is_initialized());
        assert!(rng.init());
        let after_first = rng.advance();
        assert!(!rng.init());
        assert!(rng.is_initialized());
        // re-init must not rewind the sequence
        assert_ne!(rng.advance(), after_first);
    }

    #[test]
    fn test_independent_instances_agree() {
        let mut a = ValueGenerator::new();
        let mut b = ValueGenerator::new();
        for _ in 0..1000 {
            assert_eq!(a.advance(), b.advance());
        }
    }
}
