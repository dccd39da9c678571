//! Deterministic per-step randomness for simulated markets.
//!
//! A master seed is expanded into one sub-seed per `(symbol, step)` with
//! BLAKE3, so the price at step N never depends on how many other steps were
//! generated first or in what order.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn sub_seed(&self, symbol: &str, step: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        hasher.update(&step.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    pub fn rng_for(&self, symbol: &str, step: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(symbol, step))
    }
}
