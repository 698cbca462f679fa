// crates/tb_core/src/rng.rs
//
// Seeded, integer-only RNG for question sampling and presentation order.
// Focus: unbiased range generation, stable seeding, word accounting.
//
// • One `SelectRng` per request; streams are never shared between callers.
// • Explicit seeding maps a u64 into the first 8 bytes of the ChaCha20 seed
//   (little-endian); the remaining 24 bytes are zero.
// • Unbiased ranges via rejection sampling (no floating point).
// • With the `entropy` feature, an unseeded stream draws its u64 seed from the
//   OS and keeps it so the run can be recorded and replayed.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Deterministic RNG driving the selector.
#[derive(Debug, Clone)]
pub struct SelectRng {
    rng: ChaCha20Rng,
    seed: u64,
    words_consumed: u128,
}

impl SelectRng {
    /// Construct from a 64-bit seed.
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self {
            rng: ChaCha20Rng::from_seed(seed32),
            seed,
            words_consumed: 0,
        }
    }

    /// Draw a fresh seed from the OS, then behave exactly like `from_seed_u64`.
    #[cfg(feature = "entropy")]
    pub fn from_entropy() -> Self {
        let seed = rand_core::OsRng.next_u64();
        Self::from_seed_u64(seed)
    }

    /// The u64 this stream was seeded with.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Total number of 64-bit words consumed so far (saturating).
    #[inline]
    pub fn words_consumed(&self) -> u128 {
        self.words_consumed
    }

    /// The only place where the counter is advanced.
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.rng.next_u64()
    }

    /// Unbiased integer in [0, n) using rejection sampling with the
    /// `2^64 mod n` threshold. Returns `None` if `n == 0`.
    #[inline]
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    /// Choose a single index in `[0, n)`; returns `None` if `n == 0`.
    #[inline]
    pub fn choose_index(&mut self, n: usize) -> Option<usize> {
        self.gen_range(n as u64).map(|v| v as usize)
    }

    /// In-place Fisher–Yates shuffle:
    /// for i in (1..len).rev() { j ~ U{0..=i}; swap(i, j) }
    pub fn shuffle_in_place<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            if let Some(j) = self.choose_index(i + 1) {
                slice.swap(i, j);
            }
        }
    }

    /// Uniformly random permutation of `1..=n`.
    pub fn permutation_1_based(&mut self, n: usize) -> Vec<u32> {
        let mut orders: Vec<u32> = (1..=n as u32).collect();
        self.shuffle_in_place(&mut orders);
        orders
    }
}
