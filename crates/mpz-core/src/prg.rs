//! AES-based PRG.

use crate::{aes::AesEncryptor, Block};
use rand::Rng;
use rand_core::{
    block::{BlockRng, BlockRngCore},
    CryptoRng, RngCore, SeedableRng,
};

#[derive(Clone)]
struct PrgCore {
    aes: AesEncryptor,
    counter: u128,
}

impl BlockRngCore for PrgCore {
    type Item = u32;
    type Results = [u32; 4 * AesEncryptor::AES_BLOCK_COUNT];

    // Encrypts 8 counter blocks at a time.
    #[inline(always)]
    fn generate(&mut self, results: &mut Self::Results) {
        let mut states = [Block::ZERO; AesEncryptor::AES_BLOCK_COUNT];
        states.iter_mut().for_each(|state| {
            *state = Block::from(self.counter);
            self.counter = self.counter.wrapping_add(1);
        });

        self.aes.encrypt_many_blocks(&mut states);
        *results = bytemuck::cast(states);
    }
}

impl SeedableRng for PrgCore {
    type Seed = Block;

    #[inline(always)]
    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            aes: AesEncryptor::new(seed),
            counter: 0,
        }
    }
}

impl CryptoRng for PrgCore {}

/// AES-based PRG.
///
/// AES-128 in counter mode, keyed with the seed.
#[derive(Clone)]
pub struct Prg(BlockRng<PrgCore>);

opaque_debug::implement!(Prg);

impl RngCore for Prg {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    #[inline(always)]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl SeedableRng for Prg {
    type Seed = Block;

    #[inline(always)]
    fn from_seed(seed: Self::Seed) -> Self {
        Prg(BlockRng::<PrgCore>::from_seed(seed))
    }
}

impl CryptoRng for Prg {}

impl Prg {
    /// Creates a new PRG with a random seed.
    #[inline(always)]
    pub fn new() -> Self {
        Prg::from_seed(rand::random::<Block>())
    }

    /// Returns the number of counter blocks consumed so far.
    pub fn counter(&self) -> u128 {
        self.0.core.counter
    }

    /// Generates a random bool value.
    #[inline(always)]
    pub fn random_bool(&mut self) -> bool {
        self.gen()
    }

    /// Fills a bool slice with random values.
    #[inline(always)]
    pub fn random_bools(&mut self, buf: &mut [bool]) {
        buf.iter_mut().for_each(|b| *b = self.gen());
    }

    /// Fills a byte slice with random values.
    #[inline(always)]
    pub fn random_bytes(&mut self, buf: &mut [u8]) {
        self.fill_bytes(buf);
    }

    /// Generates a random block.
    #[inline(always)]
    pub fn random_block(&mut self) -> Block {
        self.gen()
    }

    /// Fills a block slice with random values.
    #[inline(always)]
    pub fn random_blocks(&mut self, buf: &mut [Block]) {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(buf);
        self.fill_bytes(bytes);
    }
}

impl Default for Prg {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prg_ne() {
        let mut prg = Prg::new();
        let mut x = vec![Block::ZERO; 2];
        prg.random_blocks(&mut x);
        assert_ne!(x[0], x[1]);
    }

    #[test]
    fn test_prg_is_deterministic() {
        let mut a = Prg::from_seed(Block::ONES);
        let mut b = Prg::from_seed(Block::ONES);

        let mut x = vec![0u8; 100];
        let mut y = vec![0u8; 100];
        a.random_bytes(&mut x);
        b.random_bytes(&mut y);

        assert_eq!(x, y);
    }

    #[test]
    fn test_prg_seeds_are_distinct() {
        let mut a = Prg::from_seed(Block::ZERO);
        let mut b = Prg::from_seed(Block::ONES);

        assert_ne!(a.random_block(), b.random_block());
    }

    #[test]
    fn test_prg_counter_advances() {
        let mut prg = Prg::from_seed(Block::ZERO);
        assert_eq!(prg.counter(), 0);

        prg.random_block();
        assert_ne!(prg.counter(), 0);
    }
}
