//! Fixed-key AES and AES-based hash functions.

use ::aes::{
    cipher::{BlockEncrypt, KeyInit},
    Aes128,
};
use once_cell::sync::Lazy;

use crate::Block;

/// The key used by [`FIXED_KEY_AES`].
///
/// Any key works, this one was sampled at random.
pub const FIXED_KEY: [u8; 16] = [
    69, 42, 81, 212, 251, 13, 113, 132, 3, 215, 101, 149, 150, 239, 23, 40,
];

/// Fixed-key AES cipher.
pub static FIXED_KEY_AES: Lazy<FixedKeyAes> = Lazy::new(|| FixedKeyAes {
    aes: AesEncryptor::new(Block::new(FIXED_KEY)),
});

/// AES-128 encryptor.
#[derive(Clone)]
pub struct AesEncryptor(Aes128);

opaque_debug::implement!(AesEncryptor);

impl AesEncryptor {
    /// Number of blocks encrypted in one pass by [`AesEncryptor::encrypt_many_blocks`]
    /// when used from the PRG.
    pub const AES_BLOCK_COUNT: usize = 8;

    /// Creates a new encryptor with the provided key.
    #[inline]
    pub fn new(key: Block) -> Self {
        Self(Aes128::new(&key.to_aes()))
    }

    /// Encrypts a single block.
    #[inline]
    pub fn encrypt_block(&self, block: Block) -> Block {
        let mut block = block.to_aes();
        self.0.encrypt_block(&mut block);
        Block::from_aes(&block)
    }

    /// Encrypts `N` blocks in place.
    #[inline]
    pub fn encrypt_many_blocks<const N: usize>(&self, blocks: &mut [Block; N]) {
        let mut aes_blocks = blocks.map(Block::to_aes);
        self.0.encrypt_blocks(&mut aes_blocks);
        blocks
            .iter_mut()
            .zip(aes_blocks.iter())
            .for_each(|(block, aes_block)| *block = Block::from_aes(aes_block));
    }
}

/// A fixed-key AES permutation `π` with hash functions built on top of it.
///
/// See <https://eprint.iacr.org/2019/074> for the constructions.
#[derive(Clone)]
pub struct FixedKeyAes {
    aes: AesEncryptor,
}

opaque_debug::implement!(FixedKeyAes);

impl FixedKeyAes {
    /// Correlation robust hash function, `π(x) ⊕ x`.
    ///
    /// Only secure in the semi-honest setting.
    #[inline]
    pub fn cr(&self, block: Block) -> Block {
        self.aes.encrypt_block(block) ^ block
    }

    /// Tweakable circular correlation robust hash function, `π(π(x) ⊕ i) ⊕ π(x)`.
    #[inline]
    pub fn tccr(&self, tweak: Block, block: Block) -> Block {
        let x = self.aes.encrypt_block(block);
        self.aes.encrypt_block(x ^ tweak) ^ x
    }

    /// Tweakable circular correlation robust hash function applied to `N` blocks in place.
    #[inline]
    pub fn tccr_many<const N: usize>(&self, tweaks: &[Block; N], blocks: &mut [Block; N]) {
        self.aes.encrypt_many_blocks(blocks);
        let x = *blocks;

        blocks
            .iter_mut()
            .zip(tweaks)
            .for_each(|(block, tweak)| *block ^= *tweak);
        self.aes.encrypt_many_blocks(blocks);

        blocks
            .iter_mut()
            .zip(x)
            .for_each(|(block, x)| *block ^= x);
    }
}
