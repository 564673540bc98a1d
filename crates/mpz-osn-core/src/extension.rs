//! Extension of COT keys into switch pads.
//!
//! Every switch consumes one COT. Both parties stretch the 128-bit COT message
//! into a pad of `2 · byte_len` bytes under a tweak unique to the switch.

use mpz_core::{aes::FIXED_KEY_AES, prg::Prg, Block};
use rand::{RngCore, SeedableRng};

/// A keyed pseudorandom extension function.
pub trait Extension: Send + Sync {
    /// Fills `out` with the extension of `key` under `tweak`.
    fn extend(&self, tweak: Block, key: Block, out: &mut [u8]);
}

/// Extension for pads which fit in a single block.
///
/// The pad is the truncated tweakable correlation robust hash of the key.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashExtension;

impl Extension for HashExtension {
    fn extend(&self, tweak: Block, key: Block, out: &mut [u8]) {
        debug_assert!(out.len() <= Block::LEN);

        let pad = FIXED_KEY_AES.tccr(tweak, key);
        out.copy_from_slice(&pad.as_bytes()[..out.len()]);
    }
}

/// Extension for pads longer than a single block.
///
/// The hash of the key seeds a PRG which produces the pad.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrgExtension;

impl Extension for PrgExtension {
    fn extend(&self, tweak: Block, key: Block, out: &mut [u8]) {
        let seed = FIXED_KEY_AES.tccr(tweak, key);
        Prg::from_seed(seed).fill_bytes(out);
    }
}

/// Returns the extension used for pads of `pad_len` bytes.
pub fn extension_for(pad_len: usize) -> &'static dyn Extension {
    if pad_len <= Block::LEN {
        &HashExtension
    } else {
        &PrgExtension
    }
}
