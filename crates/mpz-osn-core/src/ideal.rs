//! Ideal Random OSN functionality.

use mpz_core::{prg::Prg, Block};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    error::ReceiverError,
    output::{ROSNReceiverOutput, ROSNSenderOutput, ShareVector},
    router::is_permutation,
};

/// The ideal Random OSN functionality.
///
/// Samples the sender's random vector and output masks directly, and hands the
/// receiver the share which completes the permuted vector.
#[derive(Debug)]
pub struct IdealROSN {
    prg: Prg,
}

impl IdealROSN {
    /// Creates a new ideal Random OSN functionality.
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed for the PRG.
    pub fn new(seed: Block) -> Self {
        Self {
            prg: Prg::from_seed(seed),
        }
    }

    /// Permutes a fresh random vector.
    ///
    /// # Arguments
    ///
    /// * `perm` - The permutation, routing entry `perm[i]` to position `i`.
    /// * `byte_len` - The length of a value in bytes.
    pub fn random_permute(
        &mut self,
        perm: &[usize],
        byte_len: usize,
    ) -> Result<(ROSNSenderOutput, ROSNReceiverOutput), ReceiverError> {
        if perm.is_empty() {
            return Err(ReceiverError::InvalidInput(
                "at least one value".to_string(),
            ));
        }
        if byte_len == 0 {
            return Err(ReceiverError::InvalidInput(
                "values of at least one byte".to_string(),
            ));
        }
        if !is_permutation(perm) {
            return Err(ReceiverError::InvalidInput(
                "a permutation of the value indices".to_string(),
            ));
        }

        let mut input_mask = vec![0u8; perm.len() * byte_len];
        self.prg.fill_bytes(&mut input_mask);
        let input_mask = ShareVector::new(byte_len, input_mask);

        let share = if perm.len() == 1 {
            input_mask.clone()
        } else {
            let mut share = vec![0u8; perm.len() * byte_len];
            self.prg.fill_bytes(&mut share);
            ShareVector::new(byte_len, share)
        };

        let receiver_share = input_mask.permute(perm).xor(&share);

        Ok((
            ROSNSenderOutput { input_mask, share },
            ROSNReceiverOutput {
                share: receiver_share,
            },
        ))
    }
}

impl Default for IdealROSN {
    fn default() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        Self::new(rng.gen())
    }
}
