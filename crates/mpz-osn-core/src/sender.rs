//! Random OSN sender.
//!
//! The sender samples a random vector and pushes it through the switching
//! network, replacing the values on the outputs of every switch with fresh masks.
//! For every switch it emits the pair of corrections which lets the receiver, who
//! holds one pad per switch, follow the routing selected by its control bit.

use cfg_if::cfg_if;
use mpz_common::cpu::CpuPool;
use mpz_core::{prg::Prg, Block};
use mpz_ot_core::COTSenderOutput;
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use zeroize::Zeroizing;

use crate::{
    encoder,
    error::SenderError,
    extension::{extension_for, Extension},
    masks::MaskStore,
    msgs::Corrections,
    output::{ROSNSenderOutput, ShareVector},
    topology::{self, Topology},
    ROSNConfig,
};

/// Random OSN sender.
#[derive(Debug)]
pub struct Sender {
    config: ROSNConfig,
    pool: CpuPool,
}

impl Default for Sender {
    fn default() -> Self {
        Self::new(ROSNConfig::default())
    }
}

impl Sender {
    /// Creates a new sender.
    ///
    /// # Arguments
    ///
    /// * `config` - The Random OSN configuration.
    pub fn new(config: ROSNConfig) -> Self {
        let pool = CpuPool::new(config.max_parallelism());
        Self { config, pool }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ROSNConfig {
        &self.config
    }

    /// Checks the inputs of an invocation, returning the network topology.
    ///
    /// # Arguments
    ///
    /// * `num` - The number of values.
    /// * `byte_len` - The length of a value in bytes.
    pub fn topology(&self, num: usize, byte_len: usize) -> Result<Topology, SenderError> {
        if num == 0 {
            return Err(SenderError::InvalidInput(
                "at least one value".to_string(),
            ));
        }
        if byte_len == 0 {
            return Err(SenderError::InvalidInput(
                "values of at least one byte".to_string(),
            ));
        }

        Ok(Topology::new(num))
    }

    /// Builds the network.
    ///
    /// Returns the sender's output and the corrections which must be sent to the
    /// receiver.
    ///
    /// # Arguments
    ///
    /// * `num` - The number of values.
    /// * `byte_len` - The length of a value in bytes.
    /// * `delta` - The global COT correlation.
    /// * `cots` - One COT batch of `width` messages per level of the network.
    /// * `rng` - Source of the random vector and the masks.
    pub fn build<R: RngCore + CryptoRng>(
        &self,
        num: usize,
        byte_len: usize,
        delta: Block,
        cots: &[COTSenderOutput<Block>],
        rng: &mut R,
    ) -> Result<(ROSNSenderOutput, Corrections), SenderError> {
        let topology = self.topology(num, byte_len)?;

        if cots.len() != topology.levels() {
            return Err(SenderError::InvalidCot(format!(
                "expected {} batches, got {}",
                topology.levels(),
                cots.len()
            )));
        }
        if let Some(batch) = cots.iter().find(|batch| batch.msgs.len() != topology.width()) {
            return Err(SenderError::InvalidCot(format!(
                "expected batches of {} messages, got {}",
                topology.width(),
                batch.msgs.len()
            )));
        }

        let mut prg = Prg::from_seed(rng.gen());

        let mut input_mask = vec![0u8; num * byte_len];
        prg.fill_bytes(&mut input_mask);

        let masks = MaskStore::sample(&topology, byte_len, &mut prg);

        // Slots which the network leaves unused still carry random bytes.
        let slot_len = 4 * byte_len;
        let mut arena = Zeroizing::new(vec![0u8; topology.slots() * slot_len]);
        prg.fill_bytes(&mut arena);

        let builder = Builder {
            byte_len,
            delta,
            cots,
            masks: &masks,
            ext: extension_for(2 * byte_len),
            pool: &self.pool,
            fork_threshold: self.config.fork_threshold(),
        };

        let mut values = Zeroizing::new(input_mask.clone());
        builder.build(
            0,
            0,
            &mut values,
            Arena {
                data: &mut arena,
                levels: topology.levels(),
                slot_len,
            },
        );

        let corrections = Corrections::new(2 * byte_len, transpose(&arena, &topology, slot_len));

        Ok((
            ROSNSenderOutput {
                input_mask: ShareVector::new(byte_len, input_mask),
                share: ShareVector::new(byte_len, values.to_vec()),
            },
            corrections,
        ))
    }
}

/// Reorders the width-major arena into the level-major wire order.
fn transpose(arena: &[u8], topology: &Topology, slot_len: usize) -> Vec<u8> {
    let (levels, width) = (topology.levels(), topology.width());

    let mut table = vec![0u8; arena.len()];
    if table.is_empty() {
        return table;
    }

    for (w, column) in arena.chunks_exact(levels * slot_len).enumerate() {
        for (level, slot) in column.chunks_exact(slot_len).enumerate() {
            let index = level * width + w;
            table[index * slot_len..(index + 1) * slot_len].copy_from_slice(slot);
        }
    }

    table
}

/// Correction slots of a contiguous range of width positions, across all levels.
///
/// Slots are stored width-major, so disjoint width ranges of sibling
/// sub-networks are disjoint slices which can be written to concurrently.
struct Arena<'a> {
    data: &'a mut [u8],
    levels: usize,
    slot_len: usize,
}

impl<'a> Arena<'a> {
    fn column_len(&self) -> usize {
        self.levels * self.slot_len
    }

    fn reborrow(&mut self) -> Arena<'_> {
        Arena {
            data: &mut *self.data,
            levels: self.levels,
            slot_len: self.slot_len,
        }
    }

    /// Splits off the first `widths` width positions.
    fn split(self, widths: usize) -> (Arena<'a>, Arena<'a>) {
        let (levels, slot_len) = (self.levels, self.slot_len);
        let mid = (widths * levels * slot_len).min(self.data.len());
        let (left, right) = self.data.split_at_mut(mid);

        (
            Arena {
                data: left,
                levels,
                slot_len,
            },
            Arena {
                data: right,
                levels,
                slot_len,
            },
        )
    }
}

struct Builder<'a> {
    byte_len: usize,
    delta: Block,
    cots: &'a [COTSenderOutput<Block>],
    masks: &'a MaskStore,
    ext: &'a dyn Extension,
    pool: &'a CpuPool,
    fork_threshold: usize,
}

impl Builder<'_> {
    /// Builds the network on `values`, placing its switches at `level` and width
    /// `offset`.
    ///
    /// `arena` holds the slots of the width positions starting at `offset`. On
    /// return `values` holds the output masks of the network.
    fn build(&self, level: usize, offset: usize, values: &mut [u8], mut arena: Arena<'_>) {
        let byte_len = self.byte_len;
        let n = values.len() / byte_len;

        match n {
            0 | 1 => {}
            2 => self.layer(level, offset, values, &mut arena),
            3 => {
                self.layer(level, offset, &mut values[..2 * byte_len], &mut arena);
                self.layer(level + 1, offset, &mut values[byte_len..], &mut arena);
                self.layer(level + 2, offset, &mut values[..2 * byte_len], &mut arena);
            }
            _ => {
                let half = topology::top_len(n);
                let paired = 2 * half * byte_len;

                self.layer(level, offset, &mut values[..paired], &mut arena);

                let (mut top, mut bottom) = topology::split_wires(values, byte_len);
                {
                    let split = topology::bottom_offset(n);
                    let (top_arena, bottom_arena) = arena.reborrow().split(split);
                    let bottom_arena = bottom_arena.split((n - half) / 2).0;

                    let build_top = || self.build(level + 1, offset, &mut top, top_arena);
                    let build_bottom =
                        || self.build(level + 1, offset + split, &mut bottom, bottom_arena);

                    if n >= self.fork_threshold {
                        self.pool.join(build_top, build_bottom);
                    } else {
                        build_top();
                        build_bottom();
                    }
                }
                topology::merge_wires(&top, &bottom, values, byte_len);

                let right = level + topology::levels(n) - 1;
                self.layer(right, offset, &mut values[..paired], &mut arena);
            }
        }
    }

    /// Places a layer of switches at `level` on consecutive pairs of `pairs`.
    ///
    /// Switch `k` sits at width `offset + k` and takes `pairs[2k], pairs[2k + 1]`.
    fn layer(&self, level: usize, offset: usize, pairs: &mut [u8], arena: &mut Arena<'_>) {
        let pair_len = 2 * self.byte_len;
        let column_len = arena.column_len();
        let slot_len = arena.slot_len;

        let switch = |(k, (pair, column)): (usize, (&mut [u8], &mut [u8]))| {
            let slot = &mut column[level * slot_len..(level + 1) * slot_len];
            self.switch(level, offset + k, pair, slot);
        };

        cfg_if! {
            if #[cfg(feature = "rayon")] {
                use rayon::prelude::*;

                let count = pairs.len() / pair_len;
                if count >= self.fork_threshold && self.pool.parallelism() > 1 {
                    pairs
                        .par_chunks_mut(pair_len)
                        .zip(arena.data.par_chunks_mut(column_len))
                        .enumerate()
                        .for_each(switch);
                    return;
                }
            }
        }

        pairs
            .chunks_mut(pair_len)
            .zip(arena.data.chunks_mut(column_len))
            .enumerate()
            .for_each(switch);
    }

    /// Encodes the switch at `(level, width)`, replacing its inputs with its output masks.
    fn switch(&self, level: usize, width: usize, pair: &mut [u8], slot: &mut [u8]) {
        let byte_len = self.byte_len;
        let batch = &self.cots[level];
        let tweak = topology::tweak(batch.id, width);
        let k0 = batch.msgs[width];
        let k1 = k0 ^ self.delta;

        let (corr0, corr1) = slot.split_at_mut(2 * byte_len);
        self.ext.extend(tweak, k0, corr0);
        self.ext.extend(tweak, k1, corr1);

        let (out0, out1) = self.masks.get(level, width);
        let (in0, in1) = pair.split_at_mut(byte_len);
        encoder::encode([in0, in1], [out0, out1], corr0, corr1);

        in0.copy_from_slice(out0);
        in1.copy_from_slice(out1);
    }
}

#[cfg(test)]
mod tests {
    use mpz_ot_core::ideal::cot::IdealCOT;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    use super::*;

    fn cots(ideal: &mut IdealCOT, topology: &Topology) -> Vec<COTSenderOutput<Block>> {
        (0..topology.levels())
            .map(|_| ideal.correlated(vec![false; topology.width()]).0)
            .collect()
    }

    #[rstest]
    #[case(1, 16)]
    #[case(2, 4)]
    #[case(3, 8)]
    #[case(9, 16)]
    #[case(33, 40)]
    fn test_sender_build_shape(#[case] num: usize, #[case] byte_len: usize) {
        let sender = Sender::default();
        let topology = Topology::new(num);
        let mut ideal = IdealCOT::default();
        let cots = cots(&mut ideal, &topology);

        let (output, corrections) = sender
            .build(num, byte_len, ideal.delta(), &cots, &mut StdRng::seed_from_u64(0))
            .unwrap();

        assert_eq!(output.input_mask().len(), num);
        assert_eq!(output.share().len(), num);
        assert_eq!(output.share().byte_len(), byte_len);
        assert_eq!(corrections.len(), topology.slots());
        assert_eq!(corrections.entry_len(), 2 * byte_len);
    }

    #[test]
    fn test_sender_single_value_is_identity() {
        let sender = Sender::default();
        let (output, corrections) = sender
            .build(1, 16, Block::ONES, &[], &mut StdRng::seed_from_u64(0))
            .unwrap();

        assert_eq!(output.share(), output.input_mask());
        assert!(corrections.is_empty());
    }

    #[test]
    fn test_sender_invalid_input() {
        let sender = Sender::default();
        let mut rng = StdRng::seed_from_u64(0);

        let err = sender.build(0, 16, Block::ONES, &[], &mut rng).unwrap_err();
        assert!(err.is_input());

        let err = sender.build(4, 0, Block::ONES, &[], &mut rng).unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn test_sender_invalid_cot() {
        let sender = Sender::default();
        let topology = Topology::new(8);
        let mut ideal = IdealCOT::default();
        let mut rng = StdRng::seed_from_u64(0);

        let mut cots = cots(&mut ideal, &topology);
        cots.pop();
        let err = sender.build(8, 16, ideal.delta(), &cots, &mut rng).unwrap_err();
        assert!(matches!(err, SenderError::InvalidCot(_)));

        let mut cots = self::cots(&mut ideal, &topology);
        cots[1].msgs.pop();
        let err = sender.build(8, 16, ideal.delta(), &cots, &mut rng).unwrap_err();
        assert!(matches!(err, SenderError::InvalidCot(_)));
    }

    #[test]
    fn test_transpose() {
        // 5 levels, 3 widths, 1 byte slots.
        let topology = Topology::new(6);
        assert_eq!((topology.levels(), topology.width()), (5, 3));

        let arena: Vec<u8> = (0..15).collect();
        let table = transpose(&arena, &topology, 1);

        // Width-major (w, l) = w * 5 + l becomes level-major l * 3 + w.
        for w in 0..3 {
            for l in 0..5 {
                assert_eq!(table[l * 3 + w], (w * 5 + l) as u8);
            }
        }
    }
}
