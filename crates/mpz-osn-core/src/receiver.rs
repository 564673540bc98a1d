//! Random OSN receiver.
//!
//! The receiver holds the permutation. It chooses one COT per switch with the
//! switch's control bit, and walks the network with running values starting at
//! zero, unpadding the chosen correction of every switch to update them.

use cfg_if::cfg_if;
use mpz_common::cpu::CpuPool;
use mpz_core::Block;
use mpz_ot_core::COTReceiverOutput;
use zeroize::Zeroizing;

use crate::{
    encoder,
    error::ReceiverError,
    extension::{extension_for, Extension},
    msgs::Corrections,
    output::{ROSNReceiverOutput, ShareVector},
    router::{is_permutation, Routing},
    topology, ROSNConfig,
};

/// Random OSN receiver.
#[derive(Debug)]
pub struct Receiver {
    config: ROSNConfig,
    pool: CpuPool,
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new(ROSNConfig::default())
    }
}

impl Receiver {
    /// Creates a new receiver.
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

    /// Checks the inputs of an invocation.
    ///
    /// # Arguments
    ///
    /// * `perm` - The permutation, routing input `perm[i]` to output `i`.
    /// * `byte_len` - The length of a value in bytes.
    pub fn check(&self, perm: &[usize], byte_len: usize) -> Result<(), ReceiverError> {
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

        Ok(())
    }

    /// Computes the control bits of the network.
    ///
    /// The bits of level `l`, [`Routing::level`], are the choices for the `l`-th
    /// COT batch.
    ///
    /// # Arguments
    ///
    /// * `perm` - The permutation, routing input `perm[i]` to output `i`.
    /// * `byte_len` - The length of a value in bytes.
    pub fn route(&self, perm: &[usize], byte_len: usize) -> Result<Routing, ReceiverError> {
        self.check(perm, byte_len)?;

        Ok(Routing::new(perm))
    }

    /// Applies the corrections received from the sender.
    ///
    /// # Arguments
    ///
    /// * `routing` - The control bits of the network.
    /// * `byte_len` - The length of a value in bytes.
    /// * `cots` - One COT batch per level, chosen with [`Routing::level`].
    /// * `corrections` - The corrections received from the sender.
    pub fn apply(
        &self,
        routing: &Routing,
        byte_len: usize,
        cots: &[COTReceiverOutput<Block>],
        corrections: &Corrections,
    ) -> Result<ROSNReceiverOutput, ReceiverError> {
        let topology = routing.topology();

        if byte_len == 0 {
            return Err(ReceiverError::InvalidInput(
                "values of at least one byte".to_string(),
            ));
        }
        if cots.len() != topology.levels() {
            return Err(ReceiverError::InvalidCot(format!(
                "expected {} batches, got {}",
                topology.levels(),
                cots.len()
            )));
        }
        if let Some(batch) = cots.iter().find(|batch| batch.msgs.len() != topology.width()) {
            return Err(ReceiverError::InvalidCot(format!(
                "expected batches of {} messages, got {}",
                topology.width(),
                batch.msgs.len()
            )));
        }
        corrections.validate(topology, byte_len)?;

        let walker = Walker {
            routing,
            byte_len,
            cots,
            corrections,
            ext: extension_for(2 * byte_len),
            pool: &self.pool,
            fork_threshold: self.config.fork_threshold(),
        };

        let mut values = Zeroizing::new(vec![0u8; topology.num() * byte_len]);
        walker.apply(0, 0, &mut values);

        Ok(ROSNReceiverOutput {
            share: ShareVector::new(byte_len, values.to_vec()),
        })
    }
}

struct Walker<'a> {
    routing: &'a Routing,
    byte_len: usize,
    cots: &'a [COTReceiverOutput<Block>],
    corrections: &'a Corrections,
    ext: &'a dyn Extension,
    pool: &'a CpuPool,
    fork_threshold: usize,
}

impl Walker<'_> {
    /// Walks the network on `values`, whose switches sit at `level` and width `offset`.
    fn apply(&self, level: usize, offset: usize, values: &mut [u8]) {
        let byte_len = self.byte_len;
        let n = values.len() / byte_len;

        match n {
            0 | 1 => {}
            2 => self.layer(level, offset, values),
            3 => {
                self.layer(level, offset, &mut values[..2 * byte_len]);
                self.layer(level + 1, offset, &mut values[byte_len..]);
                self.layer(level + 2, offset, &mut values[..2 * byte_len]);
            }
            _ => {
                let half = topology::top_len(n);
                let paired = 2 * half * byte_len;

                self.layer(level, offset, &mut values[..paired]);

                let (mut top, mut bottom) = topology::split_wires(values, byte_len);
                let split = topology::bottom_offset(n);
                let mut apply_top = || self.apply(level + 1, offset, &mut top);
                let mut apply_bottom = || self.apply(level + 1, offset + split, &mut bottom);

                if n >= self.fork_threshold {
                    self.pool.join(apply_top, apply_bottom);
                } else {
                    apply_top();
                    apply_bottom();
                }
                topology::merge_wires(&top, &bottom, values, byte_len);

                let right = level + topology::levels(n) - 1;
                self.layer(right, offset, &mut values[..paired]);
            }
        }
    }

    /// Applies the layer of switches at `level` to consecutive pairs of `pairs`.
    fn layer(&self, level: usize, offset: usize, pairs: &mut [u8]) {
        let pair_len = 2 * self.byte_len;
        let switch = |(k, pair): (usize, &mut [u8])| self.switch(level, offset + k, pair);

        cfg_if! {
            if #[cfg(feature = "rayon")] {
                use rayon::prelude::*;

                let count = pairs.len() / pair_len;
                if count >= self.fork_threshold && self.pool.parallelism() > 1 {
                    pairs.par_chunks_mut(pair_len).enumerate().for_each(switch);
                    return;
                }
            }
        }

        pairs.chunks_mut(pair_len).enumerate().for_each(switch);
    }

    /// Applies the switch at `(level, width)` to the running values in `pair`.
    fn switch(&self, level: usize, width: usize, pair: &mut [u8]) {
        let bit = self.routing.bit(level, width);
        let batch = &self.cots[level];
        let tweak = topology::tweak(batch.id, width);

        let (corr0, corr1) = self
            .corrections
            .get(self.routing.topology().index(level, width));

        let mut msg = Zeroizing::new(vec![0u8; 2 * self.byte_len]);
        self.ext.extend(tweak, batch.msgs[width], &mut msg);
        encoder::unpad(&mut msg, if bit { corr1 } else { corr0 });

        encoder::decode(bit, &msg, pair);
    }
}

#[cfg(test)]
mod tests {
    use mpz_ot_core::{ideal::cot::IdealCOT, COTSenderOutput};
    use proptest::prelude::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rstest::rstest;

    use super::*;
    use crate::{router::simulate, Sender};

    /// Runs both parties of the protocol against an ideal COT.
    fn run(
        config: ROSNConfig,
        perm: &[usize],
        byte_len: usize,
        seed: u64,
    ) -> (crate::ROSNSenderOutput, ROSNReceiverOutput, Corrections) {
        let sender = Sender::new(config.clone());
        let receiver = Receiver::new(config);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ideal = IdealCOT::new(rng.gen(), rng.gen());

        let routing = receiver.route(perm, byte_len).unwrap();
        let topology = *routing.topology();

        let (sender_cots, receiver_cots): (Vec<COTSenderOutput<Block>>, Vec<_>) = (0
            ..topology.levels())
            .map(|level| ideal.correlated(routing.level(level).to_vec()))
            .unzip();

        let (sender_output, corrections) = sender
            .build(perm.len(), byte_len, ideal.delta(), &sender_cots, &mut rng)
            .unwrap();
        let receiver_output = receiver
            .apply(&routing, byte_len, &receiver_cots, &corrections)
            .unwrap();

        (sender_output, receiver_output, corrections)
    }

    fn assert_permuted(
        perm: &[usize],
        sender: &crate::ROSNSenderOutput,
        receiver: &ROSNReceiverOutput,
    ) {
        let permuted = receiver.unmask(sender.share());
        for (i, &p) in perm.iter().enumerate() {
            assert_eq!(
                permuted.get(i),
                sender.input_mask().get(p),
                "mismatch at {i} for {perm:?}"
            );
        }
    }

    fn sequential() -> ROSNConfig {
        ROSNConfig::builder().max_parallelism(1).build().unwrap()
    }

    fn eager() -> ROSNConfig {
        ROSNConfig::builder()
            .max_parallelism(4)
            .fork_threshold(4)
            .build()
            .unwrap()
    }

    fn random_permutation(n: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            perm.swap(i, rng.gen_range(0..=i));
        }
        perm
    }

    #[rstest]
    #[case::one(1)]
    #[case::two(2)]
    #[case::three(3)]
    #[case::four(4)]
    #[case::five(5)]
    #[case::six(6)]
    fn test_rosn_all_permutations(#[case] n: usize) {
        let mut perms: Vec<Vec<usize>> = vec![vec![]];
        for k in 0..n {
            perms = perms
                .into_iter()
                .flat_map(|perm| {
                    (0..=k).map(move |pos| {
                        let mut perm = perm.clone();
                        perm.insert(pos, k);
                        perm
                    })
                })
                .collect();
        }

        for (seed, perm) in perms.iter().enumerate() {
            let (sender, receiver, _) = run(sequential(), perm, 16, seed as u64);
            assert_permuted(perm, &sender, &receiver);
        }
    }

    #[rstest]
    #[case::one_byte(9, 1)]
    #[case::half_block(9, 8)]
    #[case::block(10, 16)]
    #[case::block_and_one(11, 17)]
    #[case::long(12, 64)]
    #[case::odd_split(99, 5)]
    #[case::power_of_two(256, 16)]
    #[case::large(1000, 3)]
    fn test_rosn_sizes(#[case] n: usize, #[case] byte_len: usize) {
        let mut rng = StdRng::seed_from_u64(n as u64);
        let perm = random_permutation(n, &mut rng);

        let (sender, receiver, _) = run(sequential(), &perm, byte_len, 1);
        assert_permuted(&perm, &sender, &receiver);
    }

    #[rstest]
    #[case::small(37)]
    #[case::large(2049)]
    fn test_rosn_parallel(#[case] n: usize) {
        let mut rng = StdRng::seed_from_u64(n as u64);
        let perm = random_permutation(n, &mut rng);

        let (sender, receiver, _) = run(eager(), &perm, 16, 2);
        assert_permuted(&perm, &sender, &receiver);

        let (sequential_sender, _, sequential_corrections) = run(sequential(), &perm, 16, 2);
        let (_, _, parallel_corrections) = run(eager(), &perm, 16, 2);
        assert_eq!(sequential_sender.share(), sender.share());
        assert_eq!(sequential_corrections, parallel_corrections);
    }

    #[test]
    fn test_rosn_end_to_end() {
        let perm = [2, 0, 4, 1, 3];
        let (sender, receiver, _) = run(ROSNConfig::default(), &perm, 16, 0);

        let s = sender.input_mask();
        let expected: Vec<u8> = [2, 0, 4, 1, 3]
            .iter()
            .flat_map(|&i| s.get(i).unwrap().to_vec())
            .collect();

        assert_eq!(receiver.unmask(sender.share()).as_bytes(), &expected[..]);
    }

    #[test]
    fn test_rosn_single_value() {
        let (sender, receiver, corrections) = run(sequential(), &[0], 16, 0);

        assert!(corrections.is_empty());
        assert_eq!(sender.share(), sender.input_mask());
        assert!(receiver.share().as_bytes().iter().all(|&b| b == 0));
    }

    #[rstest]
    #[case::straight(&[0, 1], false)]
    #[case::crossed(&[1, 0], true)]
    fn test_rosn_two(#[case] perm: &[usize], #[case] crossed: bool) {
        let routing = Receiver::default().route(perm, 4).unwrap();
        assert_eq!(routing.bit(0, 0), crossed);
        assert_eq!(simulate(&routing), perm);

        let (sender, receiver, _) = run(sequential(), perm, 4, 0);
        assert_permuted(perm, &sender, &receiver);
    }

    #[test]
    fn test_rosn_corrections_are_fresh() {
        let perm: Vec<usize> = (0..16).rev().collect();

        let (_, _, first) = run(sequential(), &perm, 16, 0);
        let (_, _, second) = run(sequential(), &perm, 16, 1);

        assert_ne!(first, second);
        assert!(first.iter().zip(second.iter()).all(|(a, b)| a != b));
    }

    /// Corrections for opposite permutations are statistically indistinguishable
    /// from random bytes: the bit balance of each lies within a few standard
    /// deviations of one half.
    #[test]
    fn test_rosn_corrections_look_random() {
        let n = 512;
        let identity: Vec<usize> = (0..n).collect();
        let reversed: Vec<usize> = (0..n).rev().collect();

        for perm in [identity, reversed] {
            let (_, _, corrections) = run(sequential(), &perm, 16, 7);

            let bits = corrections.len() * 2 * corrections.entry_len() * 8;
            let ones: usize = corrections
                .iter()
                .map(|(c0, c1)| {
                    c0.iter()
                        .chain(c1)
                        .map(|b| b.count_ones() as usize)
                        .sum::<usize>()
                })
                .sum();

            let deviation = (ones as f64 - bits as f64 / 2.0).abs();
            let sigma = (bits as f64).sqrt() / 2.0;
            assert!(deviation < 6.0 * sigma, "{ones} ones out of {bits}");
        }
    }

    #[test]
    fn test_receiver_rejects_malformed_corrections() {
        let perm = [3, 1, 0, 2];
        let (_, _, corrections) = run(sequential(), &perm, 16, 0);
        let receiver = Receiver::new(sequential());
        let routing = receiver.route(&perm, 16).unwrap();

        let mut ideal = IdealCOT::default();
        let cots: Vec<_> = (0..routing.topology().levels())
            .map(|level| ideal.correlated(routing.level(level).to_vec()).1)
            .collect();

        // Wrong value length.
        let err = receiver.apply(&routing, 8, &cots, &corrections).unwrap_err();
        assert!(matches!(err, ReceiverError::InvalidCorrections(_)));

        // Truncated table.
        let truncated = Corrections::new(
            32,
            corrections
                .iter()
                .skip(1)
                .flat_map(|(c0, c1)| [c0, c1].concat())
                .collect(),
        );
        let err = receiver.apply(&routing, 16, &cots, &truncated).unwrap_err();
        assert!(matches!(err, ReceiverError::InvalidCorrections(_)));
        assert!(!err.is_input());

        // Entry length overflowing the slot size.
        for entry_len in [1usize << 63, usize::MAX] {
            let oversized = Corrections::new(entry_len, vec![0; 8]);
            assert_eq!(oversized.len(), 0);
            let err = receiver.apply(&routing, 16, &cots, &oversized).unwrap_err();
            assert!(matches!(err, ReceiverError::InvalidCorrections(_)));
        }
    }

    #[test]
    fn test_receiver_invalid_input() {
        let receiver = Receiver::default();

        assert!(receiver.route(&[], 16).unwrap_err().is_input());
        assert!(receiver.route(&[0, 1], 0).unwrap_err().is_input());
        assert!(receiver.route(&[1, 1], 16).unwrap_err().is_input());
        assert!(receiver.route(&[0, 2], 16).unwrap_err().is_input());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_rosn_random_permutations(
            n in 1usize..200,
            byte_len in 1usize..40,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let perm = random_permutation(n, &mut rng);

            let (sender, receiver, _) = run(sequential(), &perm, byte_len, seed);
            let permuted = receiver.unmask(sender.share());
            for (i, &p) in perm.iter().enumerate() {
                prop_assert_eq!(permuted.get(i), sender.input_mask().get(p));
            }
        }
    }

    #[test]
    fn test_rosn_randomness_depends_on_rng() {
        let perm = [1, 0, 2];
        let (a, _, _) = run(sequential(), &perm, 16, 0);
        let (b, _, _) = run(sequential(), &perm, 16, 1);

        assert_ne!(a.input_mask(), b.input_mask());
        assert_ne!(a.share(), b.share());
    }
}
