//! Output masks of the switches.

use rand::RngCore;
use zeroize::Zeroizing;

use crate::topology::Topology;

/// Freshly sampled output masks for every switch position of a network.
///
/// The store is created for a single invocation and cleared when dropped.
pub(crate) struct MaskStore {
    width: usize,
    byte_len: usize,
    masks: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for MaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskStore")
            .field("width", &self.width)
            .field("byte_len", &self.byte_len)
            .finish_non_exhaustive()
    }
}

impl MaskStore {
    /// Samples masks for every switch position of `topology`.
    pub(crate) fn sample<R: RngCore + ?Sized>(topology: &Topology, byte_len: usize, rng: &mut R) -> Self {
        let mut masks = Zeroizing::new(vec![0u8; topology.slots() * 2 * byte_len]);
        rng.fill_bytes(&mut masks);

        Self {
            width: topology.width(),
            byte_len,
            masks,
        }
    }

    /// Returns the masks of the two output wires of the switch at `(level, width)`.
    pub(crate) fn get(&self, level: usize, width: usize) -> (&[u8], &[u8]) {
        let start = (level * self.width + width) * 2 * self.byte_len;
        self.masks[start..start + 2 * self.byte_len].split_at(self.byte_len)
    }
}

#[cfg(test)]
mod tests {
    use mpz_core::prg::Prg;

    use super::*;

    #[test]
    fn test_mask_store_layout() {
        let topology = Topology::new(9);
        let store = MaskStore::sample(&topology, 5, &mut Prg::new());

        let mut seen = Vec::new();
        for level in 0..topology.levels() {
            for width in 0..topology.width() {
                let (m0, m1) = store.get(level, width);
                assert_eq!(m0.len(), 5);
                assert_eq!(m1.len(), 5);
                seen.push(m0.to_vec());
                seen.push(m1.to_vec());
            }
        }

        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 2 * topology.slots());
    }

    #[test]
    fn test_mask_store_is_fresh() {
        let topology = Topology::new(4);
        let a = MaskStore::sample(&topology, 16, &mut Prg::new());
        let b = MaskStore::sample(&topology, 16, &mut Prg::new());

        assert_ne!(a.get(0, 0), b.get(0, 0));
    }
}
