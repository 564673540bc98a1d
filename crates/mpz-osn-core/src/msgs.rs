//! Messages for the Random OSN protocol.

use serde::{Deserialize, Serialize};

use crate::{error::ReceiverError, topology::Topology};

/// The corrections of every switch position, sent from the sender to the receiver.
///
/// The table is an ordered list of `levels · width` pairs `(corr0, corr1)`, each
/// entry `entry_len` bytes long, ordered by `level · width + width_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corrections {
    entry_len: usize,
    data: Vec<u8>,
}

impl Corrections {
    pub(crate) fn new(entry_len: usize, data: Vec<u8>) -> Self {
        let corrections = Self { entry_len, data };
        debug_assert!(corrections
            .slot_len()
            .map_or(true, |slot_len| corrections.data.len() % slot_len == 0));
        corrections
    }

    /// Returns the length of a single correction in bytes.
    pub fn entry_len(&self) -> usize {
        self.entry_len
    }

    /// Returns the number of switch positions in the table.
    ///
    /// A table whose entry length does not fit the buffer has no positions.
    pub fn len(&self) -> usize {
        match self.slot_len() {
            Some(slot_len) => self.data.len() / slot_len,
            None => 0,
        }
    }

    /// Returns the byte length of one `(corr0, corr1)` pair, if it is non-zero
    /// and does not overflow.
    fn slot_len(&self) -> Option<usize> {
        self.entry_len.checked_mul(2).filter(|&len| len > 0)
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the pair of corrections at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: usize) -> (&[u8], &[u8]) {
        assert!(index < self.len(), "correction index out of bounds");
        let slot_len = 2 * self.entry_len;
        self.data[index * slot_len..(index + 1) * slot_len].split_at(self.entry_len)
    }

    /// Returns an iterator over the pairs of corrections.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        let entry_len = self.entry_len;
        let slot_len = self.slot_len().unwrap_or(usize::MAX);
        self.data
            .chunks_exact(slot_len)
            .map(move |slot| slot.split_at(entry_len))
    }

    /// Checks that the table matches the network of `topology` for values of
    /// `byte_len` bytes.
    pub(crate) fn validate(&self, topology: &Topology, byte_len: usize) -> Result<(), ReceiverError> {
        if self.entry_len != 2 * byte_len {
            return Err(ReceiverError::InvalidCorrections(format!(
                "expected entries of {} bytes, got {}",
                2 * byte_len,
                self.entry_len
            )));
        }

        let expected = topology.slots() * 4 * byte_len;
        if self.data.len() != expected {
            return Err(ReceiverError::InvalidCorrections(format!(
                "expected {} switch positions, got {} bytes",
                topology.slots(),
                self.data.len()
            )));
        }

        Ok(())
    }
}
