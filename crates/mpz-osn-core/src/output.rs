//! Outputs of the Random OSN protocol.

use serde::{Deserialize, Serialize};

/// A vector of `len` byte strings, each `byte_len` bytes long.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareVector {
    byte_len: usize,
    data: Vec<u8>,
}

impl std::fmt::Debug for ShareVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareVector")
            .field("len", &self.len())
            .field("byte_len", &self.byte_len)
            .finish_non_exhaustive()
    }
}

impl ShareVector {
    /// Creates a new vector from its concatenated entries.
    ///
    /// # Panics
    ///
    /// Panics if `byte_len` is zero or `data` is not a multiple of `byte_len`.
    pub fn new(byte_len: usize, data: Vec<u8>) -> Self {
        assert!(byte_len > 0, "byte length must be positive");
        assert_eq!(data.len() % byte_len, 0, "data must be whole entries");

        Self { byte_len, data }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.data.len() / self.byte_len
    }

    /// Returns `true` if the vector has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the length of an entry in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Returns the entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.data.get(index * self.byte_len..(index + 1) * self.byte_len)
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> {
        self.data.chunks_exact(self.byte_len)
    }

    /// Returns the concatenated entries.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the entries XORed with those of `other`.
    ///
    /// # Panics
    ///
    /// Panics if the shapes of the vectors differ.
    pub fn xor(&self, other: &ShareVector) -> ShareVector {
        assert_eq!(self.byte_len, other.byte_len, "byte lengths differ");
        assert_eq!(self.data.len(), other.data.len(), "lengths differ");

        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a ^ b)
            .collect();

        ShareVector::new(self.byte_len, data)
    }

    /// Returns a vector whose entry `i` is entry `perm[i]` of `self`.
    pub(crate) fn permute(&self, perm: &[usize]) -> ShareVector {
        let data = perm
            .iter()
            .flat_map(|&i| &self.data[i * self.byte_len..(i + 1) * self.byte_len])
            .copied()
            .collect();

        ShareVector::new(self.byte_len, data)
    }

    /// Consumes the vector, returning the concatenated entries.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// Output of the Random OSN sender.
///
/// The receiver's output satisfies `receiver.share()[i] ^ share()[i] = input_mask()[π(i)]`.
#[derive(Debug, Clone)]
pub struct ROSNSenderOutput {
    pub(crate) input_mask: ShareVector,
    pub(crate) share: ShareVector,
}

impl ROSNSenderOutput {
    /// Returns the random vector `a` fed into the network.
    pub fn input_mask(&self) -> &ShareVector {
        &self.input_mask
    }

    /// Returns the output masks `b` of the network.
    pub fn share(&self) -> &ShareVector {
        &self.share
    }

    /// Consumes the output, returning `(input_mask, share)`.
    pub fn into_parts(self) -> (ShareVector, ShareVector) {
        (self.input_mask, self.share)
    }
}

/// Output of the Random OSN receiver.
#[derive(Debug, Clone)]
pub struct ROSNReceiverOutput {
    pub(crate) share: ShareVector,
}

impl ROSNReceiverOutput {
    /// Returns the receiver's share `Δ` of the permuted vector.
    pub fn share(&self) -> &ShareVector {
        &self.share
    }

    /// Consumes the output, returning the receiver's share.
    pub fn into_share(self) -> ShareVector {
        self.share
    }

    /// Combines the receiver's share with the sender's share, returning the
    /// permuted random vector.
    pub fn unmask(&self, sender_share: &ShareVector) -> ShareVector {
        self.share.xor(sender_share)
    }
}
