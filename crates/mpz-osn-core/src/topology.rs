//! Layout of the switching network.
//!
//! A network on `n` wires is built recursively. One and two wires are trivial,
//! three wires use three switches on `(0, 1)`, `(1, 2)` and `(0, 1)`. Larger
//! networks place a layer of `⌊n/2⌋` switches on each side of two sub-networks
//! of sizes `⌊n/2⌋` (top) and `⌈n/2⌉` (bottom). For odd `n` the last wire bypasses
//! both outer layers and enters the bottom sub-network directly.
//!
//! Switch coordinates are `(level, width)`. A network occupying width offset `w`
//! places its top sub-network at `w` and its bottom sub-network at
//! `w + ⌊⌊n/2⌋/2⌋`, so the two never share a coordinate.

use mpz_core::Block;
use mpz_ot_core::TransferId;
use zeroize::Zeroizing;

/// Returns the depth of a network on `n` wires.
pub fn levels(mut n: usize) -> usize {
    let mut depth = 0;
    loop {
        match n {
            0 | 1 => return depth,
            2 => return depth + 1,
            3 => return depth + 3,
            _ => {
                depth += 2;
                n = n.div_ceil(2);
            }
        }
    }
}

/// Returns the largest number of switches on any level of a network on `n` wires.
pub fn width(n: usize) -> usize {
    (n / 2).max(1)
}

/// The switch layout of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    num: usize,
    levels: usize,
    width: usize,
}

impl Topology {
    /// Computes the topology of a network on `num` wires.
    pub fn new(num: usize) -> Self {
        Self {
            num,
            levels: levels(num),
            width: width(num),
        }
    }

    /// Returns the number of wires.
    pub fn num(&self) -> usize {
        self.num
    }

    /// Returns the number of levels.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Returns the number of switch positions per level.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of switch positions in the network, `levels · width`.
    pub fn slots(&self) -> usize {
        self.levels * self.width
    }

    /// Returns the level-major index of the switch at `(level, width)`.
    pub fn index(&self, level: usize, width: usize) -> usize {
        debug_assert!(level < self.levels && width < self.width);
        level * self.width + width
    }
}

/// Size of the top sub-network of a network on `n >= 4` wires.
#[inline]
pub(crate) fn top_len(n: usize) -> usize {
    n / 2
}

/// Width offset of the bottom sub-network, relative to its parent.
#[inline]
pub(crate) fn bottom_offset(n: usize) -> usize {
    (n / 2) / 2
}

/// Returns the tweak under which the COT at `width` of batch `id` is extended.
#[inline]
pub(crate) fn tweak(id: TransferId, width: usize) -> Block {
    Block::from(((id.as_u64() as u128) << 64) + width as u128)
}

/// Splits `values` into the inputs of the top and bottom sub-networks.
///
/// `values[2k]` goes to `top[k]` and `values[2k + 1]` to `bottom[k]`; for odd `n`
/// the last value is appended to `bottom`.
pub(crate) fn split_wires(
    values: &[u8],
    byte_len: usize,
) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
    let n = values.len() / byte_len;
    let half = top_len(n);

    let mut top = Zeroizing::new(Vec::with_capacity(half * byte_len));
    let mut bottom = Zeroizing::new(Vec::with_capacity((n - half) * byte_len));
    for pair in values[..2 * half * byte_len].chunks_exact(2 * byte_len) {
        let (v0, v1) = pair.split_at(byte_len);
        top.extend_from_slice(v0);
        bottom.extend_from_slice(v1);
    }
    if n % 2 == 1 {
        bottom.extend_from_slice(&values[(n - 1) * byte_len..]);
    }

    (top, bottom)
}

/// Inverse of [`split_wires`], writing the merged wires into `values`.
pub(crate) fn merge_wires(top: &[u8], bottom: &[u8], values: &mut [u8], byte_len: usize) {
    let n = values.len() / byte_len;
    let half = top_len(n);

    for (k, pair) in values[..2 * half * byte_len]
        .chunks_exact_mut(2 * byte_len)
        .enumerate()
    {
        let (v0, v1) = pair.split_at_mut(byte_len);
        v0.copy_from_slice(&top[k * byte_len..(k + 1) * byte_len]);
        v1.copy_from_slice(&bottom[k * byte_len..(k + 1) * byte_len]);
    }
    if n % 2 == 1 {
        values[(n - 1) * byte_len..].copy_from_slice(&bottom[half * byte_len..]);
    }
}
