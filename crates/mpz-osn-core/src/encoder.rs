//! The OT-based 2x2 switch gadget.
//!
//! For a switch with sender input masks `x0, x1` and output masks `o0, o1` the
//! two routing messages are
//!
//! ```text
//! m0 = (x0 ^ o0) || (x1 ^ o1)    straight
//! m1 = (x1 ^ o0) || (x0 ^ o1)    crossed
//! ```
//!
//! and the correction for branch `b` is `m_b` padded with the extension of the
//! `b`-th COT key. A receiver holding the pad for its control bit recovers exactly
//! `m_b`.

#[inline]
fn xor_into(dst: &mut [u8], a: &[u8], b: &[u8]) {
    dst.iter_mut()
        .zip(a.iter().zip(b))
        .for_each(|(d, (a, b))| *d ^= a ^ b);
}

#[inline]
fn xor_assign(dst: &mut [u8], src: &[u8]) {
    dst.iter_mut().zip(src).for_each(|(d, s)| *d ^= s);
}

/// Encodes the corrections of one switch.
///
/// On entry `corr0` and `corr1` hold the extended keys of the two branches, on
/// return they hold the corrections.
///
/// # Arguments
///
/// * `inputs` - The masks of the two input wires.
/// * `outputs` - The masks of the two output wires.
/// * `corr0` - Extended key of branch 0, `2 · byte_len` bytes.
/// * `corr1` - Extended key of branch 1, `2 · byte_len` bytes.
pub fn encode(
    inputs: [&[u8]; 2],
    outputs: [&[u8]; 2],
    corr0: &mut [u8],
    corr1: &mut [u8],
) {
    let byte_len = inputs[0].len();
    debug_assert_eq!(corr0.len(), 2 * byte_len);
    debug_assert_eq!(corr1.len(), 2 * byte_len);

    let (lo, hi) = corr0.split_at_mut(byte_len);
    xor_into(lo, inputs[0], outputs[0]);
    xor_into(hi, inputs[1], outputs[1]);

    let (lo, hi) = corr1.split_at_mut(byte_len);
    xor_into(lo, inputs[1], outputs[0]);
    xor_into(hi, inputs[0], outputs[1]);
}

/// Applies a recovered routing message to the receiver's running values.
///
/// `values` holds the two running values `r0 || r1` and `msg` holds `h0 || h1`.
/// Afterwards `values` is `(r0 ^ h0) || (r1 ^ h1)` if `bit` is unset and
/// `(r1 ^ h0) || (r0 ^ h1)` otherwise.
pub fn decode(bit: bool, msg: &[u8], values: &mut [u8]) {
    debug_assert_eq!(msg.len(), values.len());

    let byte_len = values.len() / 2;
    let (r0, r1) = values.split_at_mut(byte_len);
    if bit {
        r0.swap_with_slice(r1);
    }
    xor_assign(r0, &msg[..byte_len]);
    xor_assign(r1, &msg[byte_len..]);
}

/// XORs `pad` into `msg`.
#[inline]
pub(crate) fn unpad(msg: &mut [u8], pad: &[u8]) {
    xor_assign(msg, pad);
}
