//! Ideal Random OSN implementation.

use async_trait::async_trait;
use mpz_common::{
    ideal::{ideal_f2p, Alice, Bob},
    Context,
};
use mpz_osn_core::{
    ideal::IdealROSN, ROSNReceiverOutput, ROSNSenderOutput, Receiver as CoreReceiver,
    SenderError as CoreSenderError,
};

use crate::{OSNError, RandomOSNReceiver, RandomOSNSender};

type Outputs = (
    Result<ROSNSenderOutput, OSNError>,
    Result<ROSNReceiverOutput, OSNError>,
);

/// Ideal Random OSN sender.
#[derive(Debug, Clone)]
pub struct IdealROSNSender(Alice<IdealROSN>);

/// Ideal Random OSN receiver.
#[derive(Debug, Clone)]
pub struct IdealROSNReceiver(Bob<IdealROSN>);

/// Returns a Random OSN sender and receiver pair.
pub fn ideal_rosn() -> (IdealROSNSender, IdealROSNReceiver) {
    let (alice, bob) = ideal_f2p(IdealROSN::default());

    (IdealROSNSender(alice), IdealROSNReceiver(bob))
}

fn rosn(
    f: &mut IdealROSN,
    (num, sender_byte_len): (usize, usize),
    (perm, receiver_byte_len): (Vec<usize>, usize),
) -> Outputs {
    if num != perm.len() || sender_byte_len != receiver_byte_len {
        let reason = format!(
            "parties disagree on the invocation: sender ({num}, {sender_byte_len}), receiver ({}, {receiver_byte_len})",
            perm.len()
        );
        return (
            Err(OSNError::mismatch(reason.clone())),
            Err(OSNError::mismatch(reason)),
        );
    }

    match f.random_permute(&perm, sender_byte_len) {
        Ok((sender_output, receiver_output)) => (Ok(sender_output), Ok(receiver_output)),
        Err(err) => (Err(OSNError::mismatch(err.to_string())), Err(err.into())),
    }
}

#[async_trait]
impl<Ctx: Context> RandomOSNSender<Ctx> for IdealROSNSender {
    async fn rosn(
        &mut self,
        ctx: &mut Ctx,
        num: usize,
        byte_len: usize,
    ) -> Result<ROSNSenderOutput, OSNError> {
        if num == 0 {
            return Err(CoreSenderError::InvalidInput("at least one value".to_string()).into());
        }
        if byte_len == 0 {
            return Err(
                CoreSenderError::InvalidInput("values of at least one byte".to_string()).into(),
            );
        }

        self.0.call(ctx, (num, byte_len), rosn).await
    }
}

#[async_trait]
impl<Ctx: Context> RandomOSNReceiver<Ctx> for IdealROSNReceiver {
    async fn rosn(
        &mut self,
        ctx: &mut Ctx,
        perm: &[usize],
        byte_len: usize,
    ) -> Result<ROSNReceiverOutput, OSNError> {
        CoreReceiver::default().check(perm, byte_len)?;

        self.0.call(ctx, (perm.to_vec(), byte_len), rosn).await
    }
}
