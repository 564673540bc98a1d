//! Ideal functionality for correlated oblivious transfer.

use async_trait::async_trait;

use mpz_common::{
    ideal::{ideal_f2p, Alice, Bob},
    Context,
};
use mpz_core::Block;
use mpz_ot_core::{ideal::cot::IdealCOT, COTReceiverOutput, COTSenderOutput};

use crate::{COTReceiver, COTSender, Correlation, DeltaSetup, OTError, OTSetup};

fn cot(
    f: &mut IdealCOT,
    sender_count: usize,
    choices: Vec<bool>,
) -> (COTSenderOutput<Block>, COTReceiverOutput<Block>) {
    assert_eq!(sender_count, choices.len());

    f.correlated(choices)
}

/// Returns an ideal COT sender and receiver.
pub fn ideal_cot() -> (IdealCOTSender, IdealCOTReceiver) {
    let (alice, bob) = ideal_f2p(IdealCOT::default());
    (IdealCOTSender(alice), IdealCOTReceiver(bob))
}

/// Returns an ideal COT sender and receiver with the provided PRG seed and correlation.
pub fn ideal_cot_with_delta(seed: Block, delta: Block) -> (IdealCOTSender, IdealCOTReceiver) {
    let (alice, bob) = ideal_f2p(IdealCOT::new(seed, delta));
    (IdealCOTSender(alice), IdealCOTReceiver(bob))
}

/// Ideal COT sender.
#[derive(Debug, Clone)]
pub struct IdealCOTSender(Alice<IdealCOT>);

#[async_trait]
impl<Ctx> OTSetup<Ctx> for IdealCOTSender
where
    Ctx: Context,
{
    async fn setup(&mut self, _ctx: &mut Ctx) -> Result<(), OTError> {
        Ok(())
    }
}

#[async_trait]
impl<Ctx> DeltaSetup<Ctx, Block> for IdealCOTSender
where
    Ctx: Context,
{
    async fn setup_with_delta(&mut self, _ctx: &mut Ctx, delta: Block) -> Result<(), OTError> {
        self.0.lock().set_delta(delta);
        Ok(())
    }
}

impl Correlation for IdealCOTSender {
    type Correlation = Block;

    fn delta(&self) -> Block {
        self.0.lock().delta()
    }
}

#[async_trait]
impl<Ctx: Context> COTSender<Ctx, Block> for IdealCOTSender {
    async fn send_correlated(
        &mut self,
        ctx: &mut Ctx,
        count: usize,
    ) -> Result<COTSenderOutput<Block>, OTError> {
        Ok(self.0.call(ctx, count, cot).await)
    }
}

/// Ideal COT receiver.
#[derive(Debug, Clone)]
pub struct IdealCOTReceiver(Bob<IdealCOT>);

#[async_trait]
impl<Ctx> OTSetup<Ctx> for IdealCOTReceiver
where
    Ctx: Context,
{
    async fn setup(&mut self, _ctx: &mut Ctx) -> Result<(), OTError> {
        Ok(())
    }
}

#[async_trait]
impl<Ctx: Context> COTReceiver<Ctx, bool, Block> for IdealCOTReceiver {
    async fn receive_correlated(
        &mut self,
        ctx: &mut Ctx,
        choices: &[bool],
    ) -> Result<COTReceiverOutput<Block>, OTError> {
        Ok(self.0.call(ctx, choices.to_vec(), cot).await)
    }
}
