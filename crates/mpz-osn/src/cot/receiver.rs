use std::mem;

use async_trait::async_trait;
use enum_try_as_inner::EnumTryAsInner;
use mpz_common::{cpu::CpuBackend, Context};
use mpz_core::Block;
use mpz_osn_core::{Corrections, ROSNConfig, ROSNReceiverOutput, Receiver as ReceiverCore};
use mpz_ot::{COTReceiver, OTSetup};
use serio::stream::IoStreamExt as _;
use tracing::{debug, instrument, trace};

use crate::{OSNError, RandomOSNReceiver};

#[derive(Debug, EnumTryAsInner)]
#[derive_err(Debug)]
pub(crate) enum State {
    Initialized(ReceiverCore),
    Setup(ReceiverCore),
    Error,
}

impl From<StateError> for OSNError {
    fn from(err: StateError) -> Self {
        OSNError::state(err.to_string())
    }
}

/// Random OSN receiver built on correlated OT.
#[derive(Debug)]
pub struct Receiver<COT> {
    state: State,
    cot: COT,
}

impl<COT> Receiver<COT> {
    /// Creates a new receiver.
    ///
    /// # Arguments
    ///
    /// * `config` - The Random OSN configuration.
    /// * `cot` - The COT receiver.
    pub fn new(config: ROSNConfig, cot: COT) -> Self {
        Self {
            state: State::Initialized(ReceiverCore::new(config)),
            cot,
        }
    }

    /// Sets up the receiver.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The thread context.
    #[instrument(level = "debug", fields(thread = %ctx.id()), skip_all, err)]
    pub async fn setup<Ctx: Context>(&mut self, ctx: &mut Ctx) -> Result<(), OSNError>
    where
        COT: OTSetup<Ctx> + Send,
    {
        let core = mem::replace(&mut self.state, State::Error).try_into_initialized()?;

        self.cot.setup(ctx).await?;

        debug!("COT set up");

        self.state = State::Setup(core);

        Ok(())
    }
}

#[async_trait]
impl<Ctx, COT> RandomOSNReceiver<Ctx> for Receiver<COT>
where
    Ctx: Context,
    COT: COTReceiver<Ctx, bool, Block> + Send,
{
    #[instrument(level = "debug", fields(thread = %ctx.id(), num = perm.len(), byte_len = byte_len), skip_all, err)]
    async fn rosn(
        &mut self,
        ctx: &mut Ctx,
        perm: &[usize],
        byte_len: usize,
    ) -> Result<ROSNReceiverOutput, OSNError> {
        // Invalid inputs are rejected before the state is taken.
        self.state.try_as_setup()?.check(perm, byte_len)?;
        let core = mem::replace(&mut self.state, State::Error).try_into_setup()?;

        let perm = perm.to_vec();
        let (core, routing) = CpuBackend::blocking(move || {
            let routing = core.route(&perm, byte_len);
            (core, routing)
        })
        .await;
        let routing = routing?;
        let topology = *routing.topology();

        debug!(
            levels = topology.levels(),
            width = topology.width(),
            "routed permutation"
        );

        let mut cots = Vec::with_capacity(topology.levels());
        for level in 0..topology.levels() {
            cots.push(self.cot.receive_correlated(ctx, routing.level(level)).await?);
        }

        trace!(batches = cots.len(), "acquired COTs");

        let corrections: Corrections = ctx.io_mut().expect_next().await?;

        debug!(entries = corrections.len(), "received corrections");

        let (core, output) = CpuBackend::blocking(move || {
            let output = core.apply(&routing, byte_len, &cots, &corrections);
            (core, output)
        })
        .await;
        let output = output?;

        self.state = State::Setup(core);

        Ok(output)
    }
}
