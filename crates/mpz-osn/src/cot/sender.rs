use std::mem;

use async_trait::async_trait;
use enum_try_as_inner::EnumTryAsInner;
use mpz_common::{cpu::CpuBackend, Context};
use mpz_core::{prg::Prg, Block};
use mpz_osn_core::{ROSNConfig, ROSNSenderOutput, Sender as SenderCore};
use mpz_ot::{COTSender, Correlation, DeltaSetup};
use rand::{thread_rng, Rng, SeedableRng};
use serio::SinkExt as _;
use tracing::{debug, instrument, trace};

use crate::{OSNError, RandomOSNSender};

#[derive(Debug, EnumTryAsInner)]
#[derive_err(Debug)]
pub(crate) enum State {
    Initialized(SenderCore),
    Setup(SenderCore),
    Error,
}

impl From<StateError> for OSNError {
    fn from(err: StateError) -> Self {
        OSNError::state(err.to_string())
    }
}

/// Random OSN sender built on correlated OT.
#[derive(Debug)]
pub struct Sender<COT> {
    state: State,
    cot: COT,
}

impl<COT> Sender<COT> {
    /// Creates a new sender.
    ///
    /// # Arguments
    ///
    /// * `config` - The Random OSN configuration.
    /// * `cot` - The COT sender.
    pub fn new(config: ROSNConfig, cot: COT) -> Self {
        Self {
            state: State::Initialized(SenderCore::new(config)),
            cot,
        }
    }

    /// Sets up the sender, sampling a fresh COT correlation for this session.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The thread context.
    #[instrument(level = "debug", fields(thread = %ctx.id()), skip_all, err)]
    pub async fn setup<Ctx: Context>(&mut self, ctx: &mut Ctx) -> Result<(), OSNError>
    where
        COT: DeltaSetup<Ctx, Block> + Send,
    {
        let core = mem::replace(&mut self.state, State::Error).try_into_initialized()?;

        let delta: Block = thread_rng().gen();
        self.cot.setup_with_delta(ctx, delta).await?;

        debug!("COT correlation set up");

        self.state = State::Setup(core);

        Ok(())
    }
}

#[async_trait]
impl<Ctx, COT> RandomOSNSender<Ctx> for Sender<COT>
where
    Ctx: Context,
    COT: COTSender<Ctx, Block> + Correlation<Correlation = Block> + Send,
{
    #[instrument(level = "debug", fields(thread = %ctx.id(), num = num, byte_len = byte_len), skip_all, err)]
    async fn rosn(
        &mut self,
        ctx: &mut Ctx,
        num: usize,
        byte_len: usize,
    ) -> Result<ROSNSenderOutput, OSNError> {
        // Invalid inputs are rejected before the state is taken.
        let topology = self.state.try_as_setup()?.topology(num, byte_len)?;
        let core = mem::replace(&mut self.state, State::Error).try_into_setup()?;

        debug!(
            levels = topology.levels(),
            width = topology.width(),
            "selected topology"
        );

        let mut cots = Vec::with_capacity(topology.levels());
        for _ in 0..topology.levels() {
            cots.push(self.cot.send_correlated(ctx, topology.width()).await?);
        }

        trace!(batches = cots.len(), "acquired COTs");

        let delta = self.cot.delta();
        let seed: Block = thread_rng().gen();
        let (core, output) = CpuBackend::blocking(move || {
            let output = core.build(num, byte_len, delta, &cots, &mut Prg::from_seed(seed));
            (core, output)
        })
        .await;
        let (output, corrections) = output?;

        ctx.io_mut().send(corrections).await?;

        debug!("sent corrections");

        self.state = State::Setup(core);

        Ok(output)
    }
}
