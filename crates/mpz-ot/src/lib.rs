//! Implementations of oblivious transfer protocols.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

#[cfg(any(test, feature = "ideal"))]
pub mod ideal;

use async_trait::async_trait;

pub use mpz_ot_core::{
    COTReceiverOutput, COTSenderOutput, RCOTReceiverOutput, RCOTSenderOutput, TransferId,
};

/// An oblivious transfer error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum OTError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("sender error: {0}")]
    SenderError(Box<dyn std::error::Error + Send + Sync>),
    #[error("receiver error: {0}")]
    ReceiverError(Box<dyn std::error::Error + Send + Sync>),
}

/// An oblivious transfer protocol that needs to perform a one-time setup.
#[async_trait]
pub trait OTSetup<Ctx> {
    /// Runs any one-time setup for the protocol.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The thread context.
    async fn setup(&mut self, ctx: &mut Ctx) -> Result<(), OTError>;
}

/// A correlated oblivious transfer sender which holds a global correlation.
pub trait Correlation {
    /// The correlation type.
    type Correlation;

    /// Returns the correlation, delta.
    fn delta(&self) -> Self::Correlation;
}

/// A correlated oblivious transfer sender whose correlation is chosen by the caller.
#[async_trait]
pub trait DeltaSetup<Ctx, T> {
    /// Runs the one-time setup for the protocol using the provided correlation.
    ///
    /// The correlation must be sampled fresh for every session.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The thread context.
    /// * `delta` - The global correlation.
    async fn setup_with_delta(&mut self, ctx: &mut Ctx, delta: T) -> Result<(), OTError>;
}

/// A correlated oblivious transfer sender.
#[async_trait]
pub trait COTSender<Ctx, T> {
    /// Obliviously transfers the correlated messages to the receiver.
    ///
    /// Returns the `0`-bit messages that were obliviously transferred.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The thread context.
    /// * `count` - The number of correlated messages to obliviously transfer.
    async fn send_correlated(
        &mut self,
        ctx: &mut Ctx,
        count: usize,
    ) -> Result<COTSenderOutput<T>, OTError>;
}

/// A correlated oblivious transfer receiver.
#[async_trait]
pub trait COTReceiver<Ctx, T, U> {
    /// Obliviously receives correlated messages from the sender.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The thread context.
    /// * `choices` - The choices made by the receiver.
    async fn receive_correlated(
        &mut self,
        ctx: &mut Ctx,
        choices: &[T],
    ) -> Result<COTReceiverOutput<U>, OTError>;
}
