//! Random Oblivious Switching Network (Random OSN) protocols.
//!
//! A Random OSN lets a receiver holding a private permutation `π` obtain a share
//! of a random vector permuted by `π`, while the sender obtains the random vector
//! and the complementary share. See [`RandomOSNSender`] and [`RandomOSNReceiver`].

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod cot;
#[cfg(any(test, feature = "ideal"))]
pub mod ideal;

use async_trait::async_trait;
use mpz_osn_core::{ReceiverError as CoreReceiverError, SenderError as CoreSenderError};
use mpz_ot::OTError;
use std::{error::Error, fmt::Display, io::Error as IOError};

pub use mpz_osn_core::{
    ROSNConfig, ROSNConfigBuilder, ROSNReceiverOutput, ROSNSenderOutput, ShareVector,
};

/// Random OSN sender.
///
/// The sender obtains a random vector `a` and a random vector `b`, such that
/// `Δ[i] ^ b[i] = a[π(i)]` holds, where `π` and `Δ` are the [`RandomOSNReceiver`]'s
/// input and output respectively.
#[async_trait]
pub trait RandomOSNSender<Ctx> {
    /// Runs the Random OSN protocol.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The thread context.
    /// * `num` - The number of values.
    /// * `byte_len` - The length of a value in bytes.
    async fn rosn(
        &mut self,
        ctx: &mut Ctx,
        num: usize,
        byte_len: usize,
    ) -> Result<ROSNSenderOutput, OSNError>;
}

/// Random OSN receiver.
///
/// The receiver inputs a permutation `π` and obtains `Δ`, such that
/// `Δ[i] ^ b[i] = a[π(i)]` holds, where `a` and `b` are the [`RandomOSNSender`]'s
/// outputs.
#[async_trait]
pub trait RandomOSNReceiver<Ctx> {
    /// Runs the Random OSN protocol.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The thread context.
    /// * `perm` - The permutation, routing entry `perm[i]` to position `i`.
    /// * `byte_len` - The length of a value in bytes.
    async fn rosn(
        &mut self,
        ctx: &mut Ctx,
        perm: &[usize],
        byte_len: usize,
    ) -> Result<ROSNReceiverOutput, OSNError>;
}

/// A Random OSN error.
#[derive(Debug, thiserror::Error)]
pub struct OSNError {
    kind: OSNErrorKind,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl OSNError {
    fn new<E>(kind: OSNErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    pub(crate) fn state<E>(source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::new(OSNErrorKind::State, source)
    }

    /// The parties ran inconsistent invocations.
    #[cfg(any(test, feature = "ideal"))]
    pub(crate) fn mismatch<E>(source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::new(OSNErrorKind::Core, source)
    }

    /// Returns `true` if the error aborted the session.
    ///
    /// An aborted session must be discarded, the protocol can only be run again
    /// with a new sender and receiver. Configuration and state errors are
    /// raised before anything is sent and leave the session intact.
    pub fn is_abort(&self) -> bool {
        matches!(
            self.kind,
            OSNErrorKind::OT | OSNErrorKind::IO | OSNErrorKind::Core
        )
    }
}

impl Display for OSNError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            OSNErrorKind::Config => write!(f, "Config Error"),
            OSNErrorKind::OT => write!(f, "OT Error"),
            OSNErrorKind::IO => write!(f, "IO Error"),
            OSNErrorKind::Core => write!(f, "OSN Core Error"),
            OSNErrorKind::State => write!(f, "State Error"),
        }?;

        if let Some(source) = self.source.as_ref() {
            write!(f, " caused by: {source}")?;
        }

        Ok(())
    }
}

#[derive(Debug)]
pub(crate) enum OSNErrorKind {
    Config,
    OT,
    IO,
    Core,
    State,
}

impl From<OTError> for OSNError {
    fn from(value: OTError) -> Self {
        Self::new(OSNErrorKind::OT, value)
    }
}

impl From<IOError> for OSNError {
    fn from(value: IOError) -> Self {
        Self::new(OSNErrorKind::IO, value)
    }
}

impl From<CoreSenderError> for OSNError {
    fn from(value: CoreSenderError) -> Self {
        let kind = if value.is_input() {
            OSNErrorKind::Config
        } else {
            OSNErrorKind::Core
        };

        Self::new(kind, value)
    }
}

impl From<CoreReceiverError> for OSNError {
    fn from(value: CoreReceiverError) -> Self {
        let kind = if value.is_input() {
            OSNErrorKind::Config
        } else {
            OSNErrorKind::Core
        };

        Self::new(kind, value)
    }
}
