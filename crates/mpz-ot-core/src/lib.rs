//! Low-level crate containing core functionalities for oblivious transfer protocols.
//!
//! This crate is not intended to be used directly. Instead, use the higher-level APIs provided by
//! the `mpz-ot` crate.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

use serde::{Deserialize, Serialize};

pub mod ideal;

/// An oblivious transfer identifier.
///
/// Multiple transfers may be batched together under the same transfer ID.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TransferId(u64);

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransferId({})", self.0)
    }
}

impl TransferId {
    /// Creates a new transfer ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the transfer ID as an integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the current transfer ID, incrementing `self` in-place.
    pub fn next_id(&mut self) -> Self {
        let id = *self;
        self.0 += 1;
        id
    }
}

/// The output the sender receives from the COT functionality.
#[derive(Debug)]
pub struct COTSenderOutput<T> {
    /// The transfer id.
    pub id: TransferId,
    /// The `0-bit` messages.
    pub msgs: Vec<T>,
}

/// The output the receiver receives from the COT functionality.
#[derive(Debug)]
pub struct COTReceiverOutput<T> {
    /// The transfer id.
    pub id: TransferId,
    /// The chosen messages.
    pub msgs: Vec<T>,
}

/// The output the sender receives from the random COT functionality.
#[derive(Debug)]
pub struct RCOTSenderOutput<T> {
    /// The transfer id.
    pub id: TransferId,
    /// The `0-bit` messages.
    pub msgs: Vec<T>,
}

/// The output the receiver receives from the random COT functionality.
#[derive(Debug)]
pub struct RCOTReceiverOutput<T, U> {
    /// The transfer id.
    pub id: TransferId,
    /// The choice bits.
    pub choices: Vec<T>,
    /// The chosen messages.
    pub msgs: Vec<U>,
}
