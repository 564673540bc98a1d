//! Common functionality for `mpz`.
//!
//! This crate provides the functionality needed for modeling protocol execution:
//! thread contexts with their I/O channels, ideal two-party functionalities and
//! CPU scheduling.
//!
//! This crate does not provide any cryptographic primitives, see `mpz-core` for that.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

mod context;
pub mod cpu;
pub mod executor;
mod id;
#[cfg(any(test, feature = "ideal"))]
pub mod ideal;

pub use context::Context;
pub use id::ThreadId;
