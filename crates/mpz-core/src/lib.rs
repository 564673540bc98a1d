//! Core types and cryptographic primitives shared by the `mpz` crates.

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod aes;
pub mod block;
pub mod prg;

pub use block::Block;
