//! Core components of the Random Oblivious Switching Network (Random OSN) protocol.
//!
//! The receiver holds a permutation `π` on `n` positions. The sender learns a
//! random vector `a` and a random vector `b`, the receiver learns `Δ` such that
//! `Δ[i] ^ b[i] = a[π(i)]`. Neither party learns anything else.
//!
//! The permutation is realized by a Beneš-style switching network. Each switch
//! consumes one correlated OT, chosen by the receiver with the switch's control
//! bit, and the sender sends a pair of corrections per switch.
//!
//! # Example
//!
//! ```
//! use mpz_ot_core::ideal::cot::IdealCOT;
//! use mpz_osn_core::{Receiver, Sender};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let perm = [2, 0, 4, 1, 3];
//! let byte_len = 16;
//!
//! let sender = Sender::default();
//! let receiver = Receiver::default();
//! let mut cot = IdealCOT::default();
//!
//! // The receiver routes the permutation and chooses one COT per switch.
//! let routing = receiver.route(&perm, byte_len).unwrap();
//! let (sender_cots, receiver_cots): (Vec<_>, Vec<_>) = (0..routing.topology().levels())
//!     .map(|level| cot.correlated(routing.level(level).to_vec()))
//!     .unzip();
//!
//! let (sender_output, corrections) = sender
//!     .build(perm.len(), byte_len, cot.delta(), &sender_cots, &mut StdRng::seed_from_u64(0))
//!     .unwrap();
//! let receiver_output = receiver
//!     .apply(&routing, byte_len, &receiver_cots, &corrections)
//!     .unwrap();
//!
//! let permuted = receiver_output.unmask(sender_output.share());
//! for (i, &p) in perm.iter().enumerate() {
//!     assert_eq!(permuted.get(i), sender_output.input_mask().get(p));
//! }
//! ```

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

mod config;
pub mod encoder;
mod error;
pub mod extension;
pub mod ideal;
mod masks;
mod msgs;
mod output;
mod receiver;
pub mod router;
mod sender;
pub mod topology;

pub use config::{ROSNConfig, ROSNConfigBuilder, ROSNConfigBuilderError};
pub use error::{ReceiverError, SenderError};
pub use msgs::Corrections;
pub use output::{ROSNReceiverOutput, ROSNSenderOutput, ShareVector};
pub use receiver::Receiver;
pub use router::Routing;
pub use sender::Sender;
pub use topology::Topology;
