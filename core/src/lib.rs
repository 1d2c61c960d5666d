#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

//! A tuple-enumeration verifier for composable masking gadgets.
//!
//! Given a [`circuit::Circuit`] whose wires carry secret values split into `n` shares, this
//! crate decides whether the circuit satisfies one of a family of composable masking
//! properties (see [`properties`]) or produces an explicit leaking probe tuple as a
//! counter-example. The hard part — and the reason this crate exists — is the combinatorial
//! search in [`driver`], [`comb`], [`gauss`] and [`reduce`]: the actual property definitions in
//! [`properties`] are thin instantiations of that search with different prefixes, failure
//! predicates and callbacks.

pub mod bitdep;
pub mod circuit;
pub mod coeff;
pub mod comb;
pub mod config;
pub mod driver;
pub mod error;
pub mod factor;
pub mod failure;
pub mod gauss;
pub mod properties;
pub mod reduce;
pub mod trie;
pub mod util;

#[cfg(any(test, feature = "test-fixture"))]
pub mod fixtures;

pub use circuit::Circuit;
pub use config::EngineConfig;
pub use error::{Result, VerifyError};
