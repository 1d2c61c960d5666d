//! The crate's public error taxonomy.
//!
//! A searchable outcome ("this gadget is / is not t-NI") is not an error — it is reported as
//! a [`VerificationOutcome`] returned from the property drivers in [`crate::properties`].
//! [`VerifyError`] is reserved for the three ways a call can fail to even produce that
//! verdict: bad configuration, a circuit that violates the format invariants the engine
//! relies on, or an internal consistency violation that should be unreachable for a
//! well-formed circuit.

use thiserror::Error;

use crate::comb::Comb;

/// The crate's result alias. Every fallible entry point into the engine returns this.
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Errors produced by the verification engine.
///
/// The engine never calls `process::exit`; propagation stops at this type, and mapping it to
/// a process exit status is left to the binary embedding the crate (see `core/examples/*.rs`).
#[derive(Error, Debug)]
pub enum VerifyError {
    /// A requested configuration is missing a required input, or combines options the engine
    /// does not support together (e.g. CRPC requested against a circuit with more than one
    /// output).
    #[error("configuration error: {0}")]
    Config(String),

    /// The circuit violates an invariant the engine requires to build a [`crate::circuit::Circuit`],
    /// such as a multiplication operand that contains the same input share, or the same random,
    /// on both sides of the product.
    #[error("malformed circuit at wire `{wire}`: {reason}")]
    MalformedCircuit { wire: String, reason: String },

    /// A dimension-reduction or gauss-elimination invariant was violated that should be
    /// unreachable given a well-formed circuit. Seeing this means a bug in the engine itself,
    /// not a problem with the input.
    #[error("internal consistency violation: {0}")]
    Internal(String),
}

impl VerifyError {
    pub fn malformed(wire: impl Into<String>, reason: impl Into<String>) -> Self {
        VerifyError::MalformedCircuit {
            wire: wire.into(),
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        VerifyError::Internal(reason.into())
    }
}

/// The result of running a property driver to completion: either the circuit satisfies the
/// property, or it doesn't, with an explicit witness tuple and which input(s) it leaks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// No leaking tuple was found within the property's search space.
    Secure,
    /// A leaking tuple was found.
    Leaky {
        /// The probe combination that leaks, in terms of the original (pre-reduction) circuit.
        witness: Comb,
        /// Which secret inputs (by index, `0` or `1`) the witness tuple leaks.
        leaked_inputs: Vec<usize>,
    },
}

impl VerificationOutcome {
    pub fn is_secure(&self) -> bool {
        matches!(self, VerificationOutcome::Secure)
    }

    pub fn is_leaky(&self) -> bool {
        !self.is_secure()
    }
}
