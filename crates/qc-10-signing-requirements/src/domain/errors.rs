//! # Signing Requirement Errors
//!
//! Error types for every stage of the authorization pipeline.
//!
//! Missing or cryptographically invalid signatures are NOT errors; they are
//! data outcomes folded into the activation verdict. The types below cover
//! the failures that must abort or be reported to the caller.

use super::signing_order::SigningOrderError;
use shared_types::AccountId;
use thiserror::Error;

/// The signature map attached to a transaction cannot be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigMapError {
    /// The map bytes do not decode.
    #[error("Malformed signature map: {0}")]
    Malformed(String),
}

/// Terminating failures while building platform signature records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigCreationError {
    /// Signature bytes could not be sourced.
    #[error("Cannot source signature bytes: {0}")]
    MalformedSigMap(#[from] SigMapError),

    /// A record segment does not fit the record's addressing.
    #[error("Signature buffer of {len} bytes exceeds u32 addressing")]
    OversizedBuffer { len: usize },

    /// The scheduled operation whose bytes scheduled keys sign is missing
    /// or does not encode.
    #[error("Scheduled operation unavailable for signing: {0}")]
    ScheduledTxn(String),
}

/// Failure of the verification backend itself.
///
/// Distinct from a signature being invalid, which is recorded on the
/// signature record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifierError {
    /// The dedicated verification pool could not be built.
    #[error("Verifier thread pool unavailable: {0}")]
    ThreadPool(String),

    /// Verification returned with records still unknown.
    #[error("Verifier left {count} signatures unverified")]
    Incomplete { count: usize },
}

/// Errors propagated out of the precheck orchestrator.
///
/// An unresolvable payer is not among them: it yields a `false` verdict.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrecheckError {
    /// A non-payer party references an account that does not exist.
    #[error("Account {0} does not exist")]
    InvalidAccountId(AccountId),

    /// Other-party key resolution failed.
    #[error("Signing requirements unresolvable: {0}")]
    Resolution(#[from] SigningOrderError),

    /// Signature records could not be built.
    #[error("Signature records unavailable: {0}")]
    SigCreation(#[from] SigCreationError),

    /// The verification backend failed.
    #[error("Verification engine failure: {0}")]
    Verifier(#[from] VerifierError),
}

/// Errors propagated out of handle-time signature expansion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandleSigsError {
    /// Signature records could not be built.
    #[error("Signature records unavailable: {0}")]
    SigCreation(#[from] SigCreationError),

    /// The verification backend failed.
    #[error("Verification engine failure: {0}")]
    Verifier(#[from] VerifierError),
}
