//! # Signing Orders
//!
//! The result of resolving required keys for one role (payer or other
//! parties), and the factory through which callers choose their error type.

use super::entities::RequiredKey;
use serde::{Deserialize, Serialize};
use shared_types::EntityId;
use thiserror::Error;

/// Why a signing order could not be resolved.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyOrderingFailure {
    #[error("missing account")]
    MissingAccount,
    #[error("invalid account")]
    InvalidAccount,
    #[error("invalid payer account")]
    InvalidPayerAccount,
    #[error("missing file")]
    MissingFile,
    #[error("invalid contract")]
    InvalidContract,
    #[error("immutable contract")]
    ImmutableContract,
    #[error("invalid topic")]
    InvalidTopic,
    #[error("invalid schedule")]
    InvalidSchedule,
    #[error("immutable schedule")]
    ImmutableSchedule,
    #[error("unschedulable transaction")]
    UnschedulableTransaction,
    #[error("general resolution error")]
    GeneralError,
}

/// Default error report: the failure reason and the entity it concerns.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{reason} ({})", .entity.map_or_else(|| "no entity".to_string(), |e| e.to_string()))]
pub struct SigningOrderError {
    /// Failure category.
    pub reason: KeyOrderingFailure,
    /// The offending entity, when known.
    pub entity: Option<EntityId>,
}

/// Ordered required keys for one role, or an error report. Never partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningOrderResult<E> {
    Success(Vec<RequiredKey>),
    Failure(E),
}

impl<E> SigningOrderResult<E> {
    /// Whether resolution failed.
    pub fn has_error_report(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The resolved keys; empty on failure.
    pub fn keys(&self) -> &[RequiredKey] {
        match self {
            Self::Success(keys) => keys,
            Self::Failure(_) => &[],
        }
    }

    /// The error report, if resolution failed.
    pub fn error_report(&self) -> Option<&E> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }

    /// Convert into a `Result`.
    pub fn into_result(self) -> Result<Vec<RequiredKey>, E> {
        match self {
            Self::Success(keys) => Ok(keys),
            Self::Failure(e) => Err(e),
        }
    }
}

impl<E> From<Result<Vec<RequiredKey>, E>> for SigningOrderResult<E> {
    fn from(result: Result<Vec<RequiredKey>, E>) -> Self {
        match result {
            Ok(keys) => Self::Success(keys),
            Err(e) => Self::Failure(e),
        }
    }
}

/// Builds caller-specific error reports for failed resolutions.
pub trait SigningOrderResultFactory<E> {
    /// Report a failure, with the offending entity when known.
    fn for_failure(&self, reason: KeyOrderingFailure, entity: Option<EntityId>) -> E;
}

/// Produces [`SigningOrderError`] reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeOrderResultFactory;

impl SigningOrderResultFactory<SigningOrderError> for CodeOrderResultFactory {
    fn for_failure(&self, reason: KeyOrderingFailure, entity: Option<EntityId>) -> SigningOrderError {
        SigningOrderError { reason, entity }
    }
}

impl<E, F> SigningOrderResultFactory<E> for F
where
    F: Fn(KeyOrderingFailure, Option<EntityId>) -> E,
{
    fn for_failure(&self, reason: KeyOrderingFailure, entity: Option<EntityId>) -> E {
        self(reason, entity)
    }
}
