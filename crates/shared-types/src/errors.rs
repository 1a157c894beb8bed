//! # Error Types
//!
//! Defines error types for the shared ledger types.

use thiserror::Error;

/// Errors constructing or decoding a [`crate::Key`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Threshold keys require at least one active child.
    #[error("Threshold must be at least 1")]
    ZeroThreshold,

    /// Key nesting exceeds the supported depth.
    #[error("Key depth {depth} exceeds maximum {max}")]
    TooDeep { depth: usize, max: usize },

    /// Bytes could not be encoded or decoded.
    #[error("Key encoding error: {0}")]
    Encoding(String),
}

/// Errors decoding the signed-transaction envelope or its body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// The outer envelope is not decodable.
    #[error("Malformed signed transaction: {0}")]
    MalformedEnvelope(String),

    /// The body bytes are not decodable.
    #[error("Malformed transaction body: {0}")]
    MalformedBody(String),

    /// The body embeds a key nested deeper than keys may be.
    #[error("Embedded key depth {depth} exceeds maximum {max}")]
    KeyTooDeep { depth: usize, max: usize },

    /// The signature map bytes are not decodable.
    #[error("Malformed signature map: {0}")]
    MalformedSigMap(String),
}
