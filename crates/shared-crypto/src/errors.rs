//! Crypto error types.

use thiserror::Error;

/// Failures of raw key and signature handling.
///
/// Callers verifying transaction signatures only care whether verification
/// succeeded; the variants exist for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Public key bytes have the wrong length for the scheme
    #[error("public key must be {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required length in bytes
        expected: usize,
        /// Supplied length in bytes
        actual: usize,
    },

    /// Bytes do not encode a point on the curve
    #[error("public key is not a valid curve point")]
    InvalidPublicKey,

    /// Secret scalar out of range
    #[error("secret key is out of range")]
    InvalidPrivateKey,

    /// Signature bytes have the wrong length
    #[error("signature must be 64 bytes")]
    InvalidSignatureFormat,

    /// Signature bytes have the right length but are not a valid encoding
    #[error("signature encoding rejected")]
    InvalidSignature,

    /// Well-formed signature that does not match key and message
    #[error("signature does not verify")]
    SignatureVerificationFailed,
}
