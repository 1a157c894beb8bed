//! # Platform Signature Factory
//!
//! Turns required keys into verifiable signature records: one record per
//! simple leaf, in key order, carrying whatever signature bytes the
//! transaction supplies for that leaf.

use super::entities::{SignatureType, TransactionSignature};
use super::errors::SigCreationError;
use super::sig_bytes::PubKeyToSigBytes;
use shared_types::Key;
use tracing::debug;

/// Builds records bound to one transaction's signed bytes.
pub trait TxnScopedPlatformSigFactory {
    /// A record for `public_key` with the given signature bytes (possibly empty).
    fn signature_for(
        &self,
        signature_type: SignatureType,
        public_key: &[u8],
        signature: &[u8],
    ) -> Result<TransactionSignature, SigCreationError>;
}

/// Records over the canonical body bytes of a transaction.
#[derive(Debug, Clone, Copy)]
pub struct BodySigningSigFactory<'a> {
    signed_bytes: &'a [u8],
}

impl<'a> BodySigningSigFactory<'a> {
    pub fn new(signed_bytes: &'a [u8]) -> Self {
        Self { signed_bytes }
    }
}

impl TxnScopedPlatformSigFactory for BodySigningSigFactory<'_> {
    fn signature_for(
        &self,
        signature_type: SignatureType,
        public_key: &[u8],
        signature: &[u8],
    ) -> Result<TransactionSignature, SigCreationError> {
        TransactionSignature::new(signature_type, public_key, signature, self.signed_bytes)
    }
}

/// Records created so far, and the error that stopped creation, if any.
#[derive(Debug, Default)]
pub struct PlatformSigsCreationResult {
    platform_sigs: Vec<TransactionSignature>,
    terminating_error: Option<SigCreationError>,
}

impl PlatformSigsCreationResult {
    /// Whether creation stopped on an error.
    pub fn has_failed(&self) -> bool {
        self.terminating_error.is_some()
    }

    pub fn platform_sigs(&self) -> &[TransactionSignature] {
        &self.platform_sigs
    }

    pub fn terminating_error(&self) -> Option<&SigCreationError> {
        self.terminating_error.as_ref()
    }

    /// The records, or the terminating error.
    pub fn into_result(self) -> Result<Vec<TransactionSignature>, SigCreationError> {
        match self.terminating_error {
            Some(e) => Err(e),
            None => Ok(self.platform_sigs),
        }
    }
}

/// Create a record for every simple leaf of every key.
///
/// A leaf with no matching signature still gets a record, with an empty
/// signature segment; it will verify as invalid. Contract-id leaves and
/// empty leaves produce nothing. Creation stops at the first error from
/// the signature source or the factory.
pub fn create_ed25519_signatures<'k, I, S, F>(
    required_keys: I,
    sig_bytes: &S,
    factory: &F,
) -> PlatformSigsCreationResult
where
    I: IntoIterator<Item = &'k Key>,
    S: PubKeyToSigBytes + ?Sized,
    F: TxnScopedPlatformSigFactory + ?Sized,
{
    let mut result = PlatformSigsCreationResult::default();
    for key in required_keys {
        for leaf in key.simple_keys() {
            match record_for(leaf, sig_bytes, factory) {
                Ok(Some(record)) => result.platform_sigs.push(record),
                Ok(None) => {}
                Err(e) => {
                    debug!(
                        created = result.platform_sigs.len(),
                        error = %e,
                        "Signature record creation aborted"
                    );
                    result.terminating_error = Some(e);
                    return result;
                }
            }
        }
    }
    result
}

fn record_for<S, F>(
    leaf: &Key,
    sig_bytes: &S,
    factory: &F,
) -> Result<Option<TransactionSignature>, SigCreationError>
where
    S: PubKeyToSigBytes + ?Sized,
    F: TxnScopedPlatformSigFactory + ?Sized,
{
    let (signature_type, public_key) = match leaf {
        Key::Ed25519(bytes) => (SignatureType::Ed25519, bytes),
        Key::EcdsaSecp256k1(bytes) => (SignatureType::EcdsaSecp256k1, bytes),
        _ => return Ok(None),
    };
    if public_key.is_empty() {
        return Ok(None);
    }
    let signature = sig_bytes.sig_bytes_for(public_key)?.unwrap_or_default();
    factory
        .signature_for(signature_type, public_key, &signature)
        .map(Some)
}
