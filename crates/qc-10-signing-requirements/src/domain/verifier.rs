//! # Synchronous Verifier
//!
//! Cryptographically verifies a batch of signature records in place and
//! returns only once every record is `Valid` or `Invalid`.

use super::entities::{SignatureType, TransactionSignature, VerificationStatus};
use super::errors::VerifierError;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use shared_crypto::{verify_ed25519, verify_secp256k1};
use tracing::{debug, warn};

/// Blocking batch verification.
pub trait SyncVerifier: Send + Sync {
    /// Verify every non-terminal record. Records already terminal are left
    /// untouched, so repeated calls are no-ops.
    fn verify_sync(&self, records: &mut [TransactionSignature]) -> Result<(), VerifierError>;
}

/// Parallel verifier backed by rayon.
///
/// Uses the global pool unless built with a dedicated thread count.
pub struct BatchSyncVerifier {
    pool: Option<ThreadPool>,
}

impl BatchSyncVerifier {
    /// Verifier on the global rayon pool.
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Verifier on a dedicated pool of `threads`; `0` means the global pool.
    pub fn with_threads(threads: usize) -> Result<Self, VerifierError> {
        if threads == 0 {
            return Ok(Self::global());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("sig-verify-{i}"))
            .build()
            .map_err(|e| VerifierError::ThreadPool(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }
}

impl Default for BatchSyncVerifier {
    fn default() -> Self {
        Self::global()
    }
}

impl SyncVerifier for BatchSyncVerifier {
    fn verify_sync(&self, records: &mut [TransactionSignature]) -> Result<(), VerifierError> {
        match &self.pool {
            Some(pool) => pool.install(|| records.par_iter_mut().for_each(verify_record)),
            None => records.par_iter_mut().for_each(verify_record),
        }

        let unverified = records.iter().filter(|r| !r.status().is_terminal()).count();
        if unverified > 0 {
            warn!(unverified, total = records.len(), "Verification left records unknown");
            return Err(VerifierError::Incomplete { count: unverified });
        }

        debug!(
            total = records.len(),
            valid = records
                .iter()
                .filter(|r| r.status() == VerificationStatus::Valid)
                .count(),
            "Signature batch verified"
        );
        Ok(())
    }
}

fn verify_record(record: &mut TransactionSignature) {
    if record.status().is_terminal() {
        return;
    }
    let status = if signature_verifies(
        record.signature_type(),
        record.public_key(),
        record.message(),
        record.signature(),
    ) {
        VerificationStatus::Valid
    } else {
        VerificationStatus::Invalid
    };
    record.record_outcome(status);
}

/// Whether `signature` by `public_key` verifies over `message`.
pub(crate) fn signature_verifies(
    signature_type: SignatureType,
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> bool {
    match signature_type {
        SignatureType::Ed25519 => verify_ed25519(public_key, message, signature).is_ok(),
        SignatureType::EcdsaSecp256k1 => verify_secp256k1(public_key, message, signature).is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::{Ed25519KeyPair, Secp256k1KeyPair};

    fn ed25519_record(keypair: &Ed25519KeyPair, signed: &[u8], message: &[u8]) -> TransactionSignature {
        TransactionSignature::new(
            SignatureType::Ed25519,
            keypair.public_key().as_bytes(),
            keypair.sign(signed).as_bytes(),
            message,
        )
        .unwrap()
    }

    // =========================================================================
    // Outcomes
    // =========================================================================

    #[test]
    fn test_valid_and_invalid_signatures() {
        let keypair = Ed25519KeyPair::generate();
        let mut records = vec![
            ed25519_record(&keypair, b"body", b"body"),
            ed25519_record(&keypair, b"other", b"body"),
        ];

        BatchSyncVerifier::global().verify_sync(&mut records).unwrap();

        assert_eq!(records[0].status(), VerificationStatus::Valid);
        assert_eq!(records[1].status(), VerificationStatus::Invalid);
    }

    #[test]
    fn test_empty_signature_is_invalid() {
        let keypair = Ed25519KeyPair::generate();
        let mut records = vec![TransactionSignature::new(
            SignatureType::Ed25519,
            keypair.public_key().as_bytes(),
            &[],
            b"body",
        )
        .unwrap()];

        BatchSyncVerifier::global().verify_sync(&mut records).unwrap();

        assert_eq!(records[0].status(), VerificationStatus::Invalid);
    }

    #[test]
    fn test_secp256k1_record() {
        let keypair = Secp256k1KeyPair::generate();
        let mut records = vec![TransactionSignature::new(
            SignatureType::EcdsaSecp256k1,
            keypair.public_key().as_bytes(),
            keypair.sign(b"body").as_bytes(),
            b"body",
        )
        .unwrap()];

        BatchSyncVerifier::with_threads(2)
            .unwrap()
            .verify_sync(&mut records)
            .unwrap();

        assert_eq!(records[0].status(), VerificationStatus::Valid);
    }

    // =========================================================================
    // Idempotence
    // =========================================================================

    #[test]
    fn test_verify_twice_is_noop() {
        let keypair = Ed25519KeyPair::generate();
        let mut records = vec![
            ed25519_record(&keypair, b"body", b"body"),
            ed25519_record(&keypair, b"nope", b"body"),
        ];
        let verifier = BatchSyncVerifier::global();

        verifier.verify_sync(&mut records).unwrap();
        let first: Vec<_> = records.iter().map(|r| r.status()).collect();
        verifier.verify_sync(&mut records).unwrap();
        let second: Vec<_> = records.iter().map(|r| r.status()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_terminal_record_not_reverified() {
        let keypair = Ed25519KeyPair::generate();
        let mut records = vec![ed25519_record(&keypair, b"nope", b"body")];
        records[0].record_outcome(VerificationStatus::Valid);

        BatchSyncVerifier::global().verify_sync(&mut records).unwrap();

        assert_eq!(records[0].status(), VerificationStatus::Valid);
    }

    #[test]
    fn test_empty_batch() {
        let mut records: Vec<TransactionSignature> = Vec::new();
        assert!(BatchSyncVerifier::global().verify_sync(&mut records).is_ok());
    }
}
