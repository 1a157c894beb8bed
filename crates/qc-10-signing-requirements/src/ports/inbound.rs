//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::accessor::SignedTxnAccessor;
use crate::domain::activation::ActivationPolicy;
use crate::domain::entities::{RequiredKey, TransactionSignature};
use crate::domain::errors::{HandleSigsError, PrecheckError, VerifierError};
use crate::domain::handle::HandleSigsVerdict;
use crate::domain::platform_sigs::PlatformSigsCreationResult;
use crate::domain::sig_bytes::{PubKeyToSigBytes, PubKeyToSigBytesProvider};
use crate::domain::signing_order::{SigningOrderError, SigningOrderResult};
use shared_types::{Key, TransactionBody};

/// Primary Signing Requirements API.
///
/// Implementations must be thread-safe (`Send + Sync`). Every call is
/// scoped to the transaction it is given; nothing is retained between
/// calls.
pub trait SigningRequirementsApi: Send + Sync {
    // =========================================================================
    // Activation
    // =========================================================================

    /// Whether `key` is active given verified records, under `policy`.
    fn is_active(
        &self,
        key: &Key,
        records: &[TransactionSignature],
        policy: &dyn ActivationPolicy,
    ) -> bool;

    // =========================================================================
    // Signing orders
    // =========================================================================

    /// Keys of the payer, resolved for precheck.
    fn keys_for_payer(&self, txn: &TransactionBody) -> SigningOrderResult<SigningOrderError>;

    /// Keys of the other parties, resolved for precheck.
    fn keys_for_other_parties(
        &self,
        txn: &TransactionBody,
    ) -> SigningOrderResult<SigningOrderError>;

    // =========================================================================
    // Signature records
    // =========================================================================

    /// Signature-bytes views for a transaction.
    fn sig_bytes_provider(&self, accessor: &SignedTxnAccessor)
        -> Box<dyn PubKeyToSigBytesProvider>;

    /// Records for every simple leaf of `required_keys`, over the
    /// transaction's signed bytes.
    fn create_ed25519_signatures(
        &self,
        accessor: &SignedTxnAccessor,
        required_keys: &[RequiredKey],
        sig_bytes: &dyn PubKeyToSigBytes,
    ) -> PlatformSigsCreationResult;

    /// Verify records in place, blocking until all are terminal.
    fn verify_sync(&self, records: &mut [TransactionSignature]) -> Result<(), VerifierError>;

    // =========================================================================
    // Orchestration
    // =========================================================================

    /// Ingest-time verdict.
    fn has_necessary_signatures(&self, accessor: &SignedTxnAccessor)
        -> Result<bool, PrecheckError>;

    /// Consensus-time verdict.
    fn verify_for_handle(
        &self,
        accessor: &SignedTxnAccessor,
    ) -> Result<HandleSigsVerdict, HandleSigsError>;
}
