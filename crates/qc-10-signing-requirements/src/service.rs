//! # Signing Requirements Service
//!
//! Application service layer that implements the `SigningRequirementsApi`
//! trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`SigningRequirementsApi`)
//! - Uses the outbound ports (`SigMetadataLookup`, `ScheduleSigAccumulator`)
//!   for ledger state
//! - Wires one resolver per call site, sharing a single verifier

use crate::config::SigRequirementsConfig;
use crate::domain::accessor::SignedTxnAccessor;
use crate::domain::activation::{self, ActivationPolicy};
use crate::domain::entities::{RequiredKey, TransactionSignature};
use crate::domain::errors::{HandleSigsError, PrecheckError, VerifierError};
use crate::domain::handle::{HandleSigsVerdict, HandleSigsVerifier};
use crate::domain::platform_sigs::{self, BodySigningSigFactory, PlatformSigsCreationResult};
use crate::domain::precheck::PrecheckVerifier;
use crate::domain::sig_bytes::{sig_bytes_provider_for, PubKeyToSigBytes, PubKeyToSigBytesProvider};
use crate::domain::sig_requirements::SigRequirements;
use crate::domain::signing_order::{CodeOrderResultFactory, SigningOrderError, SigningOrderResult};
use crate::domain::verifier::{BatchSyncVerifier, SyncVerifier};
use crate::ports::inbound::SigningRequirementsApi;
use crate::ports::outbound::{ScheduleSigAccumulator, SigMetadataLookup};
use shared_types::{Key, TransactionBody};
use std::sync::Arc;
use tracing::info;

/// Signing Requirements Service.
///
/// The precheck and handle-time verifiers share the lookups and the
/// verifier but resolve with their own [`crate::config::ResolverConfig`].
pub struct SigRequirementsService<L: ?Sized, A: ?Sized, V: ?Sized = BatchSyncVerifier> {
    precheck: PrecheckVerifier<L, V>,
    handle: HandleSigsVerifier<L, A, V>,
    accumulator: Arc<A>,
    verifier: Arc<V>,
}

impl<L, A> SigRequirementsService<L, A, BatchSyncVerifier>
where
    L: SigMetadataLookup + ?Sized,
    A: ScheduleSigAccumulator + ?Sized,
{
    /// Create a service with the rayon batch verifier.
    ///
    /// Fails only if a dedicated verifier pool was requested and cannot be
    /// built.
    pub fn new(
        config: &SigRequirementsConfig,
        lookup: Arc<L>,
        accumulator: Arc<A>,
    ) -> Result<Self, VerifierError> {
        let verifier = Arc::new(BatchSyncVerifier::with_threads(config.verifier_threads)?);
        Ok(Self::with_verifier(config, lookup, accumulator, verifier))
    }
}

impl<L, A, V> SigRequirementsService<L, A, V>
where
    L: SigMetadataLookup + ?Sized,
    A: ScheduleSigAccumulator + ?Sized,
    V: SyncVerifier + ?Sized,
{
    /// Create a service with a caller-supplied verifier.
    pub fn with_verifier(
        config: &SigRequirementsConfig,
        lookup: Arc<L>,
        accumulator: Arc<A>,
        verifier: Arc<V>,
    ) -> Self {
        info!(
            node_account = %config.node_account,
            verifier_threads = config.verifier_threads,
            precheck_scheduled_signers = config.precheck.include_scheduled_signers,
            handle_scheduled_signers = config.handle.include_scheduled_signers,
            "Signing requirements service configured"
        );
        Self {
            precheck: PrecheckVerifier::new(
                SigRequirements::new(lookup.clone(), config.precheck),
                verifier.clone(),
                config.node_account,
            ),
            handle: HandleSigsVerifier::new(
                SigRequirements::new(lookup, config.handle),
                accumulator.clone(),
                verifier.clone(),
            ),
            accumulator,
            verifier,
        }
    }
}

impl<L, A, V> SigningRequirementsApi for SigRequirementsService<L, A, V>
where
    L: SigMetadataLookup + ?Sized,
    A: ScheduleSigAccumulator + ?Sized,
    V: SyncVerifier + ?Sized,
{
    fn is_active(
        &self,
        key: &Key,
        records: &[TransactionSignature],
        policy: &dyn ActivationPolicy,
    ) -> bool {
        let statuses = activation::status_map_from(records);
        activation::is_active(key, |pk| statuses.get(pk).copied(), policy)
    }

    fn keys_for_payer(&self, txn: &TransactionBody) -> SigningOrderResult<SigningOrderError> {
        self.precheck
            .resolver()
            .keys_for_payer(txn, &CodeOrderResultFactory)
    }

    fn keys_for_other_parties(
        &self,
        txn: &TransactionBody,
    ) -> SigningOrderResult<SigningOrderError> {
        self.precheck
            .resolver()
            .keys_for_other_parties(txn, &CodeOrderResultFactory)
    }

    fn sig_bytes_provider(
        &self,
        accessor: &SignedTxnAccessor,
    ) -> Box<dyn PubKeyToSigBytesProvider> {
        sig_bytes_provider_for(accessor, &*self.accumulator)
    }

    fn create_ed25519_signatures(
        &self,
        accessor: &SignedTxnAccessor,
        required_keys: &[RequiredKey],
        sig_bytes: &dyn PubKeyToSigBytes,
    ) -> PlatformSigsCreationResult {
        platform_sigs::create_ed25519_signatures(
            required_keys.iter().map(|r| &r.key),
            sig_bytes,
            &BodySigningSigFactory::new(accessor.signed_bytes()),
        )
    }

    fn verify_sync(&self, records: &mut [TransactionSignature]) -> Result<(), VerifierError> {
        self.verifier.verify_sync(records)
    }

    fn has_necessary_signatures(
        &self,
        accessor: &SignedTxnAccessor,
    ) -> Result<bool, PrecheckError> {
        self.precheck.has_necessary_signatures(accessor)
    }

    fn verify_for_handle(
        &self,
        accessor: &SignedTxnAccessor,
    ) -> Result<HandleSigsVerdict, HandleSigsError> {
        self.handle.verify_for_handle(accessor)
    }
}
