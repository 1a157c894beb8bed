//! # Precheck Orchestrator
//!
//! Ingest-time check that a transaction carries the signatures needed for
//! it to be worth submitting to consensus.
//!
//! ## Flow
//!
//! 1. Resolve the payer's keys. Other parties' keys are resolved only for a
//!    query payment, since the node is then being paid directly.
//! 2. Build records from the all-parties signature view. Signatures a
//!    schedule accumulated are not consulted here.
//! 3. Verify, then require every resolved key to be active under the strict
//!    policy.
//!
//! An unresolvable payer yields `Ok(false)`; an unresolvable other party is
//! an error. Callers map the two differently.

use super::accessor::SignedTxnAccessor;
use super::activation::{is_active, status_map_from, ONLY_IF_SIG_IS_VALID};
use super::entities::{RequiredKey, VerificationStatus};
use super::errors::PrecheckError;
use super::platform_sigs::{create_ed25519_signatures, BodySigningSigFactory};
use super::sig_bytes::{unaccumulated_sig_bytes_provider_for, PubKeyToSigBytesProvider};
use super::sig_requirements::SigRequirements;
use super::signing_order::{CodeOrderResultFactory, KeyOrderingFailure, SigningOrderError};
use super::verifier::SyncVerifier;
use crate::ports::outbound::SigMetadataLookup;
use shared_types::{AccountId, EntityId, TransactionBody, TransactionData};
use std::sync::Arc;
use tracing::debug;

/// Whether a transaction pays `node_account` for a query.
pub fn query_payment_test_for(node_account: AccountId) -> impl Fn(&TransactionBody) -> bool {
    move |body| match &body.data {
        TransactionData::CryptoTransfer { transfers } => transfers
            .iter()
            .any(|t| t.account == node_account && t.amount > 0),
        _ => false,
    }
}

/// Ingest-time signature check.
pub struct PrecheckVerifier<L: ?Sized, V: ?Sized> {
    resolver: SigRequirements<L>,
    verifier: Arc<V>,
    node_account: AccountId,
}

impl<L, V> PrecheckVerifier<L, V>
where
    L: SigMetadataLookup + ?Sized,
    V: SyncVerifier + ?Sized,
{
    pub fn new(resolver: SigRequirements<L>, verifier: Arc<V>, node_account: AccountId) -> Self {
        Self {
            resolver,
            verifier,
            node_account,
        }
    }

    /// The ingest-time resolver.
    pub fn resolver(&self) -> &SigRequirements<L> {
        &self.resolver
    }

    /// Whether every required key of the transaction is active.
    pub fn has_necessary_signatures(
        &self,
        accessor: &SignedTxnAccessor,
    ) -> Result<bool, PrecheckError> {
        let body = accessor.body();
        let mut required = match self
            .resolver
            .keys_for_payer(body, &CodeOrderResultFactory)
            .into_result()
        {
            Ok(keys) => keys,
            Err(e) => {
                debug!(payer = %accessor.payer(), error = %e, "Payer keys unresolvable");
                return Ok(false);
            }
        };

        if query_payment_test_for(self.node_account)(body) {
            let others = self
                .resolver
                .keys_for_other_parties(body, &CodeOrderResultFactory)
                .into_result()
                .map_err(precheck_error_for)?;
            required.extend(others);
        }

        let provider = unaccumulated_sig_bytes_provider_for(accessor);
        let sig_bytes = provider.all_parties_sig_bytes_for();
        let factory = BodySigningSigFactory::new(accessor.signed_bytes());
        let mut records =
            create_ed25519_signatures(required.iter().map(|r| &r.key), &sig_bytes, &factory)
                .into_result()?;

        self.verifier.verify_sync(&mut records)?;

        let statuses = status_map_from(&records);
        let active = all_active(&required, |pk| statuses.get(pk).copied());
        debug!(
            payer = %accessor.payer(),
            function = ?accessor.function(),
            required = required.len(),
            records = records.len(),
            active,
            "Precheck signatures evaluated"
        );
        Ok(active)
    }
}

fn all_active<S>(required: &[RequiredKey], sig_status_fn: S) -> bool
where
    S: Fn(&[u8]) -> Option<VerificationStatus>,
{
    required
        .iter()
        .all(|r| is_active(&r.key, &sig_status_fn, &ONLY_IF_SIG_IS_VALID))
}

fn precheck_error_for(e: SigningOrderError) -> PrecheckError {
    match (e.reason, e.entity) {
        (KeyOrderingFailure::MissingAccount, Some(EntityId::Account(id))) => {
            PrecheckError::InvalidAccountId(id)
        }
        _ => PrecheckError::Resolution(e),
    }
}
