//! # Handle-Time Expansion
//!
//! Signature expansion for a consensus-ordered transaction. Runs the same
//! resolver, signature source, factory and verifier as precheck, but keeps
//! the payer and other-party verdicts apart and reports resolution failures
//! as data so the state transition can pick its own response.
//!
//! Keys flagged for a scheduled transaction are checked against the
//! scheduled operation's bytes, not the outer body. They never gate the
//! outer transaction; their valid signers are reported as
//! `scheduled_signatories`.

use super::accessor::SignedTxnAccessor;
use super::activation::{is_active, status_map_from, ONLY_IF_SIG_IS_VALID};
use super::entities::{RequiredKey, TransactionSignature, VerificationStatus};
use super::errors::{HandleSigsError, SigCreationError};
use super::platform_sigs::{create_ed25519_signatures, BodySigningSigFactory};
use super::sig_bytes::{sig_bytes_provider_for, PubKeyToSigBytes, VerifyingSigBytes};
use super::sig_requirements::SigRequirements;
use super::signing_order::{CodeOrderResultFactory, SigningOrderError};
use super::verifier::SyncVerifier;
use crate::ports::outbound::{ScheduleSigAccumulator, SigMetadataLookup};
use serde::{Deserialize, Serialize};
use shared_types::TransactionBody;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Outcome of handle-time signature expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleSigsVerdict {
    /// Every payer key is active. False when the payer was unresolvable.
    pub payer_active: bool,
    /// Every non-scheduled other-party key is active. False when other
    /// parties were unresolvable.
    pub other_parties_active: bool,
    /// Public keys of scheduled signers whose signature verified, in key
    /// order without duplicates.
    pub scheduled_signatories: Vec<Vec<u8>>,
    /// Why payer resolution failed, if it did.
    pub payer_error: Option<SigningOrderError>,
    /// Why other-party resolution failed, if it did.
    pub other_parties_error: Option<SigningOrderError>,
}

impl HandleSigsVerdict {
    /// Payer and other parties both resolved and active.
    pub fn is_authorized(&self) -> bool {
        self.payer_active && self.other_parties_active
    }
}

/// Consensus-time signature check.
pub struct HandleSigsVerifier<L: ?Sized, A: ?Sized, V: ?Sized> {
    resolver: SigRequirements<L>,
    accumulator: Arc<A>,
    verifier: Arc<V>,
}

impl<L, A, V> HandleSigsVerifier<L, A, V>
where
    L: SigMetadataLookup + ?Sized,
    A: ScheduleSigAccumulator + ?Sized,
    V: SyncVerifier + ?Sized,
{
    pub fn new(resolver: SigRequirements<L>, accumulator: Arc<A>, verifier: Arc<V>) -> Self {
        Self {
            resolver,
            accumulator,
            verifier,
        }
    }

    /// Resolve, source, verify and evaluate both roles of a transaction.
    pub fn verify_for_handle(
        &self,
        accessor: &SignedTxnAccessor,
    ) -> Result<HandleSigsVerdict, HandleSigsError> {
        let body = accessor.body();
        let payer = self
            .resolver
            .keys_for_payer(body, &CodeOrderResultFactory);
        let others = self
            .resolver
            .keys_for_other_parties(body, &CodeOrderResultFactory);

        let provider = sig_bytes_provider_for(accessor, &*self.accumulator);
        let factory = BodySigningSigFactory::new(accessor.signed_bytes());

        let mut payer_sigs = create_ed25519_signatures(
            payer.keys().iter().map(|r| &r.key),
            &provider.payer_sig_bytes_for(),
            &factory,
        )
        .into_result()?;

        let other_sig_bytes = provider.other_parties_sig_bytes_for();
        let (direct, scheduled): (Vec<&RequiredKey>, Vec<&RequiredKey>) =
            others.keys().iter().partition(|r| !r.for_scheduled_txn);
        let mut other_sigs = create_ed25519_signatures(
            direct.iter().map(|r| &r.key),
            &other_sig_bytes,
            &factory,
        )
        .into_result()?;
        let mut scheduled_sigs = self.scheduled_records(body, &scheduled, &other_sig_bytes)?;

        self.verifier.verify_sync(&mut payer_sigs)?;
        self.verifier.verify_sync(&mut other_sigs)?;
        self.verifier.verify_sync(&mut scheduled_sigs)?;

        let payer_statuses = status_map_from(&payer_sigs);
        let other_statuses = status_map_from(&other_sigs);
        let scheduled_statuses = status_map_from(&scheduled_sigs);

        let verdict = HandleSigsVerdict {
            payer_active: !payer.has_error_report()
                && all_active(payer.keys().iter(), &payer_statuses),
            other_parties_active: !others.has_error_report()
                && all_active(direct.iter().copied(), &other_statuses),
            scheduled_signatories: valid_signatories(&scheduled, &scheduled_statuses),
            payer_error: payer.error_report().cloned(),
            other_parties_error: others.error_report().cloned(),
        };
        debug!(
            payer = %accessor.payer(),
            function = ?accessor.function(),
            payer_active = verdict.payer_active,
            other_parties_active = verdict.other_parties_active,
            scheduled_signatories = verdict.scheduled_signatories.len(),
            "Handle-time signatures expanded"
        );
        Ok(verdict)
    }

    fn scheduled_records(
        &self,
        body: &TransactionBody,
        scheduled: &[&RequiredKey],
        sig_bytes: &dyn PubKeyToSigBytes,
    ) -> Result<Vec<TransactionSignature>, SigCreationError> {
        if scheduled.is_empty() {
            return Ok(Vec::new());
        }
        let scheduled_txn = self
            .resolver
            .scheduled_txn_of(body)
            .map_err(|e| SigCreationError::ScheduledTxn(e.to_string()))?
            .ok_or_else(|| SigCreationError::ScheduledTxn("nothing is scheduled".to_string()))?;
        let scheduled_bytes = scheduled_txn
            .to_bytes()
            .map_err(|e| SigCreationError::ScheduledTxn(e.to_string()))?;
        let sig_bytes = VerifyingSigBytes::new(sig_bytes, &scheduled_bytes);
        let factory = BodySigningSigFactory::new(&scheduled_bytes);
        create_ed25519_signatures(scheduled.iter().map(|r| &r.key), &sig_bytes, &factory)
            .into_result()
    }
}

fn all_active<'k, I>(required: I, statuses: &HashMap<Vec<u8>, VerificationStatus>) -> bool
where
    I: IntoIterator<Item = &'k RequiredKey>,
{
    required.into_iter().all(|r| {
        is_active(
            &r.key,
            |pk: &[u8]| statuses.get(pk).copied(),
            &ONLY_IF_SIG_IS_VALID,
        )
    })
}

fn valid_signatories(
    scheduled: &[&RequiredKey],
    statuses: &HashMap<Vec<u8>, VerificationStatus>,
) -> Vec<Vec<u8>> {
    let mut seen = HashSet::new();
    let mut signatories = Vec::new();
    for required in scheduled {
        for leaf in required.key.simple_keys() {
            let Some(public_key) = leaf.simple_bytes() else {
                continue;
            };
            if statuses.get(public_key) == Some(&VerificationStatus::Valid)
                && seen.insert(public_key.to_vec())
            {
                signatories.push(public_key.to_vec());
            }
        }
    }
    signatories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::in_memory::{InMemoryScheduleSigs, InMemorySigMetadataLookup};
    use crate::config::ResolverConfig;
    use crate::domain::signing_order::KeyOrderingFailure;
    use crate::domain::verifier::BatchSyncVerifier;
    use shared_crypto::Ed25519KeyPair;
    use shared_types::{
        AccountAmount, AccountId, Key, ScheduleId, SignatureMap, SignaturePair, SignatureValue,
        SignedTransaction, TransactionData, TransactionId,
    };

    const PAYER: AccountId = AccountId::new(1001);
    const SENDER: AccountId = AccountId::new(1002);
    const RECEIVER: AccountId = AccountId::new(1003);

    struct Fixture {
        payer: Ed25519KeyPair,
        sender: Ed25519KeyPair,
        ledger: Arc<InMemorySigMetadataLookup>,
        schedules: Arc<InMemoryScheduleSigs>,
    }

    impl Fixture {
        fn new() -> Self {
            let payer = Ed25519KeyPair::generate();
            let sender = Ed25519KeyPair::generate();
            let ledger = InMemorySigMetadataLookup::new();
            ledger.put_account(PAYER, key_of(&payer), false);
            ledger.put_account(SENDER, key_of(&sender), false);
            ledger.put_account(RECEIVER, Key::Ed25519(vec![7; 32]), false);
            Self {
                payer,
                sender,
                ledger: Arc::new(ledger),
                schedules: Arc::new(InMemoryScheduleSigs::new()),
            }
        }

        fn verifier(
            &self,
        ) -> HandleSigsVerifier<InMemorySigMetadataLookup, InMemoryScheduleSigs, BatchSyncVerifier>
        {
            HandleSigsVerifier::new(
                SigRequirements::new(self.ledger.clone(), ResolverConfig::default()),
                self.schedules.clone(),
                Arc::new(BatchSyncVerifier::global()),
            )
        }
    }

    fn key_of(keypair: &Ed25519KeyPair) -> Key {
        Key::Ed25519(keypair.public_key().as_bytes().to_vec())
    }

    fn pair(keypair: &Ed25519KeyPair, message: &[u8]) -> SignaturePair {
        SignaturePair {
            pub_key_prefix: keypair.public_key().as_bytes().to_vec(),
            signature: SignatureValue::Ed25519(keypair.sign(message).as_bytes().to_vec()),
        }
    }

    fn body(data: TransactionData) -> TransactionBody {
        TransactionBody {
            transaction_id: TransactionId::new(PAYER, 1),
            node_account: None,
            memo: String::new(),
            data,
        }
    }

    fn accessor(body: &TransactionBody, pairs: Vec<SignaturePair>) -> SignedTxnAccessor {
        SignedTxnAccessor::new(SignedTransaction::new(body, &SignatureMap { pairs }).unwrap())
            .unwrap()
    }

    fn inner_transfer() -> TransactionData {
        TransactionData::CryptoTransfer {
            transfers: vec![
                AccountAmount { account: SENDER, amount: -10 },
                AccountAmount { account: RECEIVER, amount: 10 },
            ],
        }
    }

    // =========================================================================
    // Direct transactions
    // =========================================================================

    #[test]
    fn test_transfer_signed_by_payer_and_sender() {
        let fx = Fixture::new();
        let body = body(inner_transfer());
        let bytes = body.to_bytes().unwrap();
        let accessor = accessor(&body, vec![pair(&fx.payer, &bytes), pair(&fx.sender, &bytes)]);

        let verdict = fx.verifier().verify_for_handle(&accessor).unwrap();

        assert!(verdict.is_authorized());
        assert!(verdict.scheduled_signatories.is_empty());
    }

    #[test]
    fn test_missing_sender_signature() {
        let fx = Fixture::new();
        let body = body(inner_transfer());
        let bytes = body.to_bytes().unwrap();
        let accessor = accessor(&body, vec![pair(&fx.payer, &bytes)]);

        let verdict = fx.verifier().verify_for_handle(&accessor).unwrap();

        assert!(verdict.payer_active);
        assert!(!verdict.other_parties_active);
        assert_eq!(verdict.other_parties_error, None);
    }

    #[test]
    fn test_resolution_failures_reported_in_verdict() {
        let fx = Fixture::new();
        let body = TransactionBody {
            transaction_id: TransactionId::new(AccountId::new(5555), 1),
            ..body(TransactionData::FileDelete {
                file: shared_types::FileId::new(9),
            })
        };
        let accessor = accessor(&body, vec![]);

        let verdict = fx.verifier().verify_for_handle(&accessor).unwrap();

        assert!(!verdict.payer_active);
        assert!(!verdict.other_parties_active);
        assert_eq!(
            verdict.payer_error.map(|e| e.reason),
            Some(KeyOrderingFailure::InvalidPayerAccount)
        );
        assert_eq!(
            verdict.other_parties_error.map(|e| e.reason),
            Some(KeyOrderingFailure::MissingFile)
        );
    }

    // =========================================================================
    // Scheduled transactions
    // =========================================================================

    #[test]
    fn test_schedule_create_reports_scheduled_signatories() {
        let fx = Fixture::new();
        let inner = inner_transfer();
        let inner_bytes = inner.to_bytes().unwrap();
        let body = body(TransactionData::ScheduleCreate {
            scheduled: Box::new(inner),
            admin_key: None,
            payer: None,
            memo: String::new(),
        });
        let outer_bytes = body.to_bytes().unwrap();
        let accessor = accessor(
            &body,
            vec![pair(&fx.payer, &outer_bytes), pair(&fx.sender, &inner_bytes)],
        );

        let verdict = fx.verifier().verify_for_handle(&accessor).unwrap();

        assert!(verdict.is_authorized());
        assert_eq!(
            verdict.scheduled_signatories,
            vec![fx.sender.public_key().as_bytes().to_vec()]
        );
    }

    #[test]
    fn test_schedule_sign_uses_accumulated_signatures() {
        let fx = Fixture::new();
        let schedule = ScheduleId::new(800);
        let inner = inner_transfer();
        let inner_bytes = inner.to_bytes().unwrap();
        fx.ledger.put_schedule(
            schedule,
            crate::ports::outbound::ScheduleSigningMetadata {
                admin_key: None,
                designated_payer: PAYER,
                scheduled_txn: inner,
            },
        );
        fx.schedules.add_signature(
            schedule,
            fx.sender.public_key().as_bytes().to_vec(),
            fx.sender.sign(&inner_bytes).as_bytes().to_vec(),
        );
        let body = body(TransactionData::ScheduleSign { schedule });
        let outer_bytes = body.to_bytes().unwrap();
        let accessor = accessor(&body, vec![pair(&fx.payer, &outer_bytes)]);

        let verdict = fx.verifier().verify_for_handle(&accessor).unwrap();

        assert!(verdict.payer_active);
        let signatories = verdict.scheduled_signatories;
        assert!(signatories.contains(&fx.sender.public_key().as_bytes().to_vec()));
    }

    fn creator_paid_transfer() -> TransactionData {
        TransactionData::CryptoTransfer {
            transfers: vec![
                AccountAmount { account: PAYER, amount: -10 },
                AccountAmount { account: RECEIVER, amount: 10 },
            ],
        }
    }

    #[test]
    fn test_creator_signs_outer_and_scheduled_in_either_order() {
        let fx = Fixture::new();
        let inner = creator_paid_transfer();
        let inner_bytes = inner.to_bytes().unwrap();
        let body = body(TransactionData::ScheduleCreate {
            scheduled: Box::new(inner),
            admin_key: None,
            payer: None,
            memo: String::new(),
        });
        let outer_bytes = body.to_bytes().unwrap();
        let outer = pair(&fx.payer, &outer_bytes);
        let scheduled = pair(&fx.payer, &inner_bytes);

        for pairs in [
            vec![outer.clone(), scheduled.clone()],
            vec![scheduled.clone(), outer.clone()],
        ] {
            let verdict = fx
                .verifier()
                .verify_for_handle(&accessor(&body, pairs))
                .unwrap();

            assert!(verdict.is_authorized());
            assert_eq!(
                verdict.scheduled_signatories,
                vec![fx.payer.public_key().as_bytes().to_vec()]
            );
        }
    }

    #[test]
    fn test_accumulated_signature_not_hidden_by_catch_all_pair() {
        let fx = Fixture::new();
        let schedule = ScheduleId::new(801);
        let inner = inner_transfer();
        let inner_bytes = inner.to_bytes().unwrap();
        fx.ledger.put_schedule(
            schedule,
            crate::ports::outbound::ScheduleSigningMetadata {
                admin_key: None,
                designated_payer: PAYER,
                scheduled_txn: inner,
            },
        );
        fx.schedules.add_signature(
            schedule,
            fx.sender.public_key().as_bytes().to_vec(),
            fx.sender.sign(&inner_bytes).as_bytes().to_vec(),
        );
        let body = body(TransactionData::ScheduleSign { schedule });
        let outer_bytes = body.to_bytes().unwrap();
        let catch_all = SignaturePair {
            pub_key_prefix: Vec::new(),
            signature: SignatureValue::Ed25519(fx.payer.sign(&outer_bytes).as_bytes().to_vec()),
        };

        let verdict = fx
            .verifier()
            .verify_for_handle(&accessor(&body, vec![catch_all]))
            .unwrap();

        assert!(verdict.payer_active);
        assert!(verdict
            .scheduled_signatories
            .contains(&fx.sender.public_key().as_bytes().to_vec()));
    }

    #[test]
    fn test_unavailable_scheduled_operation_is_an_error() {
        let fx = Fixture::new();
        let oversized = ScheduleId::new(802);
        fx.ledger.put_schedule(
            oversized,
            crate::ports::outbound::ScheduleSigningMetadata {
                admin_key: None,
                designated_payer: PAYER,
                scheduled_txn: TransactionData::ContractCall {
                    contract: shared_types::ContractId::new(5),
                    gas: 1,
                    function_parameters: vec![0; 7_000],
                },
            },
        );
        let verifier = fx.verifier();
        let required = RequiredKey::scheduled(key_of(&fx.sender));
        let sig_map = crate::domain::sig_bytes::SigMapPubKeyToSigBytes::new(SignatureMap::default());

        for schedule in [oversized, ScheduleId::new(803)] {
            let result = verifier.scheduled_records(
                &body(TransactionData::ScheduleSign { schedule }),
                &[&required],
                &sig_map,
            );
            assert!(matches!(result, Err(SigCreationError::ScheduledTxn(_))));
        }
    }

    #[test]
    fn test_unencodable_scheduled_operation_reported_in_verdict() {
        let fx = Fixture::new();
        let schedule = ScheduleId::new(804);
        fx.ledger.put_schedule(
            schedule,
            crate::ports::outbound::ScheduleSigningMetadata {
                admin_key: None,
                designated_payer: PAYER,
                scheduled_txn: TransactionData::ContractCall {
                    contract: shared_types::ContractId::new(5),
                    gas: 1,
                    function_parameters: vec![0; 7_000],
                },
            },
        );
        let body = body(TransactionData::ScheduleSign { schedule });
        let outer_bytes = body.to_bytes().unwrap();

        let verdict = fx
            .verifier()
            .verify_for_handle(&accessor(&body, vec![pair(&fx.payer, &outer_bytes)]))
            .unwrap();

        assert!(verdict.payer_active);
        assert!(!verdict.other_parties_active);
        assert_eq!(
            verdict.other_parties_error.map(|e| e.reason),
            Some(KeyOrderingFailure::GeneralError)
        );
    }
}
