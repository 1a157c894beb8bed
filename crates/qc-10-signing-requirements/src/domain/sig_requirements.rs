//! # Signing-Order Resolver
//!
//! Maps a transaction body to the ordered keys that must sign it, split into
//! the payer role and the other-parties role.
//!
//! ## Ordering
//!
//! Keys are returned in first-seen order. Structurally equal keys referenced
//! by different entities are kept, so each requirement stays traceable to
//! the entity that imposed it.
//!
//! ## Failures
//!
//! Resolution is all-or-nothing: the first failed lookup aborts the role
//! with an error report naming the entity.

use super::entities::RequiredKey;
use super::signing_order::{KeyOrderingFailure, SigningOrderResult, SigningOrderResultFactory};
use crate::config::ResolverConfig;
use crate::ports::outbound::{
    AccountSigningMetadata, ContractSigningMetadata, LookupFailure, ScheduleSigningMetadata,
    SigMetadataLookup, TopicSigningMetadata,
};
use shared_types::{
    AccountAmount, AccountId, ContractId, EntityId, FileId, Key, ScheduleId, TopicId,
    TransactionBody, TransactionData,
};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Resolves required keys through the entity metadata lookups.
pub struct SigRequirements<L: ?Sized> {
    lookup: Arc<L>,
    config: ResolverConfig,
}

impl<L: SigMetadataLookup + ?Sized> SigRequirements<L> {
    /// Create a resolver over shared lookups.
    pub fn new(lookup: Arc<L>, config: ResolverConfig) -> Self {
        Self { lookup, config }
    }

    /// The resolver's configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The scheduled operation whose signers `txn` contributes to, if any.
    pub fn scheduled_txn_of(
        &self,
        txn: &TransactionBody,
    ) -> Result<Option<TransactionData>, LookupFailure> {
        match &txn.data {
            TransactionData::ScheduleCreate { scheduled, .. } => Ok(Some((**scheduled).clone())),
            TransactionData::ScheduleSign { schedule } => self
                .lookup
                .schedule_signing_meta_for(schedule)
                .map(|meta| Some(meta.scheduled_txn)),
            _ => Ok(None),
        }
    }

    /// Keys of the designated payer.
    pub fn keys_for_payer<E, F>(&self, txn: &TransactionBody, factory: &F) -> SigningOrderResult<E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        let mut order = Order::new(factory, false);
        let payer = txn.payer();
        let result = match self.lookup.account_signing_meta_for(&payer) {
            Ok(meta) => {
                order.add(meta.key);
                Ok(order.keys)
            }
            Err(_) => Err(order.fail(KeyOrderingFailure::InvalidPayerAccount, payer.into())),
        };
        result.into()
    }

    /// Keys of every other party the operation references.
    pub fn keys_for_other_parties<E, F>(
        &self,
        txn: &TransactionBody,
        factory: &F,
    ) -> SigningOrderResult<E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        let mut order = Order::new(factory, false);
        self.add_other_parties(&txn.data, txn.payer(), &mut order)
            .map(|()| order.keys)
            .into()
    }

    fn add_other_parties<E, F>(
        &self,
        data: &TransactionData,
        payer: AccountId,
        order: &mut Order<'_, E, F>,
    ) -> Result<(), E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        match data {
            TransactionData::CryptoCreate {
                key,
                receiver_sig_required,
                ..
            } => {
                if *receiver_sig_required {
                    order.add(key.clone());
                }
                Ok(())
            }
            TransactionData::CryptoTransfer { transfers } => self.add_transfers(transfers, order),
            TransactionData::CryptoUpdate { account, key, .. } => {
                let target = self.account(account, order)?;
                order.add(target.key);
                if let Some(new_key) = key {
                    order.add(new_key.clone());
                }
                Ok(())
            }
            TransactionData::CryptoDelete {
                account,
                transfer_account,
            } => {
                let target = self.account(account, order)?;
                order.add(target.key);
                self.add_if_receiver_sig_required(transfer_account, order)
            }
            TransactionData::FileCreate { keys, .. } => {
                order.add_unless_empty(keys.clone());
                Ok(())
            }
            TransactionData::FileAppend { file, .. } | TransactionData::FileDelete { file } => {
                let wacl = self.file_wacl(file, order)?;
                order.add_unless_empty(wacl);
                Ok(())
            }
            TransactionData::FileUpdate { file, keys, .. } => {
                let wacl = self.file_wacl(file, order)?;
                order.add_unless_empty(wacl);
                if let Some(new_wacl) = keys {
                    order.add_unless_empty(new_wacl.clone());
                }
                Ok(())
            }
            TransactionData::ContractCreate {
                admin_key,
                auto_renew_account,
                ..
            } => {
                order.add_admin_key(admin_key.as_ref());
                self.add_auto_renew(auto_renew_account.as_ref(), order)
            }
            TransactionData::ContractCall { .. } => Ok(()),
            TransactionData::ContractUpdate {
                contract,
                admin_key,
                auto_renew_account,
            } => {
                let current = self.contract(contract, order)?;
                order.add(current.admin_key);
                order.add_admin_key(admin_key.as_ref());
                self.add_auto_renew(auto_renew_account.as_ref(), order)
            }
            TransactionData::ContractDelete {
                contract,
                transfer_account,
            } => {
                let current = self.contract(contract, order)?;
                order.add(current.admin_key);
                match transfer_account {
                    Some(beneficiary) => self.add_if_receiver_sig_required(beneficiary, order),
                    None => Ok(()),
                }
            }
            TransactionData::ConsensusCreateTopic {
                admin_key,
                auto_renew_account,
                ..
            } => {
                if let Some(admin_key) = admin_key {
                    order.add(admin_key.clone());
                }
                self.add_auto_renew(auto_renew_account.as_ref(), order)
            }
            TransactionData::ConsensusUpdateTopic {
                topic,
                admin_key,
                auto_renew_account,
                ..
            } => {
                let current = self.topic(topic, order)?;
                if let Some(current_admin) = current.admin_key {
                    order.add(current_admin);
                }
                if let Some(new_admin) = admin_key {
                    order.add(new_admin.clone());
                }
                self.add_auto_renew(auto_renew_account.as_ref(), order)
            }
            TransactionData::ConsensusDeleteTopic { topic } => {
                let current = self.topic(topic, order)?;
                if let Some(admin_key) = current.admin_key {
                    order.add(admin_key);
                }
                Ok(())
            }
            TransactionData::ConsensusSubmitMessage { topic, .. } => {
                let current = self.topic(topic, order)?;
                if let Some(submit_key) = current.submit_key {
                    order.add(submit_key);
                }
                Ok(())
            }
            TransactionData::ScheduleCreate {
                scheduled,
                admin_key,
                payer: scheduled_payer,
                ..
            } => {
                if let Some(admin_key) = admin_key {
                    order.add(admin_key.clone());
                }
                let inner_payer = scheduled_payer.unwrap_or(payer);
                self.add_scheduled_signers(scheduled, inner_payer, None, order)
            }
            TransactionData::ScheduleSign { schedule } => {
                let meta = self.schedule(schedule, order)?;
                self.add_scheduled_signers(
                    &meta.scheduled_txn,
                    meta.designated_payer,
                    Some(*schedule),
                    order,
                )
            }
            TransactionData::ScheduleDelete { schedule } => {
                let meta = self.schedule(schedule, order)?;
                match meta.admin_key {
                    Some(admin_key) => {
                        order.add(admin_key);
                        Ok(())
                    }
                    None => Err(order.fail(KeyOrderingFailure::ImmutableSchedule, (*schedule).into())),
                }
            }
            TransactionData::Freeze { .. } => Ok(()),
        }
    }

    fn add_scheduled_signers<E, F>(
        &self,
        scheduled: &TransactionData,
        inner_payer: AccountId,
        schedule: Option<ScheduleId>,
        order: &mut Order<'_, E, F>,
    ) -> Result<(), E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        if !scheduled.function().is_schedulable() {
            return Err(order.fail_without_entity(KeyOrderingFailure::UnschedulableTransaction));
        }
        if !self.config.include_scheduled_signers {
            return Ok(());
        }
        // Its signers sign its encoding; with none, nothing could satisfy them.
        if let Err(e) = scheduled.to_bytes() {
            debug!(error = %e, "Scheduled operation does not encode");
            return Err(match schedule {
                Some(id) => order.fail(KeyOrderingFailure::GeneralError, id.into()),
                None => order.fail_without_entity(KeyOrderingFailure::GeneralError),
            });
        }
        let outer_scheduled = std::mem::replace(&mut order.scheduled, true);
        let payer_meta = self.account(&inner_payer, order);
        let result = payer_meta.and_then(|meta| {
            order.add(meta.key);
            self.add_other_parties(scheduled, inner_payer, order)
        });
        order.scheduled = outer_scheduled;
        result
    }

    fn add_transfers<E, F>(
        &self,
        transfers: &[AccountAmount],
        order: &mut Order<'_, E, F>,
    ) -> Result<(), E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        for adjustment in transfers {
            let meta = self.account(&adjustment.account, order)?;
            if adjustment.amount < 0 || (adjustment.amount > 0 && meta.receiver_sig_required) {
                order.add(meta.key);
            }
        }
        Ok(())
    }

    fn add_if_receiver_sig_required<E, F>(
        &self,
        id: &AccountId,
        order: &mut Order<'_, E, F>,
    ) -> Result<(), E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        let meta = self.account(id, order)?;
        if meta.receiver_sig_required {
            order.add(meta.key);
        }
        Ok(())
    }

    fn add_auto_renew<E, F>(
        &self,
        id: Option<&AccountId>,
        order: &mut Order<'_, E, F>,
    ) -> Result<(), E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        if let Some(id) = id {
            let meta = self.account(id, order)?;
            order.add(meta.key);
        }
        Ok(())
    }

    // =========================================================================
    // Lookups with failure mapping
    // =========================================================================

    fn account<E, F>(
        &self,
        id: &AccountId,
        order: &Order<'_, E, F>,
    ) -> Result<AccountSigningMetadata, E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        self.lookup.account_signing_meta_for(id).map_err(|failure| {
            let reason = match failure {
                LookupFailure::NotFound => KeyOrderingFailure::MissingAccount,
                LookupFailure::Deleted | LookupFailure::Unusable => {
                    KeyOrderingFailure::InvalidAccount
                }
            };
            order.fail(reason, (*id).into())
        })
    }

    fn file_wacl<E, F>(&self, id: &FileId, order: &Order<'_, E, F>) -> Result<Key, E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        self.lookup
            .file_signing_meta_for(id)
            .map(|meta| meta.wacl)
            .map_err(|_| order.fail(KeyOrderingFailure::MissingFile, (*id).into()))
    }

    fn contract<E, F>(
        &self,
        id: &ContractId,
        order: &Order<'_, E, F>,
    ) -> Result<ContractSigningMetadata, E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        self.lookup.contract_signing_meta_for(id).map_err(|failure| {
            let reason = match failure {
                LookupFailure::Unusable => KeyOrderingFailure::ImmutableContract,
                LookupFailure::NotFound | LookupFailure::Deleted => {
                    KeyOrderingFailure::InvalidContract
                }
            };
            order.fail(reason, (*id).into())
        })
    }

    fn topic<E, F>(
        &self,
        id: &TopicId,
        order: &Order<'_, E, F>,
    ) -> Result<TopicSigningMetadata, E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        self.lookup
            .topic_signing_meta_for(id)
            .map_err(|_| order.fail(KeyOrderingFailure::InvalidTopic, (*id).into()))
    }

    fn schedule<E, F>(
        &self,
        id: &ScheduleId,
        order: &Order<'_, E, F>,
    ) -> Result<ScheduleSigningMetadata, E>
    where
        F: SigningOrderResultFactory<E> + ?Sized,
    {
        self.lookup
            .schedule_signing_meta_for(id)
            .map_err(|_| order.fail(KeyOrderingFailure::InvalidSchedule, (*id).into()))
    }
}

/// Keys collected so far for one role.
struct Order<'f, E, F: ?Sized> {
    factory: &'f F,
    scheduled: bool,
    keys: Vec<RequiredKey>,
    _report: PhantomData<fn() -> E>,
}

impl<'f, E, F> Order<'f, E, F>
where
    F: SigningOrderResultFactory<E> + ?Sized,
{
    fn new(factory: &'f F, scheduled: bool) -> Self {
        Self {
            factory,
            scheduled,
            keys: Vec::new(),
            _report: PhantomData,
        }
    }

    fn add(&mut self, key: Key) {
        self.keys.push(if self.scheduled {
            RequiredKey::scheduled(key)
        } else {
            RequiredKey::direct(key)
        });
    }

    fn add_unless_empty(&mut self, key: Key) {
        if !key.is_empty() {
            self.add(key);
        }
    }

    /// New admin keys delegated to a contract impose no signature.
    fn add_admin_key(&mut self, key: Option<&Key>) {
        if let Some(key) = key {
            if !matches!(key, Key::ContractId(_)) && !key.is_empty() {
                self.add(key.clone());
            }
        }
    }

    fn fail(&self, reason: KeyOrderingFailure, entity: EntityId) -> E {
        debug!(%entity, %reason, scheduled = self.scheduled, "Signing order unresolvable");
        self.factory.for_failure(reason, Some(entity))
    }

    fn fail_without_entity(&self, reason: KeyOrderingFailure) -> E {
        debug!(%reason, scheduled = self.scheduled, "Signing order unresolvable");
        self.factory.for_failure(reason, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::in_memory::InMemorySigMetadataLookup;
    use crate::domain::signing_order::{CodeOrderResultFactory, SigningOrderError};
    use shared_types::TransactionId;

    const PAYER: AccountId = AccountId::new(2);
    const SENDER: AccountId = AccountId::new(1001);
    const RECEIVER: AccountId = AccountId::new(1002);
    const PICKY_RECEIVER: AccountId = AccountId::new(1003);
    const MISSING: AccountId = AccountId::new(9999);

    fn ed(seed: u8) -> Key {
        Key::Ed25519(vec![seed; 32])
    }

    fn ledger() -> InMemorySigMetadataLookup {
        let ledger = InMemorySigMetadataLookup::new();
        ledger.put_account(PAYER, ed(2), false);
        ledger.put_account(SENDER, ed(11), false);
        ledger.put_account(RECEIVER, ed(12), false);
        ledger.put_account(PICKY_RECEIVER, ed(13), true);
        ledger
    }

    fn resolver(ledger: InMemorySigMetadataLookup) -> SigRequirements<InMemorySigMetadataLookup> {
        SigRequirements::new(Arc::new(ledger), ResolverConfig::default())
    }

    fn body(data: TransactionData) -> TransactionBody {
        TransactionBody {
            transaction_id: TransactionId::new(PAYER, 1),
            node_account: None,
            memo: String::new(),
            data,
        }
    }

    fn other_keys(
        resolver: &SigRequirements<InMemorySigMetadataLookup>,
        data: TransactionData,
    ) -> Result<Vec<RequiredKey>, SigningOrderError> {
        resolver
            .keys_for_other_parties(&body(data), &CodeOrderResultFactory)
            .into_result()
    }

    fn keys_of(required: &[RequiredKey]) -> Vec<Key> {
        required.iter().map(|r| r.key.clone()).collect()
    }

    fn transfer(account: AccountId, amount: i64) -> AccountAmount {
        AccountAmount { account, amount }
    }

    // =========================================================================
    // Payer
    // =========================================================================

    #[test]
    fn test_payer_key_resolved() {
        let resolver = resolver(ledger());
        let result: SigningOrderResult<SigningOrderError> = resolver
            .keys_for_payer(&body(TransactionData::Freeze { start_secs: 0 }), &CodeOrderResultFactory);

        assert_eq!(keys_of(result.keys()), vec![ed(2)]);
        assert!(!result.keys()[0].for_scheduled_txn);
    }

    #[test]
    fn test_missing_payer_is_invalid_payer() {
        let resolver = resolver(InMemorySigMetadataLookup::new());
        let result: SigningOrderResult<SigningOrderError> = resolver
            .keys_for_payer(&body(TransactionData::Freeze { start_secs: 0 }), &CodeOrderResultFactory);

        assert_eq!(
            result.error_report(),
            Some(&SigningOrderError {
                reason: KeyOrderingFailure::InvalidPayerAccount,
                entity: Some(PAYER.into()),
            })
        );
    }

    // =========================================================================
    // Crypto
    // =========================================================================

    #[test]
    fn test_transfer_requires_senders_and_picky_receivers() {
        let resolver = resolver(ledger());
        let keys = other_keys(
            &resolver,
            TransactionData::CryptoTransfer {
                transfers: vec![
                    transfer(SENDER, -30),
                    transfer(RECEIVER, 10),
                    transfer(PICKY_RECEIVER, 20),
                ],
            },
        )
        .unwrap();

        assert_eq!(keys_of(&keys), vec![ed(11), ed(13)]);
    }

    #[test]
    fn test_transfer_to_missing_account_fails_with_id() {
        let resolver = resolver(ledger());
        let err = other_keys(
            &resolver,
            TransactionData::CryptoTransfer {
                transfers: vec![transfer(SENDER, -1), transfer(MISSING, 1)],
            },
        )
        .unwrap_err();

        assert_eq!(err.reason, KeyOrderingFailure::MissingAccount);
        assert_eq!(err.entity, Some(MISSING.into()));
    }

    #[test]
    fn test_deleted_account_is_invalid() {
        let ledger = ledger();
        ledger.mark_account_deleted(SENDER);
        let err = other_keys(
            &resolver(ledger),
            TransactionData::CryptoDelete {
                account: SENDER,
                transfer_account: RECEIVER,
            },
        )
        .unwrap_err();

        assert_eq!(err.reason, KeyOrderingFailure::InvalidAccount);
    }

    #[test]
    fn test_duplicate_keys_are_kept() {
        let ledger = ledger();
        ledger.put_account(AccountId::new(1004), ed(11), false);
        let keys = other_keys(
            &resolver(ledger),
            TransactionData::CryptoTransfer {
                transfers: vec![transfer(SENDER, -1), transfer(AccountId::new(1004), -1)],
            },
        )
        .unwrap();

        assert_eq!(keys_of(&keys), vec![ed(11), ed(11)]);
    }

    #[test]
    fn test_crypto_update_requires_target_and_new_key() {
        let keys = other_keys(
            &resolver(ledger()),
            TransactionData::CryptoUpdate {
                account: SENDER,
                key: Some(ed(50)),
                receiver_sig_required: None,
            },
        )
        .unwrap();

        assert_eq!(keys_of(&keys), vec![ed(11), ed(50)]);
    }

    #[test]
    fn test_crypto_create_key_only_when_receiver_sig_required() {
        let resolver = resolver(ledger());
        let create = |receiver_sig_required| TransactionData::CryptoCreate {
            key: ed(60),
            receiver_sig_required,
            initial_balance: 0,
        };

        assert!(other_keys(&resolver, create(false)).unwrap().is_empty());
        assert_eq!(keys_of(&other_keys(&resolver, create(true)).unwrap()), vec![ed(60)]);
    }

    // =========================================================================
    // Files and contracts
    // =========================================================================

    #[test]
    fn test_file_update_requires_current_and_new_wacl() {
        let ledger = ledger();
        let file = FileId::new(150);
        ledger.put_file(file, Key::KeyList(vec![ed(20)]));
        let keys = other_keys(
            &resolver(ledger),
            TransactionData::FileUpdate {
                file,
                keys: Some(Key::KeyList(vec![ed(21)])),
                contents: None,
            },
        )
        .unwrap();

        assert_eq!(
            keys_of(&keys),
            vec![Key::KeyList(vec![ed(20)]), Key::KeyList(vec![ed(21)])]
        );
    }

    #[test]
    fn test_immutable_file_adds_nothing() {
        let ledger = ledger();
        let file = FileId::new(151);
        ledger.put_file(file, Key::KeyList(vec![]));
        let keys = other_keys(
            &resolver(ledger),
            TransactionData::FileAppend {
                file,
                contents: vec![1],
            },
        )
        .unwrap();

        assert!(keys.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = other_keys(
            &resolver(ledger()),
            TransactionData::FileDelete {
                file: FileId::new(404),
            },
        )
        .unwrap_err();

        assert_eq!(err.reason, KeyOrderingFailure::MissingFile);
        assert_eq!(err.entity, Some(FileId::new(404).into()));
    }

    #[test]
    fn test_immutable_contract_update_fails() {
        let ledger = ledger();
        let contract = ContractId::new(300);
        ledger.put_contract(contract, None, false);
        let err = other_keys(
            &resolver(ledger),
            TransactionData::ContractUpdate {
                contract,
                admin_key: None,
                auto_renew_account: None,
            },
        )
        .unwrap_err();

        assert_eq!(err.reason, KeyOrderingFailure::ImmutableContract);
        assert_eq!(err.entity, Some(contract.into()));
    }

    #[test]
    fn test_contract_create_skips_contract_admin_key() {
        let keys = other_keys(
            &resolver(ledger()),
            TransactionData::ContractCreate {
                admin_key: Some(Key::ContractId(ContractId::new(1))),
                auto_renew_account: Some(SENDER),
                gas: 10,
            },
        )
        .unwrap();

        assert_eq!(keys_of(&keys), vec![ed(11)]);
    }

    // =========================================================================
    // Topics
    // =========================================================================

    #[test]
    fn test_submit_message_requires_submit_key() {
        let ledger = ledger();
        let topic = TopicId::new(500);
        ledger.put_topic(
            topic,
            TopicSigningMetadata {
                admin_key: Some(ed(30)),
                submit_key: Some(ed(31)),
            },
        );
        let keys = other_keys(
            &resolver(ledger),
            TransactionData::ConsensusSubmitMessage {
                topic,
                message: b"hello".to_vec(),
            },
        )
        .unwrap();

        assert_eq!(keys_of(&keys), vec![ed(31)]);
    }

    #[test]
    fn test_deleted_topic_fails() {
        let ledger = ledger();
        let topic = TopicId::new(501);
        ledger.put_topic(
            topic,
            TopicSigningMetadata {
                admin_key: None,
                submit_key: None,
            },
        );
        ledger.mark_topic_deleted(topic);
        let err = other_keys(
            &resolver(ledger),
            TransactionData::ConsensusSubmitMessage {
                topic,
                message: vec![],
            },
        )
        .unwrap_err();

        assert_eq!(err.reason, KeyOrderingFailure::InvalidTopic);
        assert_eq!(err.entity, Some(topic.into()));
    }

    // =========================================================================
    // Schedules
    // =========================================================================

    fn scheduled_transfer() -> TransactionData {
        TransactionData::CryptoTransfer {
            transfers: vec![transfer(SENDER, -5), transfer(RECEIVER, 5)],
        }
    }

    #[test]
    fn test_schedule_create_flags_inner_signers() {
        let keys = other_keys(
            &resolver(ledger()),
            TransactionData::ScheduleCreate {
                scheduled: Box::new(scheduled_transfer()),
                admin_key: Some(ed(40)),
                payer: Some(RECEIVER),
                memo: String::new(),
            },
        )
        .unwrap();

        assert_eq!(keys_of(&keys), vec![ed(40), ed(12), ed(11)]);
        let flags: Vec<bool> = keys.iter().map(|k| k.for_scheduled_txn).collect();
        assert_eq!(flags, vec![false, true, true]);
    }

    #[test]
    fn test_schedule_signers_suppressed_when_not_included() {
        let resolver = SigRequirements::new(
            Arc::new(ledger()),
            ResolverConfig {
                include_scheduled_signers: false,
            },
        );
        let keys = other_keys(
            &resolver,
            TransactionData::ScheduleCreate {
                scheduled: Box::new(scheduled_transfer()),
                admin_key: Some(ed(40)),
                payer: None,
                memo: String::new(),
            },
        )
        .unwrap();

        assert_eq!(keys_of(&keys), vec![ed(40)]);
    }

    #[test]
    fn test_schedule_of_schedule_is_unschedulable() {
        let err = other_keys(
            &resolver(ledger()),
            TransactionData::ScheduleCreate {
                scheduled: Box::new(TransactionData::ScheduleSign {
                    schedule: ScheduleId::new(1),
                }),
                admin_key: None,
                payer: None,
                memo: String::new(),
            },
        )
        .unwrap_err();

        assert_eq!(err.reason, KeyOrderingFailure::UnschedulableTransaction);
        assert_eq!(err.entity, None);
    }

    #[test]
    fn test_schedule_sign_uses_designated_payer() {
        let ledger = ledger();
        let schedule = ScheduleId::new(700);
        ledger.put_schedule(
            schedule,
            ScheduleSigningMetadata {
                admin_key: None,
                designated_payer: PICKY_RECEIVER,
                scheduled_txn: scheduled_transfer(),
            },
        );
        let keys = other_keys(&resolver(ledger), TransactionData::ScheduleSign { schedule }).unwrap();

        assert_eq!(keys_of(&keys), vec![ed(13), ed(11)]);
        assert!(keys.iter().all(|k| k.for_scheduled_txn));
    }

    #[test]
    fn test_schedule_inner_failure_propagates() {
        let err = other_keys(
            &resolver(ledger()),
            TransactionData::ScheduleCreate {
                scheduled: Box::new(TransactionData::CryptoTransfer {
                    transfers: vec![transfer(MISSING, -1)],
                }),
                admin_key: None,
                payer: None,
                memo: String::new(),
            },
        )
        .unwrap_err();

        assert_eq!(err.reason, KeyOrderingFailure::MissingAccount);
        assert_eq!(err.entity, Some(MISSING.into()));
    }

    #[test]
    fn test_unencodable_scheduled_operation_is_general_error() {
        let ledger = ledger();
        let schedule = ScheduleId::new(702);
        ledger.put_schedule(
            schedule,
            ScheduleSigningMetadata {
                admin_key: None,
                designated_payer: PAYER,
                scheduled_txn: TransactionData::ContractCall {
                    contract: ContractId::new(5),
                    gas: 1,
                    function_parameters: vec![0; 7_000],
                },
            },
        );
        let resolver = resolver(ledger);

        let err = other_keys(&resolver, TransactionData::ScheduleSign { schedule }).unwrap_err();

        assert_eq!(err.reason, KeyOrderingFailure::GeneralError);
        assert_eq!(err.entity, Some(schedule.into()));
        assert!(resolver
            .scheduled_txn_of(&body(TransactionData::ScheduleSign { schedule }))
            .unwrap()
            .is_some());
        assert_eq!(
            resolver.scheduled_txn_of(&body(TransactionData::ScheduleSign {
                schedule: ScheduleId::new(1),
            })),
            Err(LookupFailure::NotFound)
        );
    }

    #[test]
    fn test_schedule_delete_without_admin_key_is_immutable() {
        let ledger = ledger();
        let schedule = ScheduleId::new(701);
        ledger.put_schedule(
            schedule,
            ScheduleSigningMetadata {
                admin_key: None,
                designated_payer: PAYER,
                scheduled_txn: scheduled_transfer(),
            },
        );
        let err = other_keys(&resolver(ledger), TransactionData::ScheduleDelete { schedule })
            .unwrap_err();

        assert_eq!(err.reason, KeyOrderingFailure::ImmutableSchedule);
    }

    #[test]
    fn test_missing_schedule() {
        let err = other_keys(
            &resolver(ledger()),
            TransactionData::ScheduleSign {
                schedule: ScheduleId::new(404),
            },
        )
        .unwrap_err();

        assert_eq!(err.reason, KeyOrderingFailure::InvalidSchedule);
    }
}
