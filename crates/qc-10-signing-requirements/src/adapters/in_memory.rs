//! In-Memory Ledger Adapters
//!
//! Implements `SigMetadataLookup` and `ScheduleSigAccumulator` over
//! process-local maps, for tests and for embedding callers that keep
//! entity state in memory.

use crate::ports::outbound::{
    AccountSigningMetadata, ContractSigningMetadata, FileSigningMetadata, LookupFailure,
    ScheduleSigAccumulator, ScheduleSigningMetadata, SigMetadataLookup, TopicSigningMetadata,
};
use parking_lot::RwLock;
use shared_types::{AccountId, ContractId, FileId, Key, ScheduleId, TopicId};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::trace;

#[derive(Clone)]
struct Entry<T> {
    meta: T,
    deleted: bool,
}

type Table<K, T> = RwLock<HashMap<K, Entry<T>>>;

/// In-memory entity metadata.
#[derive(Default)]
pub struct InMemorySigMetadataLookup {
    accounts: Table<AccountId, AccountSigningMetadata>,
    files: Table<FileId, FileSigningMetadata>,
    /// `None` for contracts without a usable admin key.
    contracts: Table<ContractId, Option<ContractSigningMetadata>>,
    topics: Table<TopicId, TopicSigningMetadata>,
    schedules: Table<ScheduleId, ScheduleSigningMetadata>,
}

impl InMemorySigMetadataLookup {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_account(&self, id: AccountId, key: Key, receiver_sig_required: bool) {
        insert(
            &self.accounts,
            id,
            AccountSigningMetadata {
                key,
                receiver_sig_required,
            },
        );
    }

    pub fn put_file(&self, id: FileId, wacl: Key) {
        insert(&self.files, id, FileSigningMetadata { wacl });
    }

    /// Contracts whose admin key is absent or delegated to a contract are
    /// stored as immutable.
    pub fn put_contract(&self, id: ContractId, admin_key: Option<Key>, receiver_sig_required: bool) {
        let meta = admin_key
            .filter(|key| !matches!(key, Key::ContractId(_)) && !key.is_empty())
            .map(|admin_key| ContractSigningMetadata {
                admin_key,
                receiver_sig_required,
            });
        insert(&self.contracts, id, meta);
    }

    pub fn put_topic(&self, id: TopicId, meta: TopicSigningMetadata) {
        insert(&self.topics, id, meta);
    }

    pub fn put_schedule(&self, id: ScheduleId, meta: ScheduleSigningMetadata) {
        insert(&self.schedules, id, meta);
    }

    pub fn mark_account_deleted(&self, id: AccountId) {
        mark_deleted(&self.accounts, &id);
    }

    pub fn mark_file_deleted(&self, id: FileId) {
        mark_deleted(&self.files, &id);
    }

    pub fn mark_contract_deleted(&self, id: ContractId) {
        mark_deleted(&self.contracts, &id);
    }

    pub fn mark_topic_deleted(&self, id: TopicId) {
        mark_deleted(&self.topics, &id);
    }

    pub fn mark_schedule_deleted(&self, id: ScheduleId) {
        mark_deleted(&self.schedules, &id);
    }
}

impl SigMetadataLookup for InMemorySigMetadataLookup {
    fn account_signing_meta_for(
        &self,
        id: &AccountId,
    ) -> Result<AccountSigningMetadata, LookupFailure> {
        trace!(account = %id, "Account signing metadata lookup");
        get(&self.accounts, id)
    }

    fn file_signing_meta_for(&self, id: &FileId) -> Result<FileSigningMetadata, LookupFailure> {
        get(&self.files, id)
    }

    fn contract_signing_meta_for(
        &self,
        id: &ContractId,
    ) -> Result<ContractSigningMetadata, LookupFailure> {
        get(&self.contracts, id)?.ok_or(LookupFailure::Unusable)
    }

    fn topic_signing_meta_for(
        &self,
        id: &TopicId,
    ) -> Result<TopicSigningMetadata, LookupFailure> {
        get(&self.topics, id)
    }

    fn schedule_signing_meta_for(
        &self,
        id: &ScheduleId,
    ) -> Result<ScheduleSigningMetadata, LookupFailure> {
        get(&self.schedules, id)
    }
}

fn insert<K: Eq + Hash, T>(table: &Table<K, T>, id: K, meta: T) {
    table.write().insert(
        id,
        Entry {
            meta,
            deleted: false,
        },
    );
}

fn mark_deleted<K: Eq + Hash, T>(table: &Table<K, T>, id: &K) {
    if let Some(entry) = table.write().get_mut(id) {
        entry.deleted = true;
    }
}

fn get<K: Eq + Hash, T: Clone>(table: &Table<K, T>, id: &K) -> Result<T, LookupFailure> {
    match table.read().get(id) {
        None => Err(LookupFailure::NotFound),
        Some(entry) if entry.deleted => Err(LookupFailure::Deleted),
        Some(entry) => Ok(entry.meta.clone()),
    }
}

/// In-memory schedule signature sets.
#[derive(Default)]
pub struct InMemoryScheduleSigs {
    signatures: RwLock<HashMap<ScheduleId, HashMap<Vec<u8>, Vec<u8>>>>,
}

impl InMemoryScheduleSigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a signature contributed to a schedule. A later signature for
    /// the same key replaces the earlier one.
    pub fn add_signature(&self, id: ScheduleId, public_key: Vec<u8>, signature: Vec<u8>) {
        self.signatures
            .write()
            .entry(id)
            .or_default()
            .insert(public_key, signature);
    }
}

impl ScheduleSigAccumulator for InMemoryScheduleSigs {
    fn signatures_for(&self, id: &ScheduleId) -> HashMap<Vec<u8>, Vec<u8>> {
        self.signatures.read().get(id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_lifecycle() {
        let ledger = InMemorySigMetadataLookup::new();
        let id = AccountId::new(1001);

        assert_eq!(ledger.account_signing_meta_for(&id), Err(LookupFailure::NotFound));

        ledger.put_account(id, Key::Ed25519(vec![1; 32]), true);
        let meta = ledger.account_signing_meta_for(&id).unwrap();
        assert!(meta.receiver_sig_required);

        ledger.mark_account_deleted(id);
        assert_eq!(ledger.account_signing_meta_for(&id), Err(LookupFailure::Deleted));
    }

    #[test]
    fn test_contract_without_admin_key_is_unusable() {
        let ledger = InMemorySigMetadataLookup::new();
        ledger.put_contract(ContractId::new(1), None, false);
        ledger.put_contract(
            ContractId::new(2),
            Some(Key::ContractId(ContractId::new(2))),
            false,
        );
        ledger.put_contract(ContractId::new(3), Some(Key::Ed25519(vec![3; 32])), false);

        assert_eq!(
            ledger.contract_signing_meta_for(&ContractId::new(1)),
            Err(LookupFailure::Unusable)
        );
        assert_eq!(
            ledger.contract_signing_meta_for(&ContractId::new(2)),
            Err(LookupFailure::Unusable)
        );
        assert!(ledger.contract_signing_meta_for(&ContractId::new(3)).is_ok());
    }

    #[test]
    fn test_schedule_sigs_unknown_schedule_is_empty() {
        let sigs = InMemoryScheduleSigs::new();
        sigs.add_signature(ScheduleId::new(1), vec![1], vec![2]);

        assert_eq!(sigs.signatures_for(&ScheduleId::new(1)).len(), 1);
        assert!(sigs.signatures_for(&ScheduleId::new(2)).is_empty());
    }
}
