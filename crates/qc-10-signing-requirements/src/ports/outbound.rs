//! # Outbound Ports (Driven Ports / SPI)
//!
//! Read-only views of ledger state the engine needs: signing metadata for
//! every entity category, and the signatures a schedule has accumulated.
//!
//! Implementations are shared across concurrent checks and must support
//! concurrent reads (`Send + Sync`).

use shared_types::{AccountId, ContractId, FileId, Key, ScheduleId, TopicId, TransactionData};
use std::collections::HashMap;
use thiserror::Error;

/// Why an entity's signing metadata is unavailable.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LookupFailure {
    /// No such entity.
    #[error("Entity not found")]
    NotFound,

    /// The entity exists but is deleted.
    #[error("Entity deleted")]
    Deleted,

    /// The entity exists but cannot authorize anything yet (e.g. an
    /// immutable contract with no admin key, or an executed schedule).
    #[error("Entity not usable")]
    Unusable,
}

/// Signing metadata of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSigningMetadata {
    /// The account key.
    pub key: Key,
    /// Whether crediting the account requires its signature.
    pub receiver_sig_required: bool,
}

/// Signing metadata of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSigningMetadata {
    /// The WACL; empty for immutable files.
    pub wacl: Key,
}

/// Signing metadata of a mutable contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSigningMetadata {
    /// The admin key.
    pub admin_key: Key,
    /// Whether crediting the contract requires its signature.
    pub receiver_sig_required: bool,
}

/// Signing metadata of a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSigningMetadata {
    /// Key allowed to update or delete the topic.
    pub admin_key: Option<Key>,
    /// Key required to submit messages.
    pub submit_key: Option<Key>,
}

/// Signing metadata of a pending schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSigningMetadata {
    /// Key allowed to delete the schedule.
    pub admin_key: Option<Key>,
    /// Payer of the scheduled transaction.
    pub designated_payer: AccountId,
    /// The scheduled (inner) operation.
    pub scheduled_txn: TransactionData,
}

/// Entity metadata lookups consumed by the signing-order resolver.
pub trait SigMetadataLookup: Send + Sync {
    /// Account key and receiver-signature flag.
    fn account_signing_meta_for(
        &self,
        id: &AccountId,
    ) -> Result<AccountSigningMetadata, LookupFailure>;

    /// File WACL.
    fn file_signing_meta_for(&self, id: &FileId) -> Result<FileSigningMetadata, LookupFailure>;

    /// Contract admin key.
    ///
    /// Contracts without an admin key (or whose admin key is a contract-id
    /// key) report [`LookupFailure::Unusable`].
    fn contract_signing_meta_for(
        &self,
        id: &ContractId,
    ) -> Result<ContractSigningMetadata, LookupFailure>;

    /// Topic admin and submit keys.
    fn topic_signing_meta_for(&self, id: &TopicId)
        -> Result<TopicSigningMetadata, LookupFailure>;

    /// Schedule admin key, designated payer and inner transaction.
    fn schedule_signing_meta_for(
        &self,
        id: &ScheduleId,
    ) -> Result<ScheduleSigningMetadata, LookupFailure>;
}

/// Signatures contributed to a schedule across earlier submissions.
pub trait ScheduleSigAccumulator: Send + Sync {
    /// Full public key bytes mapped to signature bytes. Empty if the schedule
    /// is unknown or has no signatures yet.
    fn signatures_for(&self, id: &ScheduleId) -> HashMap<Vec<u8>, Vec<u8>>;
}
