//! # Transactions
//!
//! Transaction bodies, signature maps and the signed envelope that arrives
//! at ingress.
//!
//! ## Wire Format
//!
//! ```text
//! SignedTransaction
//!   ├── body_bytes     = bincode(TransactionBody)   <- the signed data
//!   └── sig_map_bytes  = bincode(SignatureMap)
//! ```
//!
//! Keeping the body and the signature map as separate byte strings lets the
//! body be parsed (and its signed bytes reused verbatim) without trusting the
//! signature map, which is decoded later and may be malformed.

use crate::entities::{AccountId, ContractId, FileId, ScheduleId, TopicId};
use crate::errors::TransactionError;
use crate::keys::{Key, MAX_KEY_DEPTH};
use crate::nesting;
use bincode::Options;
use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound on any encoded transaction component.
pub const MAX_TRANSACTION_LEN: u64 = 6144;

/// Deepest chain of scheduled operations a body may decode to. Two levels
/// keep a schedule of a schedule representable so it can be refused as
/// unschedulable.
pub const MAX_SCHEDULE_NESTING: usize = 2;

// =============================================================================
// BODY
// =============================================================================

/// Identifies a transaction and its fee payer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId {
    /// Account paying the transaction fees.
    pub payer: AccountId,
    /// Start of the validity window, in seconds.
    pub valid_start_secs: u64,
    /// Whether this id belongs to a triggered scheduled transaction.
    pub scheduled: bool,
}

impl TransactionId {
    /// An id for a directly submitted transaction.
    pub fn new(payer: AccountId, valid_start_secs: u64) -> Self {
        Self {
            payer,
            valid_start_secs,
            scheduled: false,
        }
    }
}

/// A single hbar adjustment in a transfer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAmount {
    /// The adjusted account.
    pub account: AccountId,
    /// Negative for debits, positive for credits.
    pub amount: i64,
}

/// The parsed body of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
    /// Transaction id, including the payer.
    pub transaction_id: TransactionId,
    /// Node the transaction was submitted to.
    pub node_account: Option<AccountId>,
    /// Free-form memo.
    pub memo: String,
    /// The operation.
    pub data: TransactionData,
}

impl TransactionBody {
    /// The designated payer.
    pub fn payer(&self) -> AccountId {
        self.transaction_id.payer
    }

    /// The operation type.
    pub fn function(&self) -> FunctionType {
        self.data.function()
    }

    /// Encode for signing and transport.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        codec()
            .serialize(self)
            .map_err(|e| TransactionError::MalformedBody(e.to_string()))
    }

    /// Decode body bytes, rejecting embedded keys deeper than
    /// [`MAX_KEY_DEPTH`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let body: Self = codec()
            .deserialize(bytes)
            .map_err(|e| TransactionError::MalformedBody(e.to_string()))?;
        let depth = body
            .data
            .embedded_keys()
            .into_iter()
            .map(Key::depth)
            .max()
            .unwrap_or(0);
        if depth > MAX_KEY_DEPTH {
            return Err(TransactionError::KeyTooDeep {
                depth,
                max: MAX_KEY_DEPTH,
            });
        }
        Ok(body)
    }
}

/// The operation carried by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionData {
    CryptoCreate {
        key: Key,
        receiver_sig_required: bool,
        initial_balance: u64,
    },
    CryptoTransfer {
        transfers: Vec<AccountAmount>,
    },
    CryptoUpdate {
        account: AccountId,
        key: Option<Key>,
        receiver_sig_required: Option<bool>,
    },
    CryptoDelete {
        account: AccountId,
        transfer_account: AccountId,
    },
    FileCreate {
        keys: Key,
        contents: Vec<u8>,
    },
    FileAppend {
        file: FileId,
        contents: Vec<u8>,
    },
    FileUpdate {
        file: FileId,
        keys: Option<Key>,
        contents: Option<Vec<u8>>,
    },
    FileDelete {
        file: FileId,
    },
    ContractCreate {
        admin_key: Option<Key>,
        auto_renew_account: Option<AccountId>,
        gas: u64,
    },
    ContractCall {
        contract: ContractId,
        gas: u64,
        function_parameters: Vec<u8>,
    },
    ContractUpdate {
        contract: ContractId,
        admin_key: Option<Key>,
        auto_renew_account: Option<AccountId>,
    },
    ContractDelete {
        contract: ContractId,
        transfer_account: Option<AccountId>,
    },
    ConsensusCreateTopic {
        admin_key: Option<Key>,
        submit_key: Option<Key>,
        auto_renew_account: Option<AccountId>,
    },
    ConsensusUpdateTopic {
        topic: TopicId,
        admin_key: Option<Key>,
        submit_key: Option<Key>,
        auto_renew_account: Option<AccountId>,
    },
    ConsensusDeleteTopic {
        topic: TopicId,
    },
    ConsensusSubmitMessage {
        topic: TopicId,
        message: Vec<u8>,
    },
    /// Defers `scheduled` until its signers have all signed.
    ScheduleCreate {
        #[serde(deserialize_with = "scheduled_txn")]
        scheduled: Box<TransactionData>,
        admin_key: Option<Key>,
        /// Payer of the inner transaction; defaults to the outer payer.
        payer: Option<AccountId>,
        memo: String,
    },
    ScheduleSign {
        schedule: ScheduleId,
    },
    ScheduleDelete {
        schedule: ScheduleId,
    },
    Freeze {
        start_secs: u64,
    },
}

impl TransactionData {
    /// The operation type.
    pub fn function(&self) -> FunctionType {
        match self {
            Self::CryptoCreate { .. } => FunctionType::CryptoCreate,
            Self::CryptoTransfer { .. } => FunctionType::CryptoTransfer,
            Self::CryptoUpdate { .. } => FunctionType::CryptoUpdate,
            Self::CryptoDelete { .. } => FunctionType::CryptoDelete,
            Self::FileCreate { .. } => FunctionType::FileCreate,
            Self::FileAppend { .. } => FunctionType::FileAppend,
            Self::FileUpdate { .. } => FunctionType::FileUpdate,
            Self::FileDelete { .. } => FunctionType::FileDelete,
            Self::ContractCreate { .. } => FunctionType::ContractCreate,
            Self::ContractCall { .. } => FunctionType::ContractCall,
            Self::ContractUpdate { .. } => FunctionType::ContractUpdate,
            Self::ContractDelete { .. } => FunctionType::ContractDelete,
            Self::ConsensusCreateTopic { .. } => FunctionType::ConsensusCreateTopic,
            Self::ConsensusUpdateTopic { .. } => FunctionType::ConsensusUpdateTopic,
            Self::ConsensusDeleteTopic { .. } => FunctionType::ConsensusDeleteTopic,
            Self::ConsensusSubmitMessage { .. } => FunctionType::ConsensusSubmitMessage,
            Self::ScheduleCreate { .. } => FunctionType::ScheduleCreate,
            Self::ScheduleSign { .. } => FunctionType::ScheduleSign,
            Self::ScheduleDelete { .. } => FunctionType::ScheduleDelete,
            Self::Freeze { .. } => FunctionType::Freeze,
        }
    }

    /// Keys carried by the operation itself, including those of a scheduled
    /// operation.
    pub fn embedded_keys(&self) -> Vec<&Key> {
        match self {
            Self::CryptoCreate { key, .. } => vec![key],
            Self::CryptoUpdate { key, .. } => key.iter().collect(),
            Self::FileCreate { keys, .. } => vec![keys],
            Self::FileUpdate { keys, .. } => keys.iter().collect(),
            Self::ContractCreate { admin_key, .. } | Self::ContractUpdate { admin_key, .. } => {
                admin_key.iter().collect()
            }
            Self::ConsensusCreateTopic {
                admin_key,
                submit_key,
                ..
            }
            | Self::ConsensusUpdateTopic {
                admin_key,
                submit_key,
                ..
            } => admin_key.iter().chain(submit_key).collect(),
            Self::ScheduleCreate {
                scheduled,
                admin_key,
                ..
            } => {
                let mut keys: Vec<&Key> = admin_key.iter().collect();
                keys.extend(scheduled.embedded_keys());
                keys
            }
            _ => Vec::new(),
        }
    }

    /// Canonical bytes of the operation alone.
    ///
    /// Signatures collected for a schedule are made over these bytes of the
    /// scheduled operation, so they stay valid across submissions.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        codec()
            .serialize(self)
            .map_err(|e| TransactionError::MalformedBody(e.to_string()))
    }
}

/// Discriminant of [`TransactionData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionType {
    CryptoCreate,
    CryptoTransfer,
    CryptoUpdate,
    CryptoDelete,
    FileCreate,
    FileAppend,
    FileUpdate,
    FileDelete,
    ContractCreate,
    ContractCall,
    ContractUpdate,
    ContractDelete,
    ConsensusCreateTopic,
    ConsensusUpdateTopic,
    ConsensusDeleteTopic,
    ConsensusSubmitMessage,
    ScheduleCreate,
    ScheduleSign,
    ScheduleDelete,
    Freeze,
}

impl FunctionType {
    /// Whether a transaction of this type may be wrapped in a schedule.
    pub fn is_schedulable(self) -> bool {
        !matches!(
            self,
            Self::ScheduleCreate | Self::ScheduleSign | Self::ScheduleDelete
        )
    }
}

// =============================================================================
// SIGNATURE MAP
// =============================================================================

/// Signature bytes tagged with their scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureValue {
    Ed25519(Vec<u8>),
    EcdsaSecp256k1(Vec<u8>),
    /// Contract-authorized signature; never matches a simple key.
    Contract(Vec<u8>),
}

/// A public-key prefix and the signature made by the matching key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePair {
    /// Leading bytes of the signer's public key (may be empty).
    pub pub_key_prefix: Vec<u8>,
    /// The signature.
    pub signature: SignatureValue,
}

/// All signatures attached to a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureMap {
    /// Pairs in submission order.
    pub pairs: Vec<SignaturePair>,
}

impl SignatureMap {
    /// Encode for transport.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        codec()
            .serialize(self)
            .map_err(|e| TransactionError::MalformedSigMap(e.to_string()))
    }

    /// Decode signature map bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        codec()
            .deserialize(bytes)
            .map_err(|e| TransactionError::MalformedSigMap(e.to_string()))
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// A transaction as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Encoded [`TransactionBody`]; this is what signers sign.
    pub body_bytes: Vec<u8>,
    /// Encoded [`SignatureMap`].
    pub sig_map_bytes: Vec<u8>,
}

impl SignedTransaction {
    /// Encode a body and signature map into an envelope.
    pub fn new(body: &TransactionBody, sig_map: &SignatureMap) -> Result<Self, TransactionError> {
        Ok(Self {
            body_bytes: body.to_bytes()?,
            sig_map_bytes: sig_map.to_bytes()?,
        })
    }

    /// Encode the envelope.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        bincode::DefaultOptions::new()
            .with_limit(2 * MAX_TRANSACTION_LEN)
            .serialize(self)
            .map_err(|e| TransactionError::MalformedEnvelope(e.to_string()))
    }

    /// Decode an envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        bincode::DefaultOptions::new()
            .with_limit(2 * MAX_TRANSACTION_LEN)
            .deserialize(bytes)
            .map_err(|e| TransactionError::MalformedEnvelope(e.to_string()))
    }
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_TRANSACTION_LEN)
}

fn scheduled_txn<'de, D>(deserializer: D) -> Result<Box<TransactionData>, D::Error>
where
    D: Deserializer<'de>,
{
    nesting::bounded(
        deserializer,
        &nesting::SCHEDULED_TXNS,
        MAX_SCHEDULE_NESTING,
        "scheduled operation",
    )
}
