//! # Domain Entities
//!
//! Core data structures flowing between the resolver, the platform signature
//! factory, the verifier and the activation evaluator.
//!
//! Everything here is created fresh for one transaction and dropped when the
//! check that created it returns.

use super::errors::SigCreationError;
use serde::{Deserialize, Serialize};
use shared_types::{Key, ECDSA_SECP256K1_KEY_LEN, ED25519_KEY_LEN};

// =============================================================================
// REQUIRED KEYS
// =============================================================================

/// A key the resolver requires to be active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredKey {
    /// The key structure.
    pub key: Key,
    /// Set when the requirement comes from a scheduled (inner) transaction.
    pub for_scheduled_txn: bool,
}

impl RequiredKey {
    /// A requirement of the transaction itself.
    pub fn direct(key: Key) -> Self {
        Self {
            key,
            for_scheduled_txn: false,
        }
    }

    /// A requirement of a scheduled inner transaction.
    pub fn scheduled(key: Key) -> Self {
        Self {
            key,
            for_scheduled_txn: true,
        }
    }
}

// =============================================================================
// PLATFORM SIGNATURE RECORDS
// =============================================================================

/// Outcome of verifying one [`TransactionSignature`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Not yet verified.
    Unknown,
    /// The signature verified.
    Valid,
    /// The signature is absent, malformed, or does not verify.
    Invalid,
}

impl VerificationStatus {
    /// Whether verification has finished for the record.
    pub fn is_terminal(self) -> bool {
        self != VerificationStatus::Unknown
    }
}

/// Signature scheme of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureType {
    Ed25519,
    EcdsaSecp256k1,
}

impl SignatureType {
    /// Scheme of a simple key, told apart by its length.
    pub fn of_public_key(public_key: &[u8]) -> Option<Self> {
        match public_key.len() {
            ED25519_KEY_LEN => Some(Self::Ed25519),
            ECDSA_SECP256K1_KEY_LEN => Some(Self::EcdsaSecp256k1),
            _ => None,
        }
    }
}

/// A verifiable signature record.
///
/// `contents` is laid out as `[signature][signed data]`; the expanded public
/// key is held separately. Offsets and lengths are `u32`, so every segment
/// must fit in 4 GiB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionSignature {
    contents: Vec<u8>,
    expanded_public_key: Vec<u8>,
    public_key_offset: u32,
    public_key_len: u32,
    signature_offset: u32,
    signature_len: u32,
    message_offset: u32,
    message_len: u32,
    signature_type: SignatureType,
    status: VerificationStatus,
}

impl TransactionSignature {
    /// Build a record with status [`VerificationStatus::Unknown`].
    ///
    /// An empty `signature` is allowed; such a record verifies as invalid.
    pub fn new(
        signature_type: SignatureType,
        public_key: &[u8],
        signature: &[u8],
        message: &[u8],
    ) -> Result<Self, SigCreationError> {
        let public_key_len = segment_len(public_key)?;
        let signature_len = segment_len(signature)?;
        let message_len = segment_len(message)?;
        let total = signature.len() + message.len();
        segment_len_of(total)?;

        let mut contents = Vec::with_capacity(total);
        contents.extend_from_slice(signature);
        contents.extend_from_slice(message);

        Ok(Self {
            contents,
            expanded_public_key: public_key.to_vec(),
            public_key_offset: 0,
            public_key_len,
            signature_offset: 0,
            signature_len,
            message_offset: signature_len,
            message_len,
            signature_type,
            status: VerificationStatus::Unknown,
        })
    }

    /// The full `[signature][signed data]` buffer.
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// The public key the signature is checked against.
    pub fn public_key(&self) -> &[u8] {
        slice(
            &self.expanded_public_key,
            self.public_key_offset,
            self.public_key_len,
        )
    }

    /// The signature segment.
    pub fn signature(&self) -> &[u8] {
        slice(&self.contents, self.signature_offset, self.signature_len)
    }

    /// The signed-data segment.
    pub fn message(&self) -> &[u8] {
        slice(&self.contents, self.message_offset, self.message_len)
    }

    /// Signature scheme.
    pub fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    /// Current verification status.
    pub fn status(&self) -> VerificationStatus {
        self.status
    }

    /// Record the verification outcome.
    ///
    /// The status can be set once; returns `false` (leaving the record
    /// unchanged) if it is already terminal or `status` is `Unknown`.
    pub fn record_outcome(&mut self, status: VerificationStatus) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }
}

fn segment_len(segment: &[u8]) -> Result<u32, SigCreationError> {
    segment_len_of(segment.len())
}

fn segment_len_of(len: usize) -> Result<u32, SigCreationError> {
    u32::try_from(len).map_err(|_| SigCreationError::OversizedBuffer { len })
}

fn slice(buffer: &[u8], offset: u32, len: u32) -> &[u8] {
    let start = offset as usize;
    &buffer[start..start + len as usize]
}
