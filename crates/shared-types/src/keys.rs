//! # Key Model
//!
//! The recursive authorization requirement attached to accounts, files,
//! contracts, topics and schedules.
//!
//! A key is a tree: simple keys are leaves, key lists and threshold keys are
//! interior nodes. A contract-id key is a leaf that no signature can satisfy.
//!
//! ## Encoding
//!
//! Keys are encoded with bincode (varint, little-endian, trailing bytes
//! rejected). Decoding is bounded by [`MAX_ENCODED_KEY_LEN`] and rejects
//! zero thresholds and trees deeper than [`MAX_KEY_DEPTH`]. Nesting is
//! bounded while decoding, wherever a key is embedded, so a hostile encoding
//! cannot drive recursion past the limit.

use crate::entities::ContractId;
use crate::errors::KeyError;
use crate::nesting;
use bincode::Options;
use serde::{Deserialize, Deserializer, Serialize};
use std::num::NonZeroU32;

/// Length of an Ed25519 public key.
pub const ED25519_KEY_LEN: usize = 32;

/// Length of a compressed secp256k1 public key.
pub const ECDSA_SECP256K1_KEY_LEN: usize = 33;

/// Maximum nesting depth of a valid key.
pub const MAX_KEY_DEPTH: usize = 15;

/// Upper bound on the encoded size of a key.
pub const MAX_ENCODED_KEY_LEN: u64 = 2048;

/// A cryptographic authorization requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Simple Ed25519 public key (32 bytes when valid).
    Ed25519(Vec<u8>),
    /// Simple compressed secp256k1 public key (33 bytes when valid).
    EcdsaSecp256k1(Vec<u8>),
    /// Every child must be active.
    KeyList(#[serde(deserialize_with = "child_keys")] Vec<Key>),
    /// At least `threshold` children must be active.
    Threshold(ThresholdKey),
    /// Authority delegated to contract logic; never satisfied by a signature.
    ContractId(ContractId),
}

/// An M-of-N key.
///
/// The threshold is never zero; it may exceed the list size, in which case
/// the key is constructible but not valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThresholdKey {
    threshold: NonZeroU32,
    #[serde(deserialize_with = "child_keys")]
    keys: Vec<Key>,
}

impl ThresholdKey {
    /// Create a threshold key, rejecting a zero threshold.
    pub fn new(threshold: u32, keys: Vec<Key>) -> Result<Self, KeyError> {
        let threshold = NonZeroU32::new(threshold).ok_or(KeyError::ZeroThreshold)?;
        Ok(Self { threshold, keys })
    }

    /// Minimum number of active children.
    pub fn threshold(&self) -> u32 {
        self.threshold.get()
    }

    /// The candidate children, in list order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }
}

impl Key {
    /// Build a threshold key.
    pub fn threshold(threshold: u32, keys: Vec<Key>) -> Result<Self, KeyError> {
        ThresholdKey::new(threshold, keys).map(Key::Threshold)
    }

    /// Raw public-key bytes if this is a simple key.
    pub fn simple_bytes(&self) -> Option<&[u8]> {
        match self {
            Key::Ed25519(bytes) | Key::EcdsaSecp256k1(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Whether this is a simple (leaf, signature-bearing) key.
    pub fn is_simple(&self) -> bool {
        self.simple_bytes().is_some()
    }

    /// True iff every reachable leaf is absent.
    pub fn is_empty(&self) -> bool {
        match self {
            Key::Ed25519(bytes) | Key::EcdsaSecp256k1(bytes) => bytes.is_empty(),
            Key::KeyList(keys) => keys.iter().all(Key::is_empty),
            Key::Threshold(tk) => tk.keys.iter().all(Key::is_empty),
            Key::ContractId(_) => false,
        }
    }

    /// Structural validity of the whole tree.
    pub fn is_valid(&self) -> bool {
        !self.is_empty() && self.depth() <= MAX_KEY_DEPTH && self.is_structurally_valid()
    }

    fn is_structurally_valid(&self) -> bool {
        match self {
            Key::Ed25519(bytes) => bytes.len() == ED25519_KEY_LEN,
            Key::EcdsaSecp256k1(bytes) => bytes.len() == ECDSA_SECP256K1_KEY_LEN,
            Key::KeyList(keys) => {
                !keys.is_empty() && keys.iter().all(Key::is_structurally_valid)
            }
            Key::Threshold(tk) => {
                tk.threshold() as usize <= tk.keys.len()
                    && tk.keys.iter().all(Key::is_structurally_valid)
            }
            Key::ContractId(_) => true,
        }
    }

    /// Nesting depth; leaves have depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Key::KeyList(keys) => 1 + keys.iter().map(Key::depth).max().unwrap_or(0),
            Key::Threshold(tk) => 1 + tk.keys.iter().map(Key::depth).max().unwrap_or(0),
            _ => 1,
        }
    }

    /// Visit every simple leaf in list order. Duplicates are visited each time.
    pub fn visit_simple_keys<'a, F>(&'a self, visitor: &mut F)
    where
        F: FnMut(&'a Key),
    {
        match self {
            Key::Ed25519(_) | Key::EcdsaSecp256k1(_) => visitor(self),
            Key::KeyList(keys) => keys.iter().for_each(|k| k.visit_simple_keys(visitor)),
            Key::Threshold(tk) => tk.keys.iter().for_each(|k| k.visit_simple_keys(visitor)),
            Key::ContractId(_) => {}
        }
    }

    /// All simple leaves in list order.
    pub fn simple_keys(&self) -> Vec<&Key> {
        let mut leaves = Vec::new();
        self.visit_simple_keys(&mut |k| leaves.push(k));
        leaves
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, KeyError> {
        codec()
            .serialize(self)
            .map_err(|e| KeyError::Encoding(e.to_string()))
    }

    /// Decode from bytes produced by [`Key::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let key: Key = codec()
            .deserialize(bytes)
            .map_err(|e| KeyError::Encoding(e.to_string()))?;
        let depth = key.depth();
        if depth > MAX_KEY_DEPTH {
            return Err(KeyError::TooDeep {
                depth,
                max: MAX_KEY_DEPTH,
            });
        }
        Ok(key)
    }
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_ENCODED_KEY_LEN)
}

/// Children of a list or threshold key. A tree of depth `MAX_KEY_DEPTH`
/// opens at most `MAX_KEY_DEPTH - 1` lists; one more is let through so the
/// depth check can report it precisely.
fn child_keys<'de, D>(deserializer: D) -> Result<Vec<Key>, D::Error>
where
    D: Deserializer<'de>,
{
    nesting::bounded(deserializer, &nesting::KEY_LISTS, MAX_KEY_DEPTH, "key list")
}
