//! # Key Activation
//!
//! Decides whether a key structure is satisfied by a set of verified
//! signatures.
//!
//! ## Rules
//!
//! - Simple key: look up its public key bytes, ask the policy.
//! - Contract-id key: never active.
//! - Key list: every child active; an empty list is never active.
//! - Threshold key: at least `threshold` children active.
//!
//! Duplicate simple keys in different branches are each evaluated; status
//! lookups are memoized per public key within one evaluation.

use super::entities::{TransactionSignature, VerificationStatus};
use shared_types::Key;
use std::collections::HashMap;

/// Decides whether a found (or missing) signature status activates a key.
pub trait ActivationPolicy {
    /// `status` is `None` when no signature exists for the key.
    fn is_satisfied(&self, key: &Key, status: Option<VerificationStatus>) -> bool;
}

impl<F> ActivationPolicy for F
where
    F: Fn(&Key, Option<VerificationStatus>) -> bool,
{
    fn is_satisfied(&self, key: &Key, status: Option<VerificationStatus>) -> bool {
        self(key, status)
    }
}

/// Strict policy for real authorization: only a verified signature counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlyIfSigIsValid;

impl ActivationPolicy for OnlyIfSigIsValid {
    fn is_satisfied(&self, _key: &Key, status: Option<VerificationStatus>) -> bool {
        status == Some(VerificationStatus::Valid)
    }
}

/// Permissive policy: any signature not known to be invalid counts.
///
/// For call sites that evaluate before verification has finished; never
/// use it to authorize a transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfSigNotInvalid;

impl ActivationPolicy for IfSigNotInvalid {
    fn is_satisfied(&self, _key: &Key, status: Option<VerificationStatus>) -> bool {
        matches!(
            status,
            Some(VerificationStatus::Valid) | Some(VerificationStatus::Unknown)
        )
    }
}

/// The strict policy.
pub const ONLY_IF_SIG_IS_VALID: OnlyIfSigIsValid = OnlyIfSigIsValid;

/// The permissive policy.
pub const IF_SIG_NOT_INVALID: IfSigNotInvalid = IfSigNotInvalid;

/// Whether `key` is active under `policy`, given a lookup from public key
/// bytes to verification status.
pub fn is_active<S, P>(key: &Key, sig_status_fn: S, policy: &P) -> bool
where
    S: Fn(&[u8]) -> Option<VerificationStatus>,
    P: ActivationPolicy + ?Sized,
{
    KeyActivation::new(sig_status_fn, policy).is_active(key)
}

/// Map public keys to the status of their signature records.
///
/// When a key has several records the most decided one wins: `Valid` over
/// `Invalid` over `Unknown`.
pub fn status_map_from(records: &[TransactionSignature]) -> HashMap<Vec<u8>, VerificationStatus> {
    fn rank(status: VerificationStatus) -> u8 {
        match status {
            VerificationStatus::Unknown => 0,
            VerificationStatus::Invalid => 1,
            VerificationStatus::Valid => 2,
        }
    }

    let mut statuses = HashMap::with_capacity(records.len());
    for record in records {
        let status = record.status();
        statuses
            .entry(record.public_key().to_vec())
            .and_modify(|existing| {
                if rank(status) > rank(*existing) {
                    *existing = status;
                }
            })
            .or_insert(status);
    }
    statuses
}

/// One activation evaluation, memoizing status lookups.
pub struct KeyActivation<'p, S, P: ?Sized> {
    sig_status_fn: S,
    policy: &'p P,
    memo: HashMap<Vec<u8>, Option<VerificationStatus>>,
}

impl<'p, S, P> KeyActivation<'p, S, P>
where
    S: Fn(&[u8]) -> Option<VerificationStatus>,
    P: ActivationPolicy + ?Sized,
{
    /// Start an evaluation.
    pub fn new(sig_status_fn: S, policy: &'p P) -> Self {
        Self {
            sig_status_fn,
            policy,
            memo: HashMap::new(),
        }
    }

    /// Whether `key` is active.
    pub fn is_active(&mut self, key: &Key) -> bool {
        match key {
            Key::Ed25519(bytes) | Key::EcdsaSecp256k1(bytes) => {
                let status = self.status_of(bytes);
                self.policy.is_satisfied(key, status)
            }
            Key::ContractId(_) => false,
            Key::KeyList(keys) => !keys.is_empty() && keys.iter().all(|k| self.is_active(k)),
            Key::Threshold(tk) => {
                let needed = tk.threshold() as usize;
                let keys = tk.keys();
                let mut active = 0usize;
                for (i, child) in keys.iter().enumerate() {
                    if self.is_active(child) {
                        active += 1;
                        if active >= needed {
                            return true;
                        }
                    }
                    let remaining = keys.len() - i - 1;
                    if active + remaining < needed {
                        return false;
                    }
                }
                false
            }
        }
    }

    fn status_of(&mut self, bytes: &[u8]) -> Option<VerificationStatus> {
        if let Some(status) = self.memo.get(bytes) {
            return *status;
        }
        let status = (self.sig_status_fn)(bytes);
        self.memo.insert(bytes.to_vec(), status);
        status
    }
}
