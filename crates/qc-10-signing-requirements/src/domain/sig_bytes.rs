//! # Signature-Bytes Source
//!
//! Finds the raw signature bytes a transaction carries for a given public
//! key. A provider is built for one transaction and hands out one view per
//! role (payer, other parties, all parties).
//!
//! ## Matching
//!
//! Signature-map pairs are scanned in submission order and the first pair
//! whose prefix is a prefix of the public key wins. An empty prefix matches
//! every key. Contract signatures never match. Ambiguous prefixes are not
//! disambiguated.
//!
//! Schedule transactions are the exception: one key may sign both the outer
//! body and the scheduled operation in the same map. There every matching
//! signature is a candidate, and [`VerifyingSigBytes`] moves the first one
//! that verifies over the relevant bytes to the front.

use super::accessor::SignedTxnAccessor;
use super::entities::SignatureType;
use super::errors::SigMapError;
use super::verifier::signature_verifies;
use crate::ports::outbound::ScheduleSigAccumulator;
use shared_types::{SignatureMap, SignatureValue, TransactionData};
use std::collections::HashMap;
use tracing::debug;

/// Maps a public key to the signature bytes made with it.
pub trait PubKeyToSigBytes {
    /// `Ok(None)` when no signature exists for the key.
    fn sig_bytes_for(&self, pub_key: &[u8]) -> Result<Option<Vec<u8>>, SigMapError>;

    /// Every signature that may belong to the key, preferred first. The
    /// first candidate is what [`PubKeyToSigBytes::sig_bytes_for`] returns.
    fn candidate_sig_bytes_for(&self, pub_key: &[u8]) -> Result<Vec<Vec<u8>>, SigMapError> {
        Ok(self.sig_bytes_for(pub_key)?.into_iter().collect())
    }
}

impl<T: PubKeyToSigBytes + ?Sized> PubKeyToSigBytes for &T {
    fn sig_bytes_for(&self, pub_key: &[u8]) -> Result<Option<Vec<u8>>, SigMapError> {
        (**self).sig_bytes_for(pub_key)
    }

    fn candidate_sig_bytes_for(&self, pub_key: &[u8]) -> Result<Vec<Vec<u8>>, SigMapError> {
        (**self).candidate_sig_bytes_for(pub_key)
    }
}

impl<T: PubKeyToSigBytes + ?Sized> PubKeyToSigBytes for Box<T> {
    fn sig_bytes_for(&self, pub_key: &[u8]) -> Result<Option<Vec<u8>>, SigMapError> {
        (**self).sig_bytes_for(pub_key)
    }

    fn candidate_sig_bytes_for(&self, pub_key: &[u8]) -> Result<Vec<Vec<u8>>, SigMapError> {
        (**self).candidate_sig_bytes_for(pub_key)
    }
}

/// Role-specific views over one transaction's signatures.
pub trait PubKeyToSigBytesProvider: Send + Sync {
    /// Signatures usable for the payer's keys.
    fn payer_sig_bytes_for(&self) -> Box<dyn PubKeyToSigBytes + '_>;

    /// Signatures usable for other parties' keys.
    fn other_parties_sig_bytes_for(&self) -> Box<dyn PubKeyToSigBytes + '_>;

    /// Every signature: the payer view first, then the other-parties view.
    fn all_parties_sig_bytes_for(&self) -> Box<dyn PubKeyToSigBytes + '_> {
        Box::new(ChainedSigBytes::new(
            self.payer_sig_bytes_for(),
            self.other_parties_sig_bytes_for(),
        ))
    }
}

// =============================================================================
// Signature map view
// =============================================================================

/// Lookup over a decoded signature map.
///
/// A map that failed to decode is kept as the error every lookup returns.
#[derive(Debug, Clone)]
pub struct SigMapPubKeyToSigBytes {
    decoded: Result<SignatureMap, SigMapError>,
}

impl SigMapPubKeyToSigBytes {
    /// Index an already decoded map.
    pub fn new(sig_map: SignatureMap) -> Self {
        Self {
            decoded: Ok(sig_map),
        }
    }

    /// Decode map bytes, holding any failure for later lookups.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let decoded = SignatureMap::from_bytes(bytes).map_err(|e| {
            debug!(error = %e, len = bytes.len(), "Signature map does not decode");
            SigMapError::Malformed(e.to_string())
        });
        Self { decoded }
    }

    /// Whether the map decoded.
    pub fn is_well_formed(&self) -> bool {
        self.decoded.is_ok()
    }

    /// Signatures of the pairs matching `pub_key`, in map order.
    fn matching<'a>(
        &'a self,
        pub_key: &'a [u8],
    ) -> Result<impl Iterator<Item = &'a Vec<u8>> + 'a, SigMapError> {
        let sig_map = self.decoded.as_ref().map_err(Clone::clone)?;
        Ok(sig_map
            .pairs
            .iter()
            .filter(move |pair| pub_key.starts_with(&pair.pub_key_prefix))
            .filter_map(|pair| match &pair.signature {
                SignatureValue::Ed25519(sig) | SignatureValue::EcdsaSecp256k1(sig) => Some(sig),
                SignatureValue::Contract(_) => None,
            }))
    }
}

impl PubKeyToSigBytes for SigMapPubKeyToSigBytes {
    fn sig_bytes_for(&self, pub_key: &[u8]) -> Result<Option<Vec<u8>>, SigMapError> {
        Ok(self.matching(pub_key)?.next().cloned())
    }

    fn candidate_sig_bytes_for(&self, pub_key: &[u8]) -> Result<Vec<Vec<u8>>, SigMapError> {
        Ok(self.matching(pub_key)?.cloned().collect())
    }
}

/// Signatures a schedule has accumulated, matched on the full public key.
#[derive(Debug, Clone, Default)]
pub struct AccumulatedSigBytes {
    signatures: HashMap<Vec<u8>, Vec<u8>>,
}

impl AccumulatedSigBytes {
    pub fn new(signatures: HashMap<Vec<u8>, Vec<u8>>) -> Self {
        Self { signatures }
    }
}

impl PubKeyToSigBytes for AccumulatedSigBytes {
    fn sig_bytes_for(&self, pub_key: &[u8]) -> Result<Option<Vec<u8>>, SigMapError> {
        Ok(self.signatures.get(pub_key).cloned())
    }
}

/// Consults `first`, falling back to `second` when it has no signature.
pub struct ChainedSigBytes<A, B> {
    first: A,
    second: B,
}

impl<A, B> ChainedSigBytes<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: PubKeyToSigBytes, B: PubKeyToSigBytes> PubKeyToSigBytes for ChainedSigBytes<A, B> {
    fn sig_bytes_for(&self, pub_key: &[u8]) -> Result<Option<Vec<u8>>, SigMapError> {
        match self.first.sig_bytes_for(pub_key)? {
            Some(sig) => Ok(Some(sig)),
            None => self.second.sig_bytes_for(pub_key),
        }
    }

    fn candidate_sig_bytes_for(&self, pub_key: &[u8]) -> Result<Vec<Vec<u8>>, SigMapError> {
        let mut candidates = self.first.candidate_sig_bytes_for(pub_key)?;
        candidates.extend(self.second.candidate_sig_bytes_for(pub_key)?);
        Ok(candidates)
    }
}

/// Prefers the first candidate that verifies over `signed_bytes`; with none
/// verifying, the candidates keep their order.
pub struct VerifyingSigBytes<'m, S> {
    candidates: S,
    signed_bytes: &'m [u8],
}

impl<'m, S> VerifyingSigBytes<'m, S> {
    pub fn new(candidates: S, signed_bytes: &'m [u8]) -> Self {
        Self {
            candidates,
            signed_bytes,
        }
    }
}

impl<S: PubKeyToSigBytes> PubKeyToSigBytes for VerifyingSigBytes<'_, S> {
    fn sig_bytes_for(&self, pub_key: &[u8]) -> Result<Option<Vec<u8>>, SigMapError> {
        Ok(self.candidate_sig_bytes_for(pub_key)?.into_iter().next())
    }

    fn candidate_sig_bytes_for(&self, pub_key: &[u8]) -> Result<Vec<Vec<u8>>, SigMapError> {
        let mut candidates = self.candidates.candidate_sig_bytes_for(pub_key)?;
        if let Some(signature_type) = SignatureType::of_public_key(pub_key) {
            let verified = candidates
                .iter()
                .position(|sig| signature_verifies(signature_type, pub_key, self.signed_bytes, sig));
            if let Some(i) = verified {
                candidates[..=i].rotate_right(1);
            }
        }
        Ok(candidates)
    }
}

// =============================================================================
// Providers
// =============================================================================

/// Every role reads the transaction's own signature map.
#[derive(Debug, Clone)]
pub struct DefaultSigBytesProvider {
    sig_map: SigMapPubKeyToSigBytes,
}

impl DefaultSigBytesProvider {
    /// Decode the accessor's signature map once.
    pub fn new(accessor: &SignedTxnAccessor) -> Self {
        Self {
            sig_map: SigMapPubKeyToSigBytes::from_bytes(accessor.sig_map_bytes()),
        }
    }
}

impl PubKeyToSigBytesProvider for DefaultSigBytesProvider {
    fn payer_sig_bytes_for(&self) -> Box<dyn PubKeyToSigBytes + '_> {
        Box::new(&self.sig_map)
    }

    fn other_parties_sig_bytes_for(&self) -> Box<dyn PubKeyToSigBytes + '_> {
        Box::new(&self.sig_map)
    }

    fn all_parties_sig_bytes_for(&self) -> Box<dyn PubKeyToSigBytes + '_> {
        Box::new(&self.sig_map)
    }
}

/// Signatures of a schedule transaction.
///
/// Every view prefers signatures that verify over the outer body, so a key
/// that also signed the scheduled operation is not shadowed. Other parties
/// may also be satisfied by signatures the schedule accumulated earlier,
/// after the map's own candidates.
#[derive(Debug, Clone)]
pub struct ScheduledSigBytesProvider {
    sig_map: SigMapPubKeyToSigBytes,
    accumulated: AccumulatedSigBytes,
    signed_bytes: Vec<u8>,
}

impl ScheduledSigBytesProvider {
    pub fn new<A>(accessor: &SignedTxnAccessor, accumulator: &A) -> Self
    where
        A: ScheduleSigAccumulator + ?Sized,
    {
        let signatures = match &accessor.body().data {
            TransactionData::ScheduleSign { schedule } => accumulator.signatures_for(schedule),
            _ => HashMap::new(),
        };
        Self::with_accumulated(accessor, signatures)
    }

    /// A provider that consults only the transaction's own map.
    pub fn without_accumulated(accessor: &SignedTxnAccessor) -> Self {
        Self::with_accumulated(accessor, HashMap::new())
    }

    fn with_accumulated(
        accessor: &SignedTxnAccessor,
        signatures: HashMap<Vec<u8>, Vec<u8>>,
    ) -> Self {
        Self {
            sig_map: SigMapPubKeyToSigBytes::from_bytes(accessor.sig_map_bytes()),
            accumulated: AccumulatedSigBytes::new(signatures),
            signed_bytes: accessor.signed_bytes().to_vec(),
        }
    }
}

impl PubKeyToSigBytesProvider for ScheduledSigBytesProvider {
    fn payer_sig_bytes_for(&self) -> Box<dyn PubKeyToSigBytes + '_> {
        Box::new(VerifyingSigBytes::new(&self.sig_map, &self.signed_bytes))
    }

    fn other_parties_sig_bytes_for(&self) -> Box<dyn PubKeyToSigBytes + '_> {
        Box::new(VerifyingSigBytes::new(
            ChainedSigBytes::new(&self.sig_map, &self.accumulated),
            &self.signed_bytes,
        ))
    }
}

/// The provider suited to the transaction's operation.
pub fn sig_bytes_provider_for<A>(
    accessor: &SignedTxnAccessor,
    accumulator: &A,
) -> Box<dyn PubKeyToSigBytesProvider>
where
    A: ScheduleSigAccumulator + ?Sized,
{
    if is_schedule_txn(accessor) {
        Box::new(ScheduledSigBytesProvider::new(accessor, accumulator))
    } else {
        Box::new(DefaultSigBytesProvider::new(accessor))
    }
}

/// The provider suited to the transaction's operation, ignoring any
/// accumulated schedule signatures.
pub fn unaccumulated_sig_bytes_provider_for(
    accessor: &SignedTxnAccessor,
) -> Box<dyn PubKeyToSigBytesProvider> {
    if is_schedule_txn(accessor) {
        Box::new(ScheduledSigBytesProvider::without_accumulated(accessor))
    } else {
        Box::new(DefaultSigBytesProvider::new(accessor))
    }
}

fn is_schedule_txn(accessor: &SignedTxnAccessor) -> bool {
    matches!(
        accessor.body().data,
        TransactionData::ScheduleCreate { .. } | TransactionData::ScheduleSign { .. }
    )
}
