//! # Signed Transaction Accessor
//!
//! Read-only view of one incoming transaction: the parsed body, the exact
//! bytes that were signed, and the still-encoded signature map.

use shared_types::{
    AccountId, FunctionType, SignedTransaction, TransactionBody, TransactionError,
};

/// Parsed view of a signed transaction.
///
/// The signature map is deliberately left encoded; it is decoded by the
/// signature-bytes provider, whose failure aborts record creation.
#[derive(Debug, Clone)]
pub struct SignedTxnAccessor {
    signed: SignedTransaction,
    body: TransactionBody,
}

impl SignedTxnAccessor {
    /// Parse the body of a signed transaction.
    pub fn new(signed: SignedTransaction) -> Result<Self, TransactionError> {
        let body = TransactionBody::from_bytes(&signed.body_bytes)?;
        Ok(Self { signed, body })
    }

    /// Parse a transaction from its wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        Self::new(SignedTransaction::from_bytes(bytes)?)
    }

    /// The parsed body.
    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    /// The canonical signed bytes.
    pub fn signed_bytes(&self) -> &[u8] {
        &self.signed.body_bytes
    }

    /// The encoded signature map.
    pub fn sig_map_bytes(&self) -> &[u8] {
        &self.signed.sig_map_bytes
    }

    /// The designated payer.
    pub fn payer(&self) -> AccountId {
        self.body.payer()
    }

    /// The operation type.
    pub fn function(&self) -> FunctionType {
        self.body.function()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Key, SignatureMap, TransactionData, TransactionId, MAX_KEY_DEPTH};

    #[test]
    fn test_accessor_exposes_signed_bytes_verbatim() {
        let body = TransactionBody {
            transaction_id: TransactionId::new(AccountId::new(1001), 42),
            node_account: None,
            memo: String::new(),
            data: TransactionData::Freeze { start_secs: 7 },
        };
        let signed = SignedTransaction::new(&body, &SignatureMap::default()).unwrap();
        let accessor = SignedTxnAccessor::from_bytes(&signed.to_bytes().unwrap()).unwrap();

        assert_eq!(accessor.signed_bytes(), body.to_bytes().unwrap().as_slice());
        assert_eq!(accessor.payer(), AccountId::new(1001));
        assert_eq!(accessor.function(), FunctionType::Freeze);
    }

    #[test]
    fn test_malformed_body_rejected() {
        let signed = SignedTransaction {
            body_bytes: vec![0xFF; 3],
            sig_map_bytes: vec![],
        };
        assert!(matches!(
            SignedTxnAccessor::new(signed),
            Err(TransactionError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_sig_map_not_decoded_eagerly() {
        let body = TransactionBody {
            transaction_id: TransactionId::new(AccountId::new(2), 0),
            node_account: None,
            memo: String::new(),
            data: TransactionData::Freeze { start_secs: 0 },
        };
        let signed = SignedTransaction {
            body_bytes: body.to_bytes().unwrap(),
            sig_map_bytes: vec![0xFF],
        };
        let accessor = SignedTxnAccessor::new(signed).unwrap();
        assert_eq!(accessor.sig_map_bytes(), &[0xFF]);
    }

    #[test]
    fn test_body_with_too_deep_key_rejected() {
        let key = (0..MAX_KEY_DEPTH).fold(Key::Ed25519(vec![5; 32]), |inner, _| {
            Key::KeyList(vec![inner])
        });
        let body = TransactionBody {
            transaction_id: TransactionId::new(AccountId::new(2), 0),
            node_account: None,
            memo: String::new(),
            data: TransactionData::ConsensusCreateTopic {
                admin_key: None,
                submit_key: Some(key),
                auto_renew_account: None,
            },
        };
        let signed = SignedTransaction::new(&body, &SignatureMap::default()).unwrap();

        assert!(matches!(
            SignedTxnAccessor::from_bytes(&signed.to_bytes().unwrap()),
            Err(TransactionError::KeyTooDeep { .. })
        ));
    }
}
