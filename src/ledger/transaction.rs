use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::crypto::{verify_signature, Address, CryptoError, DigitalSignature, Keypair};

/// Errors that can occur during transaction operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Signing key does not match the sender address")]
    KeyMismatch,

    #[error("Transaction is not signed")]
    NotSigned,

    #[error("Reward transactions do not carry a signature")]
    RewardNotSignable,

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// A value-transfer record.
///
/// A `Transfer` moves value between two addresses and must be signed by the
/// key behind `from` before it can enter a ledger. A `Reward` is minted by
/// the ledger itself while mining and has no sender, so it is valid without
/// a signature.
///
/// A transfer is signed at most once; the signature covers [`hash`] over the
/// fields as they were at signing time, so any later mutation of `from`,
/// `to` or `amount` makes [`is_valid`] report `false` rather than being
/// prevented up front.
///
/// [`hash`]: Transaction::hash
/// [`is_valid`]: Transaction::is_valid
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transaction {
    Reward {
        to: Address,
        amount: u64,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        signature: Option<DigitalSignature>,
    },
}

impl Transaction {
    /// Creates an unsigned transfer
    pub fn transfer(from: Address, to: Address, amount: u64) -> Self {
        Transaction::Transfer {
            from,
            to,
            amount,
            signature: None,
        }
    }

    /// Creates a reward crediting `to`
    pub fn reward(to: Address, amount: u64) -> Self {
        Transaction::Reward { to, amount }
    }

    /// Computes the signing digest over sender, recipient and amount.
    ///
    /// The payload is a JSON object with sorted keys (`amount`, `from`,
    /// `to`), so the byte layout is fixed regardless of how the transaction
    /// was built. Rewards hash with a null sender. The signature is not
    /// part of this digest.
    pub fn hash(&self) -> String {
        let payload = match self {
            Transaction::Reward { to, amount } => serde_json::json!({
                "from": serde_json::Value::Null,
                "to": to,
                "amount": amount,
            }),
            Transaction::Transfer {
                from, to, amount, ..
            } => serde_json::json!({
                "from": from,
                "to": to,
                "amount": amount,
            }),
        };

        hex::encode(Sha256::digest(payload.to_string().as_bytes()))
    }

    /// Signs the transfer with the given key pair.
    ///
    /// Fails with [`TransactionError::KeyMismatch`] if the key pair's
    /// address is not the sender; nothing is stored in that case.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<(), TransactionError> {
        let digest = self.hash();

        match self {
            Transaction::Reward { .. } => Err(TransactionError::RewardNotSignable),
            Transaction::Transfer {
                from, signature, ..
            } => {
                if keypair.address() != from {
                    return Err(TransactionError::KeyMismatch);
                }

                *signature = Some(keypair.sign(digest.as_bytes()));
                Ok(())
            }
        }
    }

    /// Checks the transaction's signature.
    ///
    /// Rewards are always valid. An unsigned transfer is an error; a stored
    /// signature that fails to verify against the current field values is a
    /// normal `Ok(false)`.
    pub fn is_valid(&self) -> Result<bool, TransactionError> {
        match self {
            Transaction::Reward { .. } => Ok(true),
            Transaction::Transfer {
                from, signature, ..
            } => {
                let signature = signature.as_ref().ok_or(TransactionError::NotSigned)?;
                let public_key = from.to_public_key()?;

                Ok(verify_signature(
                    self.hash().as_bytes(),
                    signature,
                    &public_key,
                )?)
            }
        }
    }

    /// The recipient of the transferred or minted amount
    pub fn to(&self) -> &Address {
        match self {
            Transaction::Reward { to, .. } => to,
            Transaction::Transfer { to, .. } => to,
        }
    }

    /// The transferred or minted amount
    pub fn amount(&self) -> u64 {
        match self {
            Transaction::Reward { amount, .. } => *amount,
            Transaction::Transfer { amount, .. } => *amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_transfer(amount: u64) -> (Transaction, Keypair) {
        let sender = Keypair::generate();
        let recipient = Keypair::generate();

        let mut tx = Transaction::transfer(
            sender.address().clone(),
            recipient.address().clone(),
            amount,
        );
        tx.sign(&sender).unwrap();

        (tx, sender)
    }

    #[test]
    fn test_hash_is_deterministic() {
        let (tx, _) = signed_transfer(10);

        assert_eq!(tx.hash(), tx.hash());
        assert_eq!(tx.hash().len(), 64); // SHA-256 in hex
    }

    #[test]
    fn test_hash_covers_amount() {
        let sender = Keypair::generate();
        let recipient = Keypair::generate();

        let a = Transaction::transfer(sender.address().clone(), recipient.address().clone(), 10);
        let b = Transaction::transfer(sender.address().clone(), recipient.address().clone(), 11);

        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_signature_excluded_from_hash() {
        let sender = Keypair::generate();
        let recipient = Keypair::generate();

        let mut tx =
            Transaction::transfer(sender.address().clone(), recipient.address().clone(), 10);
        let before = tx.hash();
        tx.sign(&sender).unwrap();

        assert_eq!(tx.hash(), before);
    }

    #[test]
    fn test_sign_and_validate() {
        let (tx, _) = signed_transfer(10);

        assert!(tx.is_valid().unwrap());
    }

    #[test]
    fn test_tampered_amount_invalidates() {
        let (mut tx, _) = signed_transfer(10);

        if let Transaction::Transfer { amount, .. } = &mut tx {
            *amount = 9_999;
        }

        assert!(!tx.is_valid().unwrap());
    }

    #[test]
    fn test_tampered_recipient_invalidates() {
        let (mut tx, _) = signed_transfer(10);
        let thief = Keypair::generate();

        if let Transaction::Transfer { to, .. } = &mut tx {
            *to = thief.address().clone();
        }

        assert!(!tx.is_valid().unwrap());
    }

    #[test]
    fn test_tampered_sender_invalidates() {
        let (mut tx, _) = signed_transfer(10);
        let other = Keypair::generate();

        if let Transaction::Transfer { from, .. } = &mut tx {
            *from = other.address().clone();
        }

        assert!(!tx.is_valid().unwrap());
    }

    #[test]
    fn test_signing_for_another_address_fails() {
        let sender = Keypair::generate();
        let recipient = Keypair::generate();
        let intruder = Keypair::generate();

        let mut tx =
            Transaction::transfer(sender.address().clone(), recipient.address().clone(), 10);

        let result = tx.sign(&intruder);
        assert!(matches!(result, Err(TransactionError::KeyMismatch)));

        // nothing was stored
        if let Transaction::Transfer { signature, .. } = &tx {
            assert!(signature.is_none());
        }
        assert!(matches!(tx.is_valid(), Err(TransactionError::NotSigned)));
    }

    #[test]
    fn test_unsigned_transfer_is_an_error() {
        let sender = Keypair::generate();
        let recipient = Keypair::generate();

        let tx = Transaction::transfer(sender.address().clone(), recipient.address().clone(), 10);

        assert!(matches!(tx.is_valid(), Err(TransactionError::NotSigned)));
    }

    #[test]
    fn test_reward_is_valid_without_signature() {
        let miner = Keypair::generate();

        let tx = Transaction::reward(miner.address().clone(), 100);

        assert!(tx.is_valid().unwrap());
        assert_eq!(tx.amount(), 100);
        assert_eq!(tx.to(), miner.address());
    }

    #[test]
    fn test_reward_cannot_be_signed() {
        let miner = Keypair::generate();

        let mut tx = Transaction::reward(miner.address().clone(), 100);

        assert!(matches!(
            tx.sign(&miner),
            Err(TransactionError::RewardNotSignable)
        ));
    }
}
