use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use std::sync::atomic::{AtomicBool, Ordering};

use super::transaction::Transaction;

/// An ordered batch of transactions chained to its predecessor by hash.
///
/// `hash` is stamped from [`calculate_hash`] at construction and re-stamped
/// by mining; validation recomputes it, so tampering with any field after
/// the block entered a chain is detectable but not prevented.
///
/// [`calculate_hash`]: Block::calculate_hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Milliseconds since the Unix epoch at construction time
    pub timestamp: i64,

    /// Transactions included in this block
    pub transactions: Vec<Transaction>,

    /// Hex digest of the preceding block; the genesis block carries a
    /// sentinel value instead
    pub previous_hash: String,

    /// Proof-of-work counter
    pub nonce: u64,

    /// Hex digest of the block contents
    pub hash: String,
}

impl Block {
    /// Creates a block and stamps its initial hash
    pub fn new(timestamp: i64, transactions: Vec<Transaction>, previous_hash: String) -> Self {
        let mut block = Block {
            timestamp,
            transactions,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.calculate_hash();

        block
    }

    /// Creates a block stamped with the current time
    pub fn now(transactions: Vec<Transaction>, previous_hash: String) -> Self {
        Self::new(Utc::now().timestamp_millis(), transactions, previous_hash)
    }

    /// Computes the SHA-256 hex digest of the block contents.
    ///
    /// The payload is a JSON object with sorted keys over `previous_hash`,
    /// `timestamp`, the serialized transaction list and `nonce`; two blocks
    /// holding semantically equal transactions always hash identically.
    pub fn calculate_hash(&self) -> String {
        let payload = serde_json::json!({
            "previous_hash": self.previous_hash,
            "timestamp": self.timestamp,
            "transactions": self.transactions,
            "nonce": self.nonce,
        });

        hex::encode(Sha256::digest(payload.to_string().as_bytes()))
    }

    /// Searches for a nonce whose hash starts with `difficulty` zero hex
    /// digits.
    ///
    /// Unbounded and CPU-bound: expected cost grows by a factor of 16 per
    /// difficulty step, and the search blocks until it succeeds. `nonce`
    /// and `hash` are updated in place as it runs.
    pub fn mine(&mut self, difficulty: usize) {
        let never = AtomicBool::new(false);
        self.mine_with_stop(difficulty, &never);
    }

    /// The nonce search with a stop flag checked between attempts.
    ///
    /// Returns `false` if `stop` was raised before a qualifying hash was
    /// found; the block keeps whatever nonce/hash the search had reached.
    pub fn mine_with_stop(&mut self, difficulty: usize, stop: &AtomicBool) -> bool {
        let target = "0".repeat(difficulty);

        while !self.hash.starts_with(&target) {
            if stop.load(Ordering::Relaxed) {
                return false;
            }

            self.nonce += 1;
            self.hash = self.calculate_hash();
        }

        info!("Block mined: {}", self.hash);
        true
    }

    /// True iff every contained transaction validates; a single invalid or
    /// unsigned transaction invalidates the whole block
    pub fn has_valid_transactions(&self) -> bool {
        self.transactions
            .iter()
            .all(|tx| matches!(tx.is_valid(), Ok(true)))
    }
}
