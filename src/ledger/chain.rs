use log::info;
use thiserror::Error;

use std::mem;

use super::block::Block;
use super::config::ChainConfig;
use super::crypto::Address;
use super::transaction::{Transaction, TransactionError};

/// Errors that can occur when submitting a transaction to a ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Transaction must name both a sender and a recipient")]
    MissingAddress,

    #[error("Cannot queue an invalid transaction")]
    InvalidTransaction,

    #[error("Reward transactions are minted while mining, not submitted")]
    UnsolicitedReward,

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),
}

/// An append-only chain of blocks with a pending-transaction pool.
///
/// The ledger is the single authority over its chain: blocks are only ever
/// appended by [`mine_pending_transactions`], and nothing is deleted,
/// truncated or reorganized. Tampering with committed blocks from outside
/// is the threat model [`is_valid`] defends against, so stored blocks stay
/// reachable (and mutable through [`Block`]'s public fields) rather than
/// being sealed off.
///
/// [`mine_pending_transactions`]: Ledger::mine_pending_transactions
/// [`is_valid`]: Ledger::is_valid
#[derive(Debug, Clone)]
pub struct Ledger {
    /// The chain of blocks; index 0 is the genesis block
    chain: Vec<Block>,

    /// Transactions waiting to be included in the next block
    pending_transactions: Vec<Transaction>,

    /// Chain parameters fixed at construction
    config: ChainConfig,
}

impl Ledger {
    /// Creates a ledger seeded with the genesis block described by `config`.
    ///
    /// The genesis block is not mined: it carries the configured sentinel
    /// `previous_hash` and whatever hash its contents produce, and
    /// [`is_valid`](Ledger::is_valid) never re-checks it.
    pub fn new(config: ChainConfig) -> Self {
        let genesis = Block::new(
            config.genesis_timestamp,
            Vec::new(),
            config.genesis_previous_hash.clone(),
        );

        Ledger {
            chain: vec![genesis],
            pending_transactions: Vec::new(),
            config,
        }
    }

    /// The last block in the chain
    pub fn latest_block(&self) -> &Block {
        self.chain
            .last()
            .expect("chain always holds at least the genesis block")
    }

    /// All blocks in chain order
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Transactions queued for the next mining round
    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    /// The parameters this ledger was built with
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Queues a signed transfer for the next mining round.
    ///
    /// Rewards cannot be submitted (the ledger mints them itself), both
    /// addresses must be present, and the signature must verify. On any
    /// failure the pending pool is left untouched.
    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        match &transaction {
            Transaction::Reward { .. } => return Err(LedgerError::UnsolicitedReward),
            Transaction::Transfer { from, to, .. } => {
                if from.as_str().is_empty() || to.as_str().is_empty() {
                    return Err(LedgerError::MissingAddress);
                }
            }
        }

        if !transaction.is_valid()? {
            return Err(LedgerError::InvalidTransaction);
        }

        self.pending_transactions.push(transaction);
        Ok(())
    }

    /// Seals the pending pool into a new block and appends it.
    ///
    /// A reward crediting `reward_address` joins the pool first, so it
    /// rides in the very block it pays for; the entire pool is then drained
    /// into a block chained to the current tip, mined at the configured
    /// difficulty and appended. Returns the appended block.
    pub fn mine_pending_transactions(&mut self, reward_address: &Address) -> &Block {
        self.pending_transactions.push(Transaction::reward(
            reward_address.clone(),
            self.config.mining_reward,
        ));

        let transactions = mem::take(&mut self.pending_transactions);
        let mut block = Block::now(transactions, self.latest_block().hash.clone());
        block.mine(self.config.difficulty);

        self.chain.push(block);
        info!("Block appended, chain height is now {}", self.chain.len());

        self.latest_block()
    }

    /// Derives the balance of `address` by replaying the full history.
    ///
    /// Every transaction in every block is visited in chain order: a
    /// transfer debits its sender and credits its recipient, a reward only
    /// credits. Nothing is cached, so the cost is proportional to the total
    /// transaction count on every call. Balances can go negative; there is
    /// no funds check at submission time.
    pub fn balance_of(&self, address: &Address) -> i64 {
        let mut balance: i64 = 0;

        for block in &self.chain {
            for transaction in &block.transactions {
                match transaction {
                    Transaction::Reward { to, amount } => {
                        if to == address {
                            balance += *amount as i64;
                        }
                    }
                    Transaction::Transfer {
                        from, to, amount, ..
                    } => {
                        if from == address {
                            balance -= *amount as i64;
                        }
                        if to == address {
                            balance += *amount as i64;
                        }
                    }
                }
            }
        }

        balance
    }

    /// Checks the integrity of the whole chain.
    ///
    /// For every block after genesis: all contained transactions must
    /// verify, the stored hash must equal the recomputed hash, and
    /// `previous_hash` must equal the *recomputed* hash of the predecessor,
    /// so a forged stored hash on the predecessor is still caught. Returns
    /// false at the first violation. A tampered chain is reported, never
    /// repaired or rejected; it stays fully queryable.
    pub fn is_valid(&self) -> bool {
        for i in 1..self.chain.len() {
            let current = &self.chain[i];
            let previous = &self.chain[i - 1];

            if !current.has_valid_transactions() {
                return false;
            }

            if current.hash != current.calculate_hash() {
                return false;
            }

            if current.previous_hash != previous.calculate_hash() {
                return false;
            }
        }

        true
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}
