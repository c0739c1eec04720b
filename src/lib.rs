//! minichain - a minimal proof-of-work ledger with signed transfers
//!
//! The crate is a single in-process ledger engine:
//!
//! - [`ledger::transaction`] - signed value-transfer records
//! - [`ledger::block`] - transaction batches sealed by a nonce search
//! - [`ledger::chain`] - the append-only chain, pending pool, validation
//!   and balance replay
//! - [`ledger::crypto`] - ed25519 key pairs, addresses and signatures
//! - [`ledger::config`] - tunable chain parameters
//!
//! There is no networking, persistence or consensus layer; a [`Ledger`]
//! is the single authority over its own chain.

#![forbid(unsafe_code)]

pub mod ledger;

pub use ledger::{
    Address, Block, ChainConfig, DigitalSignature, Keypair, Ledger, LedgerError, Transaction,
    TransactionError,
};
