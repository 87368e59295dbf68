//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entities::{Block, Chain};
use crate::domain::value_objects::ChainTip;
use crate::error::LedgerResult;

/// External key-value collaborator
#[trait_variant::make(KeyValueStore: Send)]
pub trait LocalKeyValueStore {
    /// Read a value; `None` when the key has never been written
    async fn get(&self, key: &str) -> LedgerResult<Option<String>>;

    /// Unconditionally overwrite a value
    async fn set(&self, key: &str, value: &str) -> LedgerResult<()>;

    /// Write `value` only if the current value equals `expected`
    /// (`None` meaning the key is absent). Returns whether it wrote.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> LedgerResult<bool>;
}

/// What the store currently holds
#[derive(Debug, Clone, PartialEq)]
pub enum ChainSnapshot {
    /// Nothing stored; the ledger needs bootstrapping
    Empty,
    Loaded(Chain),
}

/// Result of an append attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    Committed,
    /// Someone else moved the tail first; nothing was written
    Conflict,
}

/// Chain persistence with an atomic append contract
#[trait_variant::make(ChainStore: Send)]
pub trait LocalChainStore {
    /// Load the current chain
    async fn get(&self) -> LedgerResult<ChainSnapshot>;

    /// Overwrite the stored chain. Administrative use only.
    async fn set(&self, chain: &Chain) -> LedgerResult<()>;

    /// Store a genesis-only chain if nothing is stored yet
    async fn initialize(&self, genesis: &Block) -> LedgerResult<bool>;

    /// Append `block` if the stored tail still equals `expected_tip`
    async fn append(&self, expected_tip: &ChainTip, block: &Block) -> LedgerResult<AppendOutcome>;
}
