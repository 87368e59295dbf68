//! Application Configuration
//!
//! Configuration for the ledger application layer.

use crate::domain::value_objects::Difficulty;
use crate::infra::kv_chain_store::DEFAULT_CHAIN_KEY;
use std::time::Duration;

/// Ledger application configuration
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Difficulty in leading zero hex characters
    pub difficulty: Difficulty,
    /// Nonce attempts per block before mining gives up
    pub max_mining_attempts: u64,
    /// Wall-clock budget per block
    pub mining_timeout: Duration,
    /// Re-mine attempts after losing the race for the chain tail
    pub max_commit_retries: u32,
    /// Key the chain is stored under
    pub chain_key: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::DEFAULT,
            max_mining_attempts: 50_000_000,
            mining_timeout: Duration::from_secs(10),
            max_commit_retries: 32,
            chain_key: DEFAULT_CHAIN_KEY.to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Default::default()
        }
    }

    pub fn mining_timeout_ms(&self) -> i64 {
        self.mining_timeout.as_millis() as i64
    }
}
