//! Block Miner
//!
//! Bounded nonce search. Pure and CPU-bound: run it on a blocking pool.

use crate::domain::entities::{Block, CertificatePayload};
use crate::domain::services::BlockHasher;
use crate::domain::value_objects::Difficulty;
use std::time::{Duration, Instant};

/// Attempts between wall-clock checks
const CLOCK_CHECK_INTERVAL: u64 = 4096;

/// Mining gave up before finding a nonce
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no nonce found within {attempts} attempts")]
pub struct MiningExhausted {
    pub attempts: u64,
}

impl From<MiningExhausted> for crate::error::LedgerError {
    fn from(err: MiningExhausted) -> Self {
        crate::error::LedgerError::MiningTimeout {
            attempts: err.attempts,
        }
    }
}

/// Proof-of-work search with an attempt and time budget
#[derive(Debug, Clone)]
pub struct BlockMiner {
    max_attempts: u64,
    timeout: Duration,
}

impl BlockMiner {
    pub fn new(max_attempts: u64, timeout: Duration) -> Self {
        Self {
            max_attempts,
            timeout,
        }
    }

    /// Find the first nonce from 0 whose hash meets `difficulty`
    pub fn mine(
        &self,
        index: u64,
        timestamp: i64,
        payload: CertificatePayload,
        previous_hash: String,
        difficulty: Difficulty,
    ) -> Result<Block, MiningExhausted> {
        let hasher = BlockHasher::new(index, timestamp, &payload, &previous_hash);
        let deadline = Instant::now() + self.timeout;

        let mut nonce: u64 = 0;
        while nonce < self.max_attempts {
            let hash = hasher.hash_with_nonce(nonce);
            if difficulty.is_met_by(&hash) {
                tracing::debug!(index = index, attempts = nonce + 1, "Block mined");
                return Ok(Block {
                    index,
                    timestamp,
                    certificate_data: payload,
                    previous_hash,
                    hash,
                    nonce,
                });
            }

            nonce += 1;
            if nonce % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                break;
            }
        }

        Err(MiningExhausted { attempts: nonce })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::recompute_hash;

    fn payload() -> CertificatePayload {
        CertificatePayload {
            user_id: "user-1".to_string(),
            module_id: "mod-1".to_string(),
            skill: "Testing".to_string(),
            level: "Intermediate".to_string(),
            score: Some(92.0),
            issued_at: "2026-03-01T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_mined_block_meets_difficulty() {
        let miner = BlockMiner::new(1_000_000, Duration::from_secs(10));
        let difficulty = Difficulty::new(3).unwrap();

        let block = miner
            .mine(5, 1_700_000_000_000, payload(), "abc".to_string(), difficulty)
            .unwrap();

        assert!(block.hash.starts_with("000"));
        assert_eq!(recompute_hash(&block), block.hash);
        assert_eq!(block.index, 5);
        assert_eq!(block.previous_hash, "abc");
    }

    #[test]
    fn test_mining_returns_first_valid_nonce() {
        let miner = BlockMiner::new(1_000_000, Duration::from_secs(10));
        let difficulty = Difficulty::new(2).unwrap();
        let block = miner
            .mine(1, 42, payload(), "prev".to_string(), difficulty)
            .unwrap();

        let hasher = BlockHasher::new(1, 42, &payload(), "prev");
        for nonce in 0..block.nonce {
            assert!(!difficulty.is_met_by(&hasher.hash_with_nonce(nonce)));
        }
    }

    #[test]
    fn test_mining_is_deterministic() {
        let miner = BlockMiner::new(1_000_000, Duration::from_secs(10));
        let a = miner
            .mine(1, 42, payload(), "prev".to_string(), Difficulty::DEFAULT)
            .unwrap();
        let b = miner
            .mine(1, 42, payload(), "prev".to_string(), Difficulty::DEFAULT)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_attempt_budget_exhausted() {
        let miner = BlockMiner::new(100, Duration::from_secs(10));
        let impossible = Difficulty::new(64).unwrap();

        let err = miner
            .mine(1, 42, payload(), "prev".to_string(), impossible)
            .unwrap_err();
        assert_eq!(err.attempts, 100);
    }

    #[test]
    fn test_time_budget_exhausted() {
        let miner = BlockMiner::new(u64::MAX, Duration::ZERO);
        let impossible = Difficulty::new(64).unwrap();

        let err = miner
            .mine(1, 42, payload(), "prev".to_string(), impossible)
            .unwrap_err();
        assert_eq!(err.attempts, CLOCK_CHECK_INTERVAL);
    }
}
