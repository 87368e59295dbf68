//! Chain Validator
//!
//! Recomputes hashes and checks links. Pure functions over a loaded chain.

use crate::domain::entities::{Block, CertificatePayload, Chain, GENESIS_PREVIOUS_HASH};
use crate::domain::services::recompute_hash;
use crate::domain::value_objects::Difficulty;
use serde::Serialize;

/// Result of checking a single certificate hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    NotFound,
    /// The target block's own fields no longer match its hash
    Tampered,
    /// A block before the target fails hash recomputation
    ChainCompromised { index: u64 },
    /// A block before the target does not link to its predecessor
    ChainLinkBroken { index: u64 },
}

impl VerificationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationOutcome::Verified)
    }

    pub fn message(&self) -> String {
        match self {
            VerificationOutcome::Verified => "Certificate verified successfully".to_string(),
            VerificationOutcome::NotFound => "Certificate not found in blockchain".to_string(),
            VerificationOutcome::Tampered => "Certificate data has been tampered with".to_string(),
            VerificationOutcome::ChainCompromised { index } => {
                format!("Blockchain compromised at block {index}")
            }
            VerificationOutcome::ChainLinkBroken { index } => {
                format!("Blockchain link broken at block {index}")
            }
        }
    }
}

/// Verification result handed back to callers
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub outcome: VerificationOutcome,
    /// The block whose hash matched, if any
    pub block: Option<Block>,
}

impl VerificationReport {
    pub fn is_valid(&self) -> bool {
        self.outcome.is_valid()
    }

    pub fn message(&self) -> String {
        self.outcome.message()
    }
}

/// Full audit result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAudit {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub length: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ChainValidator {
    difficulty: Difficulty,
}

impl ChainValidator {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    pub fn recompute_hash(block: &Block) -> String {
        recompute_hash(block)
    }

    /// Verify one certificate: the target itself, then every block up to it
    pub fn verify(&self, chain: &Chain, target_hash: &str) -> VerificationReport {
        let Some(position) = chain.iter().position(|b| b.hash == target_hash) else {
            return VerificationReport {
                outcome: VerificationOutcome::NotFound,
                block: None,
            };
        };

        let blocks = chain.blocks();
        let target = &blocks[position];
        let outcome = if recompute_hash(target) != target.hash {
            VerificationOutcome::Tampered
        } else {
            Self::check_prefix(&blocks[..=position])
        };

        if !outcome.is_valid() {
            tracing::warn!(
                hash = %target_hash,
                index = target.index,
                outcome = %outcome.message(),
                "Certificate failed verification"
            );
        }

        VerificationReport {
            outcome,
            block: Some(target.clone()),
        }
    }

    /// First link or hash failure in `blocks[1..]`, by position.
    /// Link before hash: a rewritten `previousHash` reports a broken link.
    fn check_prefix(blocks: &[Block]) -> VerificationOutcome {
        for i in 1..blocks.len() {
            let index = i as u64;
            if blocks[i].previous_hash != blocks[i - 1].hash {
                return VerificationOutcome::ChainLinkBroken { index };
            }
            if recompute_hash(&blocks[i]) != blocks[i].hash {
                return VerificationOutcome::ChainCompromised { index };
            }
        }
        VerificationOutcome::Verified
    }

    /// Audit the whole chain, collecting every violation
    pub fn validate_chain(&self, chain: &Chain) -> ChainAudit {
        let mut errors = Vec::new();
        let blocks = chain.blocks();

        for (i, block) in blocks.iter().enumerate() {
            if recompute_hash(block) != block.hash {
                errors.push(format!("Block {i} has an invalid hash"));
            }
            if !self.difficulty.is_met_by(&block.hash) {
                errors.push(format!(
                    "Block {i} does not meet difficulty {}",
                    self.difficulty.zeros()
                ));
            }

            if i == 0 {
                if block.index != 0 {
                    errors.push(format!("Genesis block has index {}", block.index));
                }
                if block.previous_hash != GENESIS_PREVIOUS_HASH {
                    errors.push(format!(
                        "Genesis block has previous hash {}",
                        block.previous_hash
                    ));
                }
                if block.certificate_data != CertificatePayload::genesis() {
                    errors.push("Genesis block carries a certificate payload".to_string());
                }
                continue;
            }

            let previous = &blocks[i - 1];
            if block.previous_hash != previous.hash {
                errors.push(format!("Block {i} has an invalid previous hash link"));
            }
            if previous.index.checked_add(1) != Some(block.index) {
                errors.push(format!(
                    "Block {i} has index {} but follows index {}",
                    block.index, previous.index
                ));
            }
        }

        ChainAudit {
            is_valid: errors.is_empty(),
            errors,
            length: blocks.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::miner::BlockMiner;
    use std::time::Duration;

    fn payload(user: &str, module: &str) -> CertificatePayload {
        CertificatePayload {
            user_id: user.to_string(),
            module_id: module.to_string(),
            skill: "Rust".to_string(),
            level: "Advanced".to_string(),
            score: Some(90.0),
            issued_at: "2026-02-02T09:30:00Z".to_string(),
        }
    }

    fn build_chain(len: usize) -> Chain {
        let miner = BlockMiner::new(1_000_000, Duration::from_secs(10));
        let genesis = miner
            .mine(
                0,
                1_000,
                CertificatePayload::genesis(),
                GENESIS_PREVIOUS_HASH.to_string(),
                Difficulty::DEFAULT,
            )
            .unwrap();
        let mut chain = Chain::with_genesis(genesis);
        for i in 1..len as u64 {
            let tip = chain.tip().clone();
            let block = miner
                .mine(
                    i,
                    1_000 + i as i64,
                    payload("user", &format!("module-{i}")),
                    tip.hash,
                    Difficulty::DEFAULT,
                )
                .unwrap();
            chain.push(block);
        }
        chain
    }

    fn validator() -> ChainValidator {
        ChainValidator::new(Difficulty::DEFAULT)
    }

    #[test]
    fn test_verify_valid_certificate() {
        let chain = build_chain(4);
        let target = chain.blocks()[2].hash.clone();

        let report = validator().verify(&chain, &target);
        assert!(report.is_valid());
        assert_eq!(report.message(), "Certificate verified successfully");
        assert_eq!(report.block.map(|b| b.index), Some(2));
    }

    #[test]
    fn test_verify_unknown_hash() {
        let chain = build_chain(2);
        let report = validator().verify(&chain, "not-a-real-hash");
        assert!(!report.is_valid());
        assert_eq!(report.outcome, VerificationOutcome::NotFound);
        assert_eq!(report.message(), "Certificate not found in blockchain");
        assert!(report.block.is_none());
    }

    #[test]
    fn test_verify_detects_tampered_target() {
        let mut chain = build_chain(3);
        chain.blocks_mut()[2].certificate_data.level = "Expert".to_string();
        let target = chain.blocks()[2].hash.clone();

        let report = validator().verify(&chain, &target);
        assert_eq!(report.outcome, VerificationOutcome::Tampered);
        assert!(report.message().contains("tampered"));
        assert!(report.block.is_some());
    }

    #[test]
    fn test_verify_detects_compromised_prefix() {
        let mut chain = build_chain(4);
        chain.blocks_mut()[1].certificate_data.score = Some(100.0);
        let target = chain.blocks()[3].hash.clone();

        let report = validator().verify(&chain, &target);
        assert_eq!(
            report.outcome,
            VerificationOutcome::ChainCompromised { index: 1 }
        );
        assert_eq!(report.message(), "Blockchain compromised at block 1");
    }

    #[test]
    fn test_verify_ignores_damage_after_target() {
        let mut chain = build_chain(4);
        chain.blocks_mut()[3].nonce += 1;
        let target = chain.blocks()[2].hash.clone();

        assert!(validator().verify(&chain, &target).is_valid());
    }

    #[test]
    fn test_verify_detects_broken_link() {
        let mut chain = build_chain(4);
        // Re-mine block 2 onto a foreign parent so its own hash stays valid
        let miner = BlockMiner::new(1_000_000, Duration::from_secs(10));
        let original = chain.blocks()[2].clone();
        let relinked = miner
            .mine(
                original.index,
                original.timestamp,
                original.certificate_data,
                "f".repeat(64),
                Difficulty::DEFAULT,
            )
            .unwrap();
        chain.blocks_mut()[2] = relinked.clone();

        let report = validator().verify(&chain, &relinked.hash);
        assert_eq!(
            report.outcome,
            VerificationOutcome::ChainLinkBroken { index: 2 }
        );
        assert_eq!(report.message(), "Blockchain link broken at block 2");
    }

    #[test]
    fn test_verify_genesis() {
        let chain = build_chain(1);
        let hash = chain.genesis().hash.clone();
        assert!(validator().verify(&chain, &hash).is_valid());
    }

    #[test]
    fn test_validate_clean_chain() {
        let chain = build_chain(5);
        let audit = validator().validate_chain(&chain);
        assert!(audit.is_valid);
        assert!(audit.errors.is_empty());
        assert_eq!(audit.length, 5);
    }

    #[test]
    fn test_validate_collects_every_violation() {
        let mut chain = build_chain(5);
        chain.blocks_mut()[1].certificate_data.user_id = "mallory".to_string();
        chain.blocks_mut()[3].previous_hash = "0".repeat(64);

        let audit = validator().validate_chain(&chain);
        assert!(!audit.is_valid);
        assert!(audit.errors.iter().any(|e| e == "Block 1 has an invalid hash"));
        assert!(audit.errors.iter().any(|e| e == "Block 3 has an invalid hash"));
        assert!(
            audit
                .errors
                .iter()
                .any(|e| e == "Block 3 has an invalid previous hash link")
        );
    }

    #[test]
    fn test_validate_rejects_certificate_in_genesis_slot() {
        let chain = build_chain(3);
        let miner = BlockMiner::new(1_000_000, Duration::from_secs(10));
        let impostor = miner
            .mine(
                0,
                1_000,
                payload("mallory", "module-0"),
                "ab".repeat(32),
                Difficulty::DEFAULT,
            )
            .unwrap();
        let mut blocks = chain.into_blocks();
        blocks[0] = impostor.clone();
        blocks[1] = miner
            .mine(
                1,
                1_001,
                blocks[1].certificate_data.clone(),
                impostor.hash,
                Difficulty::DEFAULT,
            )
            .unwrap();
        let chain = Chain::from_blocks(blocks).unwrap();

        let audit = validator().validate_chain(&chain);
        assert!(!audit.is_valid);
        assert_eq!(
            audit.errors,
            vec![
                format!("Genesis block has previous hash {}", "ab".repeat(32)),
                "Genesis block carries a certificate payload".to_string(),
                "Block 2 has an invalid previous hash link".to_string(),
            ]
        );
    }

    #[test]
    fn test_validate_reports_index_gap() {
        let mut chain = build_chain(3);
        chain.blocks_mut()[2].index = 7;

        let audit = validator().validate_chain(&chain);
        assert!(
            audit
                .errors
                .iter()
                .any(|e| e == "Block 2 has index 7 but follows index 1")
        );
    }

    #[test]
    fn test_validate_checks_difficulty() {
        let chain = build_chain(3);
        let strict = ChainValidator::new(Difficulty::new(64).unwrap());

        let audit = strict.validate_chain(&chain);
        assert!(!audit.is_valid);
        assert!(
            audit
                .errors
                .iter()
                .any(|e| e == "Block 0 does not meet difficulty 64")
        );
    }
}
