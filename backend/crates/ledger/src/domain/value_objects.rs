//! Domain Value Objects
//!
//! Immutable value types for the ledger domain.

use crate::domain::entities::Block;

/// Proof-of-work difficulty in leading zero hex characters
///
/// Each extra character multiplies the expected mining work by 16. The
/// default of 2 (~256 attempts) is tamper evidence, not tamper resistance:
/// the hash links are what make edits detectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const DEFAULT: Difficulty = Difficulty(2);
    pub const MIN: u8 = 1;
    /// Length of a hex-encoded SHA-256 digest
    pub const MAX: u8 = 64;

    pub fn new(zeros: u8) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&zeros) {
            Some(Self(zeros))
        } else {
            None
        }
    }

    pub fn zeros(&self) -> u8 {
        self.0
    }

    /// Check whether a hex hash meets this difficulty
    pub fn is_met_by(&self, hash: &str) -> bool {
        let zeros = self.0 as usize;
        hash.len() >= zeros && hash.bytes().take(zeros).all(|b| b == b'0')
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Position and hash of the last block a writer observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTip {
    pub index: u64,
    pub hash: String,
}

impl ChainTip {
    pub fn of(block: &Block) -> Self {
        Self {
            index: block.index,
            hash: block.hash.clone(),
        }
    }

    pub fn matches(&self, block: &Block) -> bool {
        self.index == block.index && self.hash == block.hash
    }
}
