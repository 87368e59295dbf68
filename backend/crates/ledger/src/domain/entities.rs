//! Domain Entities
//!
//! Blocks, certificate payloads and the chain that links them.

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};

/// Sentinel written into every field of the genesis payload
pub const GENESIS_SENTINEL: &str = "genesis";

/// `previousHash` of the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Certificate facts bound into a block
///
/// Field order is part of the hash preimage; do not reorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePayload {
    pub user_id: String,
    pub module_id: String,
    pub skill: String,
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub issued_at: String,
}

impl CertificatePayload {
    /// Payload carried by the genesis block
    pub fn genesis() -> Self {
        Self {
            user_id: GENESIS_SENTINEL.to_string(),
            module_id: GENESIS_SENTINEL.to_string(),
            skill: GENESIS_SENTINEL.to_string(),
            level: GENESIS_SENTINEL.to_string(),
            score: None,
            issued_at: GENESIS_SENTINEL.to_string(),
        }
    }

    /// Compact JSON form used in the hash preimage
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(self).expect("certificate payload always serializes")
    }

    /// Reject payloads a caller should never be able to issue
    pub fn validate(&self) -> LedgerResult<()> {
        let required = [
            ("userId", &self.user_id),
            ("moduleId", &self.module_id),
            ("skill", &self.skill),
            ("level", &self.level),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(LedgerError::InvalidInput(format!("{name} must not be empty")));
            }
        }

        if let Some(score) = self.score {
            if !score.is_finite() {
                return Err(LedgerError::InvalidInput(
                    "score must be a finite number".to_string(),
                ));
            }
        }

        chrono::DateTime::parse_from_rfc3339(&self.issued_at).map_err(|e| {
            LedgerError::InvalidInput(format!("issuedAt must be an ISO-8601 timestamp: {e}"))
        })?;

        Ok(())
    }
}

/// One entry of the certificate chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub certificate_data: CertificatePayload,
    pub previous_hash: String,
    pub hash: String,
    pub nonce: u64,
}

impl Block {
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

/// Ordered, non-empty sequence of blocks starting at genesis
///
/// Serialized as a bare JSON array of blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
#[allow(clippy::len_without_is_empty)]
pub struct Chain(Vec<Block>);

impl Chain {
    /// Build a chain from decoded blocks
    pub fn from_blocks(blocks: Vec<Block>) -> LedgerResult<Self> {
        if blocks.is_empty() {
            return Err(LedgerError::StorageCorrupt(
                "chain contains no blocks".to_string(),
            ));
        }
        Ok(Self(blocks))
    }

    /// Chain holding only a genesis block
    pub fn with_genesis(genesis: Block) -> Self {
        Self(vec![genesis])
    }

    /// Decode the stored JSON form
    pub fn decode(raw: &str) -> LedgerResult<Self> {
        let blocks: Vec<Block> = serde_json::from_str(raw)?;
        Self::from_blocks(blocks)
    }

    /// Encode into the stored JSON form
    pub fn encode(&self) -> LedgerResult<String> {
        serde_json::to_string(&self.0).map_err(|e| LedgerError::StorageCorrupt(e.to_string()))
    }

    pub fn genesis(&self) -> &Block {
        &self.0[0]
    }

    pub fn tip(&self) -> &Block {
        &self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.0.iter()
    }

    pub fn find_by_hash(&self, hash: &str) -> Option<&Block> {
        self.0.iter().find(|block| block.hash == hash)
    }

    /// Append a block; callers are responsible for linking it to the tip
    pub fn push(&mut self, block: Block) {
        self.0.push(block);
    }

    /// Mutable access for administrative repair and test fixtures
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.0
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
