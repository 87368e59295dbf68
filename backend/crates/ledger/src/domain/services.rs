//! Domain Services
//!
//! Block hashing shared by the miner and the validator.

use crate::domain::entities::{Block, CertificatePayload};
use sha2::{Digest, Sha256};

/// SHA-256 state primed with every hashed field except the nonce
///
/// Preimage: `index ‖ timestamp ‖ JSON(payload) ‖ previousHash ‖ nonce`.
#[derive(Clone)]
pub struct BlockHasher {
    prefix: Sha256,
}

impl BlockHasher {
    pub fn new(
        index: u64,
        timestamp: i64,
        payload: &CertificatePayload,
        previous_hash: &str,
    ) -> Self {
        let mut prefix = Sha256::new();
        prefix.update(index.to_string());
        prefix.update(timestamp.to_string());
        prefix.update(payload.canonical_json());
        prefix.update(previous_hash);
        Self { prefix }
    }

    /// Lowercase hex hash for a given nonce
    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        let mut hasher = self.prefix.clone();
        hasher.update(nonce.to_string());
        hex::encode(hasher.finalize())
    }
}

/// Compute the hash a block's fields commit to
pub fn compute_block_hash(
    index: u64,
    timestamp: i64,
    payload: &CertificatePayload,
    previous_hash: &str,
    nonce: u64,
) -> String {
    BlockHasher::new(index, timestamp, payload, previous_hash).hash_with_nonce(nonce)
}

/// Recompute a block's hash from its fields, ignoring its `hash` field
pub fn recompute_hash(block: &Block) -> String {
    compute_block_hash(
        block.index,
        block.timestamp,
        &block.certificate_data,
        &block.previous_hash,
        block.nonce,
    )
}
