//! Certificate Ledger
//!
//! Issue, verify, list and audit certificates on top of a [`ChainStore`].
//! Writers in one process take turns on an append lock. The commit itself is
//! still a compare-and-swap on the tail we read, so writers in other
//! processes sharing the store re-read and mine again when they lose a race.

use crate::application::config::LedgerConfig;
use crate::domain::entities::{Block, CertificatePayload, Chain, GENESIS_PREVIOUS_HASH};
use crate::domain::miner::BlockMiner;
use crate::domain::repository::{AppendOutcome, ChainSnapshot, ChainStore};
use crate::domain::validator::{ChainAudit, ChainValidator, VerificationReport};
use crate::domain::value_objects::ChainTip;
use crate::error::{LedgerError, LedgerResult};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outcome of [`CertificateLedger::bootstrap`]
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    Created(Block),
    AlreadyInitialized { length: usize },
}

pub struct CertificateLedger<S>
where
    S: ChainStore,
{
    store: Arc<S>,
    config: Arc<LedgerConfig>,
    miner: BlockMiner,
    validator: ChainValidator,
    /// Held across load, mine and append
    append_lock: Mutex<()>,
}

impl<S> CertificateLedger<S>
where
    S: ChainStore + Sync,
{
    pub fn new(store: Arc<S>, config: Arc<LedgerConfig>) -> Self {
        let miner = BlockMiner::new(config.max_mining_attempts, config.mining_timeout);
        let validator = ChainValidator::new(config.difficulty);
        Self {
            store,
            config,
            miner,
            validator,
            append_lock: Mutex::new(()),
        }
    }

    /// Create the genesis block if the store is empty
    pub async fn bootstrap(&self) -> LedgerResult<BootstrapOutcome> {
        if let ChainSnapshot::Loaded(chain) = self.store.get().await? {
            tracing::info!(length = chain.len(), "Ledger already initialized");
            return Ok(BootstrapOutcome::AlreadyInitialized {
                length: chain.len(),
            });
        }

        let genesis = self
            .mine(
                0,
                CertificatePayload::genesis(),
                GENESIS_PREVIOUS_HASH.to_string(),
            )
            .await?;

        if self.store.initialize(&genesis).await? {
            tracing::info!(
                hash = %genesis.hash,
                difficulty = self.config.difficulty.zeros(),
                "Genesis block created"
            );
            return Ok(BootstrapOutcome::Created(genesis));
        }

        // Another writer bootstrapped between our read and write
        let chain = self.load().await?;
        tracing::info!(length = chain.len(), "Ledger initialized concurrently");
        Ok(BootstrapOutcome::AlreadyInitialized {
            length: chain.len(),
        })
    }

    /// Issue a certificate as a new block at the chain tail
    pub async fn add_certificate(&self, payload: CertificatePayload) -> LedgerResult<Block> {
        payload.validate()?;
        let _writer = self.append_lock.lock().await;

        let attempts = self.config.max_commit_retries.saturating_add(1);
        for attempt in 1..=attempts {
            let chain = self.load().await?;
            let tip = ChainTip::of(chain.tip());

            let block = self
                .mine(tip.index + 1, payload.clone(), tip.hash.clone())
                .await?;

            match self.store.append(&tip, &block).await? {
                AppendOutcome::Committed => {
                    tracing::info!(
                        index = block.index,
                        hash = %block.hash,
                        nonce = block.nonce,
                        user_id = %block.certificate_data.user_id,
                        module_id = %block.certificate_data.module_id,
                        attempt = attempt,
                        "Certificate committed"
                    );
                    return Ok(block);
                }
                AppendOutcome::Conflict => {
                    tracing::warn!(
                        index = block.index,
                        attempt = attempt,
                        "Chain tail moved during mining, retrying"
                    );
                }
            }
        }

        Err(LedgerError::CommitConflict { attempts })
    }

    /// Verify a certificate by its block hash
    pub async fn verify_certificate(&self, hash: &str) -> LedgerResult<VerificationReport> {
        let hash = hash.trim();
        if hash.is_empty() {
            return Err(LedgerError::InvalidInput(
                "certificateHash must not be empty".to_string(),
            ));
        }

        let chain = self.load().await?;
        Ok(self.validator.verify(&chain, hash))
    }

    /// Certificates issued to a user, in issuance order
    pub async fn get_user_certificates(&self, user_id: &str) -> LedgerResult<Vec<Block>> {
        let chain = self.load().await?;
        Ok(chain
            .into_blocks()
            .into_iter()
            .filter(|block| !block.is_genesis() && block.certificate_data.user_id == user_id)
            .collect())
    }

    /// Audit every block of the chain
    pub async fn validate_chain(&self) -> LedgerResult<ChainAudit> {
        let chain = self.load().await?;
        let audit = self.validator.validate_chain(&chain);
        if !audit.is_valid {
            tracing::warn!(
                length = audit.length,
                violations = audit.errors.len(),
                "Chain audit failed"
            );
        }
        Ok(audit)
    }

    async fn load(&self) -> LedgerResult<Chain> {
        match self.store.get().await? {
            ChainSnapshot::Loaded(chain) => Ok(chain),
            ChainSnapshot::Empty => Err(LedgerError::NotBootstrapped),
        }
    }

    /// Run the nonce search on the blocking pool
    async fn mine(
        &self,
        index: u64,
        payload: CertificatePayload,
        previous_hash: String,
    ) -> LedgerResult<Block> {
        let miner = self.miner.clone();
        let difficulty = self.config.difficulty;
        let timestamp = Utc::now().timestamp_millis();

        let block = tokio::task::spawn_blocking(move || {
            miner.mine(index, timestamp, payload, previous_hash, difficulty)
        })
        .await?
        .inspect_err(|e| {
            tracing::warn!(
                index = index,
                attempts = e.attempts,
                timeout_ms = self.config.mining_timeout_ms(),
                "Mining budget exhausted"
            );
        })?;

        Ok(block)
    }
}
