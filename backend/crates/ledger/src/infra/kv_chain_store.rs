//! Chain store over a single key-value entry
//!
//! The whole chain lives JSON-encoded under one key. Appends re-read the
//! value, check the caller's expected tip and write back with
//! `compare_and_set` against the exact bytes that were read.

use crate::domain::entities::{Block, Chain};
use crate::domain::repository::{AppendOutcome, ChainSnapshot, ChainStore, KeyValueStore};
use crate::domain::value_objects::ChainTip;
use crate::error::{LedgerError, LedgerResult};

pub const DEFAULT_CHAIN_KEY: &str = "certificate_blockchain";

#[derive(Debug, Clone)]
pub struct KvChainStore<K> {
    kv: K,
    key: String,
}

impl<K> KvChainStore<K>
where
    K: KeyValueStore + Sync,
{
    pub fn new(kv: K, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    async fn read_raw(&self) -> LedgerResult<Option<(String, Chain)>> {
        let Some(raw) = self.kv.get(&self.key).await? else {
            return Ok(None);
        };
        let chain = Chain::decode(&raw).inspect_err(|e| {
            tracing::error!(key = %self.key, error = %e, "Stored chain failed to decode");
        })?;
        Ok(Some((raw, chain)))
    }
}

impl<K> ChainStore for KvChainStore<K>
where
    K: KeyValueStore + Sync,
{
    async fn get(&self) -> LedgerResult<ChainSnapshot> {
        Ok(match self.read_raw().await? {
            Some((_, chain)) => ChainSnapshot::Loaded(chain),
            None => ChainSnapshot::Empty,
        })
    }

    async fn set(&self, chain: &Chain) -> LedgerResult<()> {
        let encoded = chain.encode()?;
        self.kv.set(&self.key, &encoded).await?;
        tracing::warn!(key = %self.key, length = chain.len(), "Chain overwritten");
        Ok(())
    }

    async fn initialize(&self, genesis: &Block) -> LedgerResult<bool> {
        let encoded = Chain::with_genesis(genesis.clone()).encode()?;
        self.kv.compare_and_set(&self.key, None, &encoded).await
    }

    async fn append(&self, expected_tip: &ChainTip, block: &Block) -> LedgerResult<AppendOutcome> {
        let Some((raw, mut chain)) = self.read_raw().await? else {
            return Err(LedgerError::NotBootstrapped);
        };

        if !expected_tip.matches(chain.tip()) {
            return Ok(AppendOutcome::Conflict);
        }

        if block.index != expected_tip.index + 1 || block.previous_hash != expected_tip.hash {
            return Err(LedgerError::InvalidInput(format!(
                "block {} does not extend tip {}",
                block.index, expected_tip.index
            )));
        }

        chain.push(block.clone());
        let encoded = chain.encode()?;

        if self.kv.compare_and_set(&self.key, Some(&raw), &encoded).await? {
            Ok(AppendOutcome::Committed)
        } else {
            Ok(AppendOutcome::Conflict)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CertificatePayload;
    use crate::infra::memory::InMemoryKvStore;

    fn block(index: u64, previous_hash: &str, hash: &str) -> Block {
        Block {
            index,
            timestamp: 1_000 + index as i64,
            certificate_data: CertificatePayload::genesis(),
            previous_hash: previous_hash.to_string(),
            hash: hash.to_string(),
            nonce: 0,
        }
    }

    fn store() -> (InMemoryKvStore, KvChainStore<InMemoryKvStore>) {
        let kv = InMemoryKvStore::new();
        (kv.clone(), KvChainStore::new(kv, DEFAULT_CHAIN_KEY))
    }

    #[tokio::test]
    async fn test_missing_value_is_empty() {
        let (_, store) = store();
        assert_eq!(store.get().await.unwrap(), ChainSnapshot::Empty);
    }

    #[tokio::test]
    async fn test_garbage_value_is_corrupt() {
        let (kv, store) = store();
        kv.set(DEFAULT_CHAIN_KEY, "definitely not json").await.unwrap();

        assert!(matches!(
            store.get().await,
            Err(LedgerError::StorageCorrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_array_is_corrupt() {
        let (kv, store) = store();
        kv.set(DEFAULT_CHAIN_KEY, "[]").await.unwrap();

        assert!(matches!(
            store.get().await,
            Err(LedgerError::StorageCorrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_initialize_only_once() {
        let (_, store) = store();
        let genesis = block(0, "0", "g0");
        assert!(store.initialize(&genesis).await.unwrap());
        assert!(!store.initialize(&block(0, "0", "other")).await.unwrap());

        let ChainSnapshot::Loaded(chain) = store.get().await.unwrap() else {
            panic!("expected a loaded chain");
        };
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.genesis().hash, "g0");
    }

    #[tokio::test]
    async fn test_append_on_current_tip() {
        let (_, store) = store();
        let genesis = block(0, "0", "g0");
        store.initialize(&genesis).await.unwrap();

        let outcome = store
            .append(&ChainTip::of(&genesis), &block(1, "g0", "b1"))
            .await
            .unwrap();
        assert_eq!(outcome, AppendOutcome::Committed);

        let ChainSnapshot::Loaded(chain) = store.get().await.unwrap() else {
            panic!("expected a loaded chain");
        };
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.tip().hash, "b1");
    }

    #[tokio::test]
    async fn test_append_on_stale_tip_conflicts() {
        let (_, store) = store();
        let genesis = block(0, "0", "g0");
        store.initialize(&genesis).await.unwrap();
        let stale = ChainTip::of(&genesis);

        store.append(&stale, &block(1, "g0", "b1")).await.unwrap();
        let outcome = store.append(&stale, &block(1, "g0", "b1x")).await.unwrap();
        assert_eq!(outcome, AppendOutcome::Conflict);

        let ChainSnapshot::Loaded(chain) = store.get().await.unwrap() else {
            panic!("expected a loaded chain");
        };
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.tip().hash, "b1");
    }

    #[tokio::test]
    async fn test_append_rejects_unlinked_block() {
        let (_, store) = store();
        let genesis = block(0, "0", "g0");
        store.initialize(&genesis).await.unwrap();

        let result = store
            .append(&ChainTip::of(&genesis), &block(1, "elsewhere", "b1"))
            .await;
        assert!(matches!(result, Err(LedgerError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_append_without_chain() {
        let (_, store) = store();
        let tip = ChainTip {
            index: 0,
            hash: "g0".to_string(),
        };
        let result = store.append(&tip, &block(1, "g0", "b1")).await;
        assert!(matches!(result, Err(LedgerError::NotBootstrapped)));
    }

    #[tokio::test]
    async fn test_set_overwrites_chain() {
        let (_, store) = store();
        store.initialize(&block(0, "0", "g0")).await.unwrap();

        let replacement = Chain::from_blocks(vec![block(0, "0", "g1"), block(1, "g1", "b1")]).unwrap();
        store.set(&replacement).await.unwrap();

        assert_eq!(
            store.get().await.unwrap(),
            ChainSnapshot::Loaded(replacement)
        );
    }
}
