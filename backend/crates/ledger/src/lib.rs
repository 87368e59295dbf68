//! Certificate Ledger Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Blocks, hashing, mining, validation, repository traits
//! - `application/` - The certificate ledger and its configuration
//! - `infra/` - Key-value store implementations
//! - `presentation/` - HTTP handlers
//!
//! ## Integrity Model
//! - Every block commits to its predecessor's hash, so editing any issued
//!   certificate breaks verification of it and of every later certificate
//! - Proof-of-work difficulty is a configured parameter, not a security claim
//! - Appends are compare-and-swap on the chain tail; a lost race re-mines
//! - An empty store is reported as such and never replaced by a fresh chain
//!   except through an explicit bootstrap

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::LedgerConfig;
pub use application::ledger::{BootstrapOutcome, CertificateLedger};
pub use domain::entities::{Block, CertificatePayload, Chain};
pub use domain::validator::{ChainAudit, VerificationOutcome, VerificationReport};
pub use domain::value_objects::Difficulty;
pub use error::{LedgerError, LedgerResult};
pub use infra::kv_chain_store::KvChainStore;
pub use infra::memory::InMemoryKvStore;
pub use infra::postgres::PgKvStore;
pub use presentation::router::ledger_router;
