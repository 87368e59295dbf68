//! Ledger Error Types
//!
//! Infrastructure and input failures. Integrity failures found while
//! verifying a certificate are not errors; they are reported through
//! [`crate::domain::validator::VerificationOutcome`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Ledger result type alias
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger error variants
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Caller input rejected before it reached the chain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Nothing stored yet; the genesis block has not been created
    #[error("Ledger has not been bootstrapped")]
    NotBootstrapped,

    /// Key-value collaborator could not be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Stored chain is present but cannot be decoded as a chain
    #[error("Stored chain is corrupt: {0}")]
    StorageCorrupt(String),

    /// Nonce search exceeded its attempt or time budget
    #[error("Mining gave up after {attempts} attempts")]
    MiningTimeout { attempts: u64 },

    /// Every commit attempt lost the race for the chain tail
    #[error("Chain tail kept moving; gave up after {attempts} commit attempts")]
    CommitConflict { attempts: u32 },

    /// Blocking mining task failed to complete
    #[error("Mining worker failed: {0}")]
    Worker(String),
}

impl LedgerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LedgerError::CommitConflict { .. } => StatusCode::CONFLICT,
            LedgerError::NotBootstrapped
            | LedgerError::StorageUnavailable(_)
            | LedgerError::MiningTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::StorageCorrupt(_) | LedgerError::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn log(&self) {
        match self {
            LedgerError::StorageUnavailable(e) => {
                tracing::error!(error = %e, "Ledger storage unavailable");
            }
            LedgerError::StorageCorrupt(e) => {
                tracing::error!(error = %e, "Ledger storage corrupt");
            }
            LedgerError::Worker(e) => {
                tracing::error!(error = %e, "Ledger mining worker failed");
            }
            LedgerError::MiningTimeout { attempts } => {
                tracing::warn!(attempts = attempts, "Ledger mining timed out");
            }
            LedgerError::CommitConflict { attempts } => {
                tracing::warn!(attempts = attempts, "Ledger commit retries exhausted");
            }
            LedgerError::NotBootstrapped => {
                tracing::warn!("Ledger used before bootstrap");
            }
            LedgerError::InvalidInput(_) => {
                tracing::debug!(error = %self, "Ledger input rejected");
            }
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::StorageCorrupt(err.to_string())
    }
}

impl From<tokio::task::JoinError> for LedgerError {
    fn from(err: tokio::task::JoinError) -> Self {
        LedgerError::Worker(err.to_string())
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();

        // Storage and worker details stay in the logs
        let detail = if status.is_server_error() {
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            self.to_string()
        };

        let body = serde_json::json!({
            "status": status.as_u16(),
            "title": status.canonical_reason(),
            "detail": detail,
        });

        (status, Json(body)).into_response()
    }
}
