//! Ledger Router

use crate::application::ledger::CertificateLedger;
use crate::domain::repository::ChainStore;
use crate::presentation::handlers::{self, LedgerAppState};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Create the ledger router for any chain store implementation
pub fn ledger_router<S>(ledger: Arc<CertificateLedger<S>>) -> Router
where
    S: ChainStore + Send + Sync + 'static,
{
    let state = LedgerAppState { ledger };

    Router::new()
        .route("/certificates", post(handlers::issue_certificate::<S>))
        .route("/certificates/verify", post(handlers::verify_certificate::<S>))
        .route(
            "/certificates/user/{user_id}",
            get(handlers::user_certificates::<S>),
        )
        .route("/chain/validate", get(handlers::validate_chain::<S>))
        .with_state(state)
}
