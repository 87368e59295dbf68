//! HTTP Handlers

use crate::application::ledger::CertificateLedger;
use crate::domain::repository::ChainStore;
use crate::domain::validator::ChainAudit;
use crate::error::{LedgerError, LedgerResult};
use crate::presentation::dto::{
    CertificateEntry, IssueCertificateRequest, IssueCertificateResponse,
    UserCertificatesResponse, VerifyCertificateRequest, VerifyCertificateResponse,
};
use axum::Json;
use axum::extract::{Path, State};
use std::sync::Arc;

/// Shared state for ledger handlers
pub struct LedgerAppState<S>
where
    S: ChainStore + Send + Sync + 'static,
{
    pub ledger: Arc<CertificateLedger<S>>,
}

impl<S> Clone for LedgerAppState<S>
where
    S: ChainStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
        }
    }
}

/// POST /api/ledger/certificates
pub async fn issue_certificate<S>(
    State(state): State<LedgerAppState<S>>,
    Json(req): Json<IssueCertificateRequest>,
) -> LedgerResult<Json<IssueCertificateResponse>>
where
    S: ChainStore + Send + Sync + 'static,
{
    let block = state.ledger.add_certificate(req.into_payload()).await?;
    Ok(Json(IssueCertificateResponse::from(&block)))
}

/// POST /api/ledger/certificates/verify
pub async fn verify_certificate<S>(
    State(state): State<LedgerAppState<S>>,
    Json(req): Json<VerifyCertificateRequest>,
) -> LedgerResult<Json<VerifyCertificateResponse>>
where
    S: ChainStore + Send + Sync + 'static,
{
    let hash = req
        .certificate_hash
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| LedgerError::InvalidInput("certificateHash is required".to_string()))?;

    let report = state.ledger.verify_certificate(&hash).await?;

    Ok(Json(VerifyCertificateResponse {
        verified: report.is_valid(),
        message: report.message(),
        certificate: report.block.map(Into::into),
    }))
}

/// GET /api/ledger/certificates/user/{user_id}
pub async fn user_certificates<S>(
    State(state): State<LedgerAppState<S>>,
    Path(user_id): Path<String>,
) -> LedgerResult<Json<UserCertificatesResponse>>
where
    S: ChainStore + Send + Sync + 'static,
{
    let blocks = state.ledger.get_user_certificates(&user_id).await?;
    Ok(Json(UserCertificatesResponse {
        certificates: blocks.into_iter().map(CertificateEntry::from).collect(),
    }))
}

/// GET /api/ledger/chain/validate
pub async fn validate_chain<S>(
    State(state): State<LedgerAppState<S>>,
) -> LedgerResult<Json<ChainAudit>>
where
    S: ChainStore + Send + Sync + 'static,
{
    Ok(Json(state.ledger.validate_chain().await?))
}
