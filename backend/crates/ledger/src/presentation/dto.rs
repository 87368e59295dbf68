//! API DTOs (Data Transfer Objects)

use crate::domain::entities::{Block, CertificatePayload};
use serde::{Deserialize, Serialize};

/// Request for POST /api/ledger/certificates
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    pub user_id: String,
    pub module_id: String,
    pub skill: String,
    pub level: String,
    #[serde(default)]
    pub score: Option<f64>,
    /// Defaults to the time of the request
    #[serde(default)]
    pub issued_at: Option<String>,
}

impl IssueCertificateRequest {
    pub fn into_payload(self) -> CertificatePayload {
        CertificatePayload {
            user_id: self.user_id,
            module_id: self.module_id,
            skill: self.skill,
            level: self.level,
            score: self.score,
            issued_at: self
                .issued_at
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Response for POST /api/ledger/certificates
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateResponse {
    pub hash: String,
    pub block_index: u64,
    pub timestamp: i64,
    pub nonce: u64,
}

impl From<&Block> for IssueCertificateResponse {
    fn from(block: &Block) -> Self {
        Self {
            hash: block.hash.clone(),
            block_index: block.index,
            timestamp: block.timestamp,
            nonce: block.nonce,
        }
    }
}

/// Request for POST /api/ledger/certificates/verify
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCertificateRequest {
    #[serde(default)]
    pub certificate_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainData {
    pub block_index: u64,
    pub timestamp: i64,
    pub hash: String,
    pub nonce: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedCertificate {
    pub data: CertificatePayload,
    pub blockchain_data: BlockchainData,
}

impl From<Block> for VerifiedCertificate {
    fn from(block: Block) -> Self {
        Self {
            blockchain_data: BlockchainData {
                block_index: block.index,
                timestamp: block.timestamp,
                hash: block.hash,
                nonce: block.nonce,
            },
            data: block.certificate_data,
        }
    }
}

/// Response for POST /api/ledger/certificates/verify
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCertificateResponse {
    pub verified: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<VerifiedCertificate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateEntry {
    pub hash: String,
    pub block_index: u64,
    pub timestamp: i64,
    pub data: CertificatePayload,
}

impl From<Block> for CertificateEntry {
    fn from(block: Block) -> Self {
        Self {
            hash: block.hash,
            block_index: block.index,
            timestamp: block.timestamp,
            data: block.certificate_data,
        }
    }
}

/// Response for GET /api/ledger/certificates/user/{user_id}
#[derive(Debug, Clone, Serialize)]
pub struct UserCertificatesResponse {
    pub certificates: Vec<CertificateEntry>,
}
