use actix_web::{HttpResponse, ResponseError, error::BlockingError, http::StatusCode};
use thiserror::Error;

/// Every way a ledger operation can be refused. None of these stop the node.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("block #{index} does not link to the tip (expected {expected}, got {found})")]
    LinkageMismatch {
        index: u64,
        expected: String,
        found: String,
    },

    #[error("proof for block #{index} is invalid")]
    ProofInvalid { index: u64 },

    #[error("invalid chain: {0}")]
    InvalidChain(String),

    #[error("peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: String, reason: String },

    #[error("proof-of-work search cancelled")]
    MiningCancelled,

    #[error("mining worker failed: {0}")]
    WorkerFailed(String),

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl LedgerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        LedgerError::InvalidInput(msg.into())
    }

    pub fn unreachable(peer: &str, reason: impl ToString) -> Self {
        LedgerError::PeerUnreachable {
            peer: peer.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

impl From<BlockingError> for LedgerError {
    fn from(err: BlockingError) -> Self {
        LedgerError::WorkerFailed(err.to_string())
    }
}

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::InvalidInput(_)
            | LedgerError::LinkageMismatch { .. }
            | LedgerError::ProofInvalid { .. }
            | LedgerError::InvalidChain(_) => StatusCode::BAD_REQUEST,
            LedgerError::PeerUnreachable { .. } => StatusCode::BAD_GATEWAY,
            LedgerError::MiningCancelled => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::WorkerFailed(_) | LedgerError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
