//! # API Error Types
//!
//! Every handler returns `Result<_, AppError>`. Errors render as
//!
//! ```json
//! {"error": {"code": "NOT_FOUND", "message": "..."}}
//! ```
//!
//! Internal and upstream messages are logged, not returned. Prover
//! failures are the exception: their message reaches the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkc_ledger::{LedgerError, PublishError};
use zkc_vc::{CredentialError, StoreError};
use zkc_zkp::ConsumerError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// 404
    #[error("not found: {0}")]
    NotFound(String),

    /// 422
    #[error("validation error: {0}")]
    Validation(String),

    /// 401
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 409. Carries the authority's error code.
    #[error("{message}")]
    Declined { code: String, message: String },

    /// 502. The prover failed; the message is returned as is.
    #[error("proof generation failed: {0}")]
    ProofGeneration(String),

    /// 502
    #[error("upstream error: {0}")]
    Upstream(String),

    /// 500
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Declined { code, .. } => (StatusCode::CONFLICT, code.as_str()),
            Self::ProofGeneration(_) => (StatusCode::BAD_GATEWAY, "PROOF_GENERATION_ERROR"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Upstream(_) => "An upstream service error occurred".to_string(),
            other => other.to_string(),
        };
        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Upstream(_) => tracing::error!(error = %self, "upstream error"),
            Self::ProofGeneration(_) => tracing::warn!(error = %self, "proof generation failed"),
            _ => {}
        }
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("credential {id}")),
            StoreError::InvalidInput(msg) => Self::Validation(msg),
        }
    }
}

impl From<ConsumerError> for AppError {
    fn from(err: ConsumerError) -> Self {
        match err {
            ConsumerError::NotFound(id) => Self::NotFound(format!("credential {id}")),
            ConsumerError::InvalidProof(msg) => Self::Validation(msg),
            ConsumerError::ProofGeneration(msg) => Self::ProofGeneration(msg),
        }
    }
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Fatal { source, .. } => match source {
                LedgerError::InvalidSignature(msg) => Self::Unauthorized(msg),
                LedgerError::Encoding(msg) => Self::Validation(msg),
                LedgerError::Rejected { code, message, .. } => match code.as_str() {
                    "INVALID_SIGNATURE" => Self::Unauthorized(message),
                    "NOT_AUTHORIZED" => Self::Forbidden(message),
                    "UNKNOWN_COMMAND" | "MALFORMED_COMMAND" => Self::Validation(message),
                    _ => Self::Declined { code, message },
                },
                other => Self::Upstream(other.to_string()),
            },
            exhausted @ PublishError::Update { .. } => Self::Upstream(exhausted.to_string()),
        }
    }
}
