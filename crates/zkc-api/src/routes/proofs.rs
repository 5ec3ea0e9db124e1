//! # Proof Routes
//!
//! - `POST /v1/proofs` generate a proof for a stored credential
//! - `POST /v1/proofs/check` structural check plus proof-system verification
//!
//! Proving runs on the blocking pool. The store lock is held only while the
//! circuit inputs are read.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use zkc_zkp::{CredentialProof, ProofRequest, ProofSystem, PublicOutput};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/proofs", post(generate_proof))
        .route("/v1/proofs/check", post(check_proof))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProofCheckResponse {
    pub valid: bool,
    pub public_output: PublicOutput,
}

async fn generate_proof(
    State(state): State<AppState>,
    body: Result<Json<ProofRequest>, JsonRejection>,
) -> Result<Json<CredentialProof>, AppError> {
    let request = extract_json(body)?;
    let prepared = {
        let store = state.store.read();
        state.consumer.prepare(&store, &request)?
    };

    let consumer = state.consumer.clone();
    let proof = tokio::task::spawn_blocking(move || consumer.prove(&prepared))
        .await
        .map_err(|e| AppError::Internal(format!("proving task failed: {e}")))??;

    tracing::info!(id = %request.id, root = %proof.public_output.root, "proof generated");
    Ok(Json(proof))
}

async fn check_proof(
    State(state): State<AppState>,
    body: Result<Json<CredentialProof>, JsonRejection>,
) -> Result<Json<ProofCheckResponse>, AppError> {
    let proof = extract_json(body)?;
    let public_output = state.consumer.validate_structure(&proof)?.clone();
    let valid = ProofSystem::verify(state.consumer.system().as_ref(), &proof)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(Json(ProofCheckResponse {
        valid,
        public_output,
    }))
}
