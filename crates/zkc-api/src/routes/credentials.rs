//! # Credential Store Routes
//!
//! - `POST /v1/credentials` validate, encode and insert a credential. An
//!   optional `record` (issuer metadata record) replaces the credential's
//!   metadata and verification blocks before encoding.
//! - `GET  /v1/credentials/{id}` stored commitment
//! - `GET  /v1/credentials/{id}/witness` inclusion witness and root
//! - `GET  /v1/store` root, entry count and last update

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zkc_core::FieldElement;
use zkc_crypto::MerkleWitness;
use zkc_vc::{Credential, MetadataRecord, StoreSnapshot};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/credentials", post(create_credential))
        .route("/v1/credentials/{id}", get(get_credential))
        .route("/v1/credentials/{id}/witness", get(get_witness))
        .route("/v1/store", get(store_status))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommitmentResponse {
    pub id: String,
    pub commitment: FieldElement,
    pub root: FieldElement,
    /// The metadata record with defaults filled in, when one was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WitnessResponse {
    pub id: String,
    pub commitment: FieldElement,
    pub root: FieldElement,
    pub witness: MerkleWitness,
}

async fn create_credential(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CommitmentResponse>), AppError> {
    let value = extract_json(body)?;
    let mut credential = Credential::from_value(&value)?;
    let record = match value.get("record") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(MetadataRecord::from_json(raw)?),
    };
    if let Some(record) = &record {
        credential = record.apply_to(credential);
    }
    let (commitment, root) = {
        let mut store = state.store.write();
        let commitment = store.insert_credential(&credential)?;
        (commitment, store.root())
    };
    tracing::info!(id = %credential.id, %commitment, %root, "credential stored");

    Ok((
        StatusCode::CREATED,
        Json(CommitmentResponse {
            id: credential.id.to_string(),
            commitment,
            root,
            record: record.as_ref().map(MetadataRecord::to_json),
        }),
    ))
}

async fn get_credential(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CommitmentResponse>, AppError> {
    let store = state.store.read();
    let commitment = store.get(&id)?;
    Ok(Json(CommitmentResponse {
        id,
        commitment,
        root: store.root(),
        record: None,
    }))
}

async fn get_witness(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WitnessResponse>, AppError> {
    let store = state.store.read();
    let commitment = store.get(&id)?;
    let witness = store.witness(&id)?;
    Ok(Json(WitnessResponse {
        id,
        commitment,
        root: store.root(),
        witness,
    }))
}

async fn store_status(State(state): State<AppState>) -> Json<StoreSnapshot> {
    Json(state.store.read().snapshot())
}
