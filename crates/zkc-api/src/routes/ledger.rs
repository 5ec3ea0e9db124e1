//! # Ledger Routes
//!
//! - `POST /v1/ledger/publish` publish pre-signed transactions, in order,
//!   through the resilient publisher
//! - `GET  /v1/ledger/state` authority snapshot and block height

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use zkc_ledger::{LedgerSnapshot, Receipt, SignedTransaction};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/ledger/publish", post(publish))
        .route("/v1/ledger/state", get(ledger_state))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishRequest {
    pub transactions: Vec<SignedTransaction>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishResponse {
    pub receipts: Vec<Receipt>,
    pub block_height: u64,
}

async fn publish(
    State(state): State<AppState>,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<Json<PublishResponse>, AppError> {
    let request = extract_json(body)?;
    if request.transactions.is_empty() {
        return Err(AppError::Validation("no transactions to publish".into()));
    }
    let receipts = state
        .publisher
        .publish(state.ledger.as_ref(), &request.transactions)
        .await?;
    Ok(Json(PublishResponse {
        receipts,
        block_height: state.ledger.block_height(),
    }))
}

async fn ledger_state(State(state): State<AppState>) -> Result<Json<LedgerSnapshot>, AppError> {
    let snapshot = state
        .ledger
        .snapshot()
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    Ok(Json(snapshot))
}
