//! # zkc-api: HTTP Service
//!
//! Axum front end over the commitment store, the proof consumer and the
//! ledger.
//!
//! ## Routes
//!
//! - `/health/liveness`, `/health/readiness`
//! - `/metrics` when a Prometheus recorder is installed
//! - `/v1/credentials/*`, `/v1/store` store operations
//! - `/v1/proofs/*` proof generation and checking
//! - `/v1/ledger/*` publication and ledger state
//!
//! Handlers delegate to the domain crates and map their errors through
//! [`AppError`].

pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(routes::credentials::router())
        .merge(routes::proofs::router())
        .merge(routes::ledger::router());

    if state.metrics.is_some() {
        router = router.route("/metrics", get(prometheus_metrics));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn liveness() -> &'static str {
    "ok"
}

async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.ledger.snapshot() {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "ledger not ready");
            (StatusCode::SERVICE_UNAVAILABLE, "ledger unavailable")
        }
    }
}

async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}
