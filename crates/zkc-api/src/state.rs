//! # Application State
//!
//! Shared by every handler. The commitment store sits behind a
//! `parking_lot::RwLock`; handlers never hold the lock across an `.await`.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use zkc_ledger::{InMemoryLedger, Ledger, Publisher};
use zkc_state::CredentialAuthority;
use zkc_vc::CommitmentStore;
use zkc_zkp::{MockProofSystem, ProofConsumer, ProofSystem};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<RwLock<CommitmentStore>>,
    pub consumer: Arc<ProofConsumer>,
    pub ledger: Arc<dyn Ledger>,
    pub publisher: Publisher,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// In-memory ledger and mock proof system.
    pub fn new(config: AppConfig) -> Self {
        let system: Arc<dyn ProofSystem> = Arc::new(MockProofSystem::new());
        let authority = CredentialAuthority::new(
            config.admin_key,
            config.policy.build(config.oracles.clone()),
            system.clone(),
        );
        let ledger = Arc::new(InMemoryLedger::new(authority));
        Self::with_parts(config, system, ledger)
    }

    pub fn with_parts(config: AppConfig, system: Arc<dyn ProofSystem>, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            publisher: Publisher::new(config.publish),
            config: Arc::new(config),
            store: Arc::new(RwLock::new(CommitmentStore::new())),
            consumer: Arc::new(ProofConsumer::new(system)),
            ledger,
            metrics: None,
        }
    }

    /// Serve `/metrics` from this recorder handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("policy", &self.config.policy)
            .field("store_entries", &self.store.read().len())
            .field("block_height", &self.ledger.block_height())
            .finish()
    }
}
