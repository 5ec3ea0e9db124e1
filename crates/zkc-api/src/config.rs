//! # Service Configuration
//!
//! Read once at startup from `ZKC_*` environment variables. Any invalid
//! value aborts startup with the variable name in the error.
//!
//! | Variable | Default |
//! |---|---|
//! | `ZKC_BIND_ADDR` | `0.0.0.0:8080` |
//! | `ZKC_ADMIN_PUBLIC_KEY` | required |
//! | `ZKC_POLICY` | `issuer-signature` |
//! | `ZKC_ORACLE_KEYS` | empty |
//! | `ZKC_PUBLISH_MAX_ATTEMPTS` | `3` |
//! | `ZKC_PUBLISH_BASE_DELAY_MS` | `1000` |
//! | `ZKC_METRICS_ENABLED` | `true` |
//! | `ZKC_LOG_JSON` | `false` |

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use zkc_crypto::PublicKey;
use zkc_ledger::PublishConfig;
use zkc_state::PolicyKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub admin_key: PublicKey,
    pub policy: PolicyKind,
    pub oracles: BTreeSet<PublicKey>,
    pub publish: PublishConfig,
    pub metrics_enabled: bool,
    pub log_json: bool,
}

impl AppConfig {
    /// Configuration with defaults for everything but the admin key.
    pub fn new(admin_key: PublicKey) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            admin_key,
            policy: PolicyKind::IssuerSignature,
            oracles: BTreeSet::new(),
            publish: PublishConfig::default(),
            metrics_enabled: true,
            log_json: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let admin_key = get("ZKC_ADMIN_PUBLIC_KEY")
            .ok_or(ConfigError::Missing("ZKC_ADMIN_PUBLIC_KEY"))?
            .parse::<PublicKey>()
            .map_err(|e| invalid("ZKC_ADMIN_PUBLIC_KEY", e))?;
        let mut config = Self::new(admin_key);

        if let Some(v) = get("ZKC_BIND_ADDR") {
            config.bind_addr = v.parse().map_err(|e| invalid("ZKC_BIND_ADDR", e))?;
        }
        if let Some(v) = get("ZKC_POLICY") {
            config.policy = v.parse().map_err(|e| invalid("ZKC_POLICY", e))?;
        }
        if let Some(v) = get("ZKC_ORACLE_KEYS") {
            config.oracles = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<PublicKey>().map_err(|e| invalid("ZKC_ORACLE_KEYS", e)))
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = get("ZKC_PUBLISH_MAX_ATTEMPTS") {
            let attempts: u32 = v.parse().map_err(|e| invalid("ZKC_PUBLISH_MAX_ATTEMPTS", e))?;
            if attempts == 0 {
                return Err(invalid("ZKC_PUBLISH_MAX_ATTEMPTS", "must be at least 1"));
            }
            config.publish.max_attempts = attempts;
        }
        if let Some(v) = get("ZKC_PUBLISH_BASE_DELAY_MS") {
            let ms: u64 = v.parse().map_err(|e| invalid("ZKC_PUBLISH_BASE_DELAY_MS", e))?;
            config.publish.base_delay = Duration::from_millis(ms);
        }
        if let Some(v) = get("ZKC_METRICS_ENABLED") {
            config.metrics_enabled = v.to_lowercase() != "false";
        }
        if let Some(v) = get("ZKC_LOG_JSON") {
            config.log_json = v.eq_ignore_ascii_case("true");
        }

        if config.policy == PolicyKind::Attestation && config.oracles.is_empty() {
            return Err(invalid(
                "ZKC_ORACLE_KEYS",
                "the attestation policy needs at least one oracle key",
            ));
        }
        Ok(config)
    }
}

fn invalid(var: &'static str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use zkc_crypto::SigningKeyPair;

    fn key(seed: u8) -> String {
        SigningKeyPair::from_seed(&[seed; 32]).public_key().to_hex()
    }

    fn load(vars: &[(&str, String)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn admin_key_is_required() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("ZKC_ADMIN_PUBLIC_KEY"));
        let err = load(&[("ZKC_ADMIN_PUBLIC_KEY", "abcd".into())]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "ZKC_ADMIN_PUBLIC_KEY", .. }));
    }

    #[test]
    fn defaults() {
        let config = load(&[("ZKC_ADMIN_PUBLIC_KEY", key(1))]).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.policy, PolicyKind::IssuerSignature);
        assert_eq!(config.publish, PublishConfig::default());
        assert!(config.metrics_enabled);
        assert!(!config.log_json);
    }

    #[test]
    fn full_attestation_config() {
        let config = load(&[
            ("ZKC_ADMIN_PUBLIC_KEY", key(1)),
            ("ZKC_BIND_ADDR", "127.0.0.1:9000".into()),
            ("ZKC_POLICY", "attestation".into()),
            ("ZKC_ORACLE_KEYS", format!("{}, {}", key(2), key(3))),
            ("ZKC_PUBLISH_MAX_ATTEMPTS", "5".into()),
            ("ZKC_PUBLISH_BASE_DELAY_MS", "250".into()),
            ("ZKC_METRICS_ENABLED", "FALSE".into()),
            ("ZKC_LOG_JSON", "true".into()),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.policy, PolicyKind::Attestation);
        assert_eq!(config.oracles.len(), 2);
        assert_eq!(config.publish.max_attempts, 5);
        assert_eq!(config.publish.base_delay, Duration::from_millis(250));
        assert!(!config.metrics_enabled);
        assert!(config.log_json);
    }

    #[test]
    fn attestation_without_oracles_is_rejected() {
        let err = load(&[
            ("ZKC_ADMIN_PUBLIC_KEY", key(1)),
            ("ZKC_POLICY", "attestation".into()),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "ZKC_ORACLE_KEYS", .. }));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        for (var, value) in [
            ("ZKC_PUBLISH_MAX_ATTEMPTS", "three"),
            ("ZKC_PUBLISH_MAX_ATTEMPTS", "0"),
            ("ZKC_PUBLISH_BASE_DELAY_MS", "-1"),
            ("ZKC_BIND_ADDR", "localhost"),
            ("ZKC_POLICY", "both"),
        ] {
            let err = load(&[("ZKC_ADMIN_PUBLIC_KEY", key(1)), (var, value.into())]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { var: v, .. } if v == var), "{var}={value}");
        }
    }
}
