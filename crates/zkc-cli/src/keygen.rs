//! `zkc keygen`

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};
use zkc_core::hex;
use zkc_crypto::SigningKeyPair;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// 32-byte seed as hex. A random key is generated when omitted.
    #[arg(long)]
    pub seed: Option<String>,
}

pub fn run_keygen(args: &KeygenArgs) -> Result<Value> {
    let key = match &args.seed {
        Some(seed) => SigningKeyPair::from_seed_hex(seed).context("invalid --seed")?,
        None => SigningKeyPair::generate(),
    };
    Ok(json!({
        "public_key": key.public_key(),
        "seed": hex::encode(&key.seed()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_keys_are_reproducible() {
        let args = KeygenArgs {
            seed: Some("07".repeat(32)),
        };
        let a = run_keygen(&args).unwrap();
        let b = run_keygen(&args).unwrap();
        assert_eq!(a, b);
        assert_eq!(a["seed"], "07".repeat(32));
        assert_eq!(a["public_key"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn random_keys_differ() {
        let args = KeygenArgs { seed: None };
        assert_ne!(run_keygen(&args).unwrap(), run_keygen(&args).unwrap());
    }

    #[test]
    fn short_seed_is_rejected() {
        let args = KeygenArgs {
            seed: Some("abcd".into()),
        };
        assert!(run_keygen(&args).is_err());
    }
}
