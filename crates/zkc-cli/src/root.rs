//! `zkc root`
//!
//! Builds a commitment store from a file mapping identifiers to
//! credentials. Each credential's `id` defaults to its map key.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::{json, Value};
use zkc_vc::{CommitmentStore, Credential};

use crate::input::load_document;

#[derive(Args, Debug)]
pub struct RootArgs {
    /// File of `{id: credential}` (JSON or YAML).
    #[arg(long)]
    pub file: PathBuf,
}

pub fn run_root(args: &RootArgs) -> Result<Value> {
    let document = load_document(&args.file)?;
    let Value::Object(entries) = document else {
        bail!("{} must map identifiers to credentials", args.file.display());
    };

    let mut store = CommitmentStore::new();
    let mut commitments = BTreeMap::new();
    for (id, mut raw) in entries {
        if let Value::Object(obj) = &mut raw {
            obj.entry("id").or_insert_with(|| Value::String(id.clone()));
        }
        let credential =
            Credential::from_value(&raw).with_context(|| format!("invalid credential {id:?}"))?;
        let commitment = store
            .insert_credential(&credential)
            .with_context(|| format!("cannot store {id:?}"))?;
        commitments.insert(credential.id.to_string(), commitment);
    }

    let mut witnesses = BTreeMap::new();
    for id in commitments.keys() {
        let witness = store.witness(id)?;
        witnesses.insert(id.clone(), witness.siblings.len());
    }

    Ok(json!({
        "root": store.root(),
        "entries": store.len(),
        "commitments": commitments,
        "witness_sizes": witnesses,
    }))
}
