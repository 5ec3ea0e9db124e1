//! `zkc encode`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};
use zkc_vc::{encode, Credential, MetadataRecord};

use crate::input::load_document;

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Credential file (JSON or YAML).
    #[arg(long)]
    pub file: PathBuf,

    /// Issuer metadata record (JSON or YAML) committed in place of the
    /// credential's own metadata and verification blocks.
    #[arg(long)]
    pub record: Option<PathBuf>,
}

pub fn run_encode(args: &EncodeArgs) -> Result<Value> {
    let document = load_document(&args.file)?;
    let mut credential = Credential::from_value(&document)
        .with_context(|| format!("invalid credential in {}", args.file.display()))?;

    let record = match &args.record {
        Some(path) => {
            let raw = load_document(path)?;
            let record = MetadataRecord::from_json(&raw)
                .with_context(|| format!("invalid metadata record in {}", path.display()))?;
            credential = record.apply_to(credential);
            Some(record)
        }
        None => None,
    };

    let commitment = encode(&credential);
    tracing::debug!(id = %credential.id, %commitment, "credential encoded");
    let mut out = json!({
        "id": credential.id,
        "commitment": commitment,
    });
    if let Some(record) = record {
        out["record"] = record.to_json();
    }
    Ok(out)
}
