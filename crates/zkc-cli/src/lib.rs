//! # zkc-cli: Operator Command-Line Interface
//!
//! ## Subcommands
//!
//! - `keygen` Ed25519 key pair, random or from a seed
//! - `encode` commitment of one credential file, optionally with its
//!   issuer metadata record
//! - `sign` signature over a canonical authority message
//! - `root` commitment store root over a file of credentials
//!
//! Handlers return JSON values; `main` prints them. Credential files are
//! JSON, or YAML when the extension is `.yaml` or `.yml`.

pub mod encode;
pub mod input;
pub mod keygen;
pub mod root;
pub mod sign;
