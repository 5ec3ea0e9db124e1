//! # zkc CLI Entry Point

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkc_cli::encode::{run_encode, EncodeArgs};
use zkc_cli::keygen::{run_keygen, KeygenArgs};
use zkc_cli::root::{run_root, RootArgs};
use zkc_cli::sign::{run_sign, SignArgs};

/// Credential commitment tooling.
#[derive(Parser, Debug)]
#[command(name = "zkc", version, about)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 key pair.
    Keygen(KeygenArgs),
    /// Print the commitment of a credential file.
    Encode(EncodeArgs),
    /// Sign an authority message.
    Sign(SignArgs),
    /// Build a commitment store and print its root.
    Root(RootArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let output = match &cli.command {
        Commands::Keygen(args) => run_keygen(args)?,
        Commands::Encode(args) => run_encode(args)?,
        Commands::Sign(args) => run_sign(args)?,
        Commands::Root(args) => run_root(args)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
