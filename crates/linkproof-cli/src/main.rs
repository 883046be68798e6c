//! Linkproof CLI: query a running node for verified profiles.
//!
//! Subcommands: verify, platforms, status.

mod commands;

use clap::{Parser, Subcommand};

/// Linkproof: verify social links of named identities.
#[derive(Parser, Debug)]
#[command(name = "linkproof", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify a claimed account and print the identity's verified links.
    Verify(commands::verify::VerifyArgs),
    /// List the platforms the node can verify.
    Platforms(commands::platforms::PlatformsArgs),
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Verify(args) => commands::verify::run(args).await,
        Commands::Platforms(args) => commands::platforms::run(args).await,
        Commands::Status(args) => commands::status::run(args).await,
    }
}
