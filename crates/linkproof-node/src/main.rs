//! Linkproof Node: entry point.
//!
//! Serves profile verification over HTTP with configuration from a TOML file
//! or defaults.

mod api;
mod config;
mod node;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::LinkproofConfig;
use linkproof_core::TrustedAttesters;
use node::LinkproofNode;

/// Linkproof Node
#[derive(Parser, Debug)]
#[command(name = "linkproof-node", version, about = "Linkproof profile verification node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "linkproof.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the ledger snapshot file.
    #[arg(long)]
    ledger_snapshot: Option<PathBuf>,

    /// Comma-separated attester DIDs trusted for every platform.
    #[arg(long, env = "TRUSTED_ATTESTER_URIS")]
    trusted_attesters: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(config: &LinkproofConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        let config = LinkproofConfig::default();
        config.save(&args.config)?;
        println!("wrote default config to {}", args.config.display());
        return Ok(());
    }

    // Load configuration
    let mut config = LinkproofConfig::load(&args.config)?;

    // Apply CLI and environment overrides
    if let Some(api_port) = args.api_port {
        config.api.port = api_port;
    }
    if let Some(snapshot) = args.ledger_snapshot {
        config.ledger.snapshot_path = Some(snapshot);
    }
    if let Some(ref list) = args.trusted_attesters {
        config.verification.trusted_attesters = TrustedAttesters::parse(list);
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_tracing(&config);
    tracing::info!("Linkproof Node v{}", env!("CARGO_PKG_VERSION"));

    let node = LinkproofNode::new(config)?;
    node.start().await?;

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("received shutdown signal"),
            Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
        }
    };

    tokio::select! {
        result = node.serve() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP API server error");
            }
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
        }
    }

    node.shutdown().await?;
    tracing::info!("Linkproof node exited cleanly");
    Ok(())
}
