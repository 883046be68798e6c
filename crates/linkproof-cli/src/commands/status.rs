//! `linkproof status`: Query the status of a running node.

use clap::Args;
use serde::Deserialize;

use super::{api_url, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    version: String,
    ledger_connected: bool,
    platforms: usize,
    attester_keys: usize,
    uptime_secs: u64,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let url = api_url(&args.endpoint, "/api/v1/status");
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let status: StatusResponse = r.json().await?;
            println!("Node Status:");
            println!("  Version:        {}", status.version);
            println!(
                "  Ledger:         {}",
                if status.ledger_connected { "connected" } else { "disconnected" }
            );
            println!("  Platforms:      {}", status.platforms);
            println!("  Attester keys:  {}", status.attester_keys);
            println!("  Uptime:         {}s", status.uptime_secs);
        }
        Ok(r) => {
            anyhow::bail!("node returned HTTP {}", r.status());
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
            println!();
            println!("Is the node running? Start it with: linkproof-node");
        }
    }

    Ok(())
}
