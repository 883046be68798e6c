//! `linkproof verify`: Verify a claimed account and print the profile.

use clap::Args;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::{api_url, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Web3 name of the identity.
    #[arg(short, long)]
    pub name: String,

    /// Claimed username on the platform.
    #[arg(short, long)]
    pub username: String,

    /// Platform key (e.g. twitter, github).
    #[arg(short, long)]
    pub platform: String,

    /// Print the profile as JSON.
    #[arg(long)]
    pub json: bool,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
    kind: String,
}

pub async fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    let url = api_url(&args.endpoint, "/api/v1/profiles/verify");
    let client = reqwest::Client::new();
    let resp = client
        .get(&url)
        .query(&[
            ("web3Name", args.name.as_str()),
            ("username", args.username.as_str()),
            ("platform", args.platform.as_str()),
        ])
        .send()
        .await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let profile: BTreeMap<String, String> = r.json().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
                return Ok(());
            }
            println!(
                "{} on {} is VERIFIED for {}",
                args.username, args.platform, args.name
            );
            println!();
            for (platform, link) in &profile {
                println!("  {:<10} {}", platform, link);
            }
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!(
                    "verification failed (HTTP {}, {}): {}",
                    status,
                    err.kind,
                    err.error
                );
            } else {
                anyhow::bail!("verification failed (HTTP {})", status);
            }
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
