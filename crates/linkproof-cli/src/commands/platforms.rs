//! `linkproof platforms`: List the platforms a node can verify.

use clap::Args;
use serde::Deserialize;

use super::{api_url, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct PlatformsArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlatformInfo {
    name: String,
    title: String,
    schema_id: String,
    contents_key: String,
}

#[derive(Deserialize)]
struct PlatformsResponse {
    platforms: Vec<PlatformInfo>,
    count: usize,
}

pub async fn run(args: &PlatformsArgs) -> anyhow::Result<()> {
    let url = api_url(&args.endpoint, "/api/v1/platforms");
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: PlatformsResponse = r.json().await?;
            println!("Supported platforms ({}):", data.count);
            for p in &data.platforms {
                println!(
                    "  {:<10} {:<10} key={:<12} schema={}",
                    p.name, p.title, p.contents_key, p.schema_id
                );
            }
        }
        Ok(r) => {
            anyhow::bail!("node returned HTTP {}", r.status());
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
