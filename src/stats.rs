//! Remote project statistics.
//!
//! Thin wrapper over the service's per-project stats endpoint; the server
//! owns the numbers, this module only formats them.

use anyhow::Result;

use crate::client::RagClient;
use crate::config::Config;

pub async fn run_stats(config: &Config, json: bool) -> Result<()> {
    let client = RagClient::new(config)?;
    let stats = client.get_stats().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Project statistics — {}", client.project_id());
    println!("==============================");
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
