use anyhow::{bail, Result};

use crate::client::RagClient;
use crate::config::Config;
use crate::models::{SearchMode, SearchResult};

pub async fn run_search(
    config: &Config,
    query: &str,
    hybrid: bool,
    limit: Option<usize>,
    file_types: &[String],
    languages: &[String],
    json: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let client = RagClient::new(config)?;

    if !client.health().await {
        bail!(
            "RAG service is not accessible at {}. Start it with: rag server start",
            config.api.url
        );
    }

    let mode = if hybrid {
        SearchMode::Hybrid
    } else {
        SearchMode::Semantic
    };
    let limit = limit.unwrap_or(config.search.limit);

    let results = client
        .search(query, mode, limit, file_types, languages)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!("Found {} result(s) for '{}':", results.len(), query);
    println!();
    for result in &results {
        print_result(result);
    }

    Ok(())
}

pub fn print_result(result: &SearchResult) {
    println!("{}. {}", result.rank, result.source);

    if let Some(score) = result.score {
        println!("   relevance: {:.3} [{}]", score, score_bar(score));
    }

    if let Some(file_type) = &result.file_type {
        match &result.language {
            Some(lang) => println!("   type: {} ({})", file_type, lang),
            None => println!("   type: {}", file_type),
        }
    }

    let excerpt: String = result.excerpt.chars().take(200).collect();
    let ellipsis = if result.excerpt.chars().count() > 200 {
        "..."
    } else {
        ""
    };
    println!("   {}{}", excerpt, ellipsis);
    println!();
}

/// Ten-cell confidence bar for a relevance score in [0, 1].
fn score_bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 1.0) * 10.0) as usize;
    "█".repeat(filled) + &"░".repeat(10 - filled)
}
