//! Interactive exploration REPL.
//!
//! A small line-oriented shell over the retrieval client: search, similarity
//! lookup, stats, and health from one prompt. Reads stdin line by line; the
//! remote calls are the only async work, so blocking on stdin is fine here.

use anyhow::{bail, Result};
use std::io::{BufRead, Write};

use crate::client::RagClient;
use crate::config::Config;
use crate::models::SearchMode;
use crate::search::print_result;

pub async fn run_explore(config: &Config) -> Result<()> {
    let client = RagClient::new(config)?;

    if !client.health().await {
        bail!(
            "RAG service is not accessible at {}. Start it with: rag server start",
            config.api.url
        );
    }

    println!("RAG interactive explorer — project '{}'", client.project_id());
    println!("Type 'help' for commands, 'quit' to exit.");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("rag> ");
        std::io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break, // EOF
        };
        let command = line.trim();

        match command {
            "" => continue,
            "quit" | "exit" | "q" => break,
            "help" => print_help(),
            "stats" => match client.get_stats().await {
                Ok(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
                Err(e) => println!("error: {:#}", e),
            },
            "health" => {
                if client.health().await {
                    println!("RAG service: healthy");
                } else {
                    println!("RAG service: unhealthy");
                }
            }
            _ if command.starts_with("search ") => {
                let query = command["search ".len()..].trim();
                match client
                    .search(query, SearchMode::Semantic, config.search.limit, &[], &[])
                    .await
                {
                    Ok(results) if results.is_empty() => println!("No results."),
                    Ok(results) => {
                        for result in &results {
                            print_result(result);
                        }
                    }
                    Err(e) => println!("error: {:#}", e),
                }
            }
            _ if command.starts_with("similar ") => {
                let file = command["similar ".len()..].trim();
                match client.find_similar(file, config.search.limit).await {
                    Ok(results) if results.is_empty() => println!("No results."),
                    Ok(results) => {
                        for result in &results {
                            print_result(result);
                        }
                    }
                    Err(e) => println!("error: {:#}", e),
                }
            }
            _ => println!("Unknown command. Type 'help' for available commands."),
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        "\
Available commands:
  search <query>    search indexed documents
  similar <file>    find documents similar to a file
  stats             show project statistics
  health            check RAG service health
  help              show this help message
  quit              exit"
    );
}
