//! # RAG Toolkit CLI (`rag`)
//!
//! The `rag` binary is the primary interface for the toolkit. It provides
//! commands for indexing project files into a remote retrieval service,
//! searching them, inspecting project statistics, interactive exploration,
//! and managing the backing service's lifecycle.
//!
//! ## Usage
//!
//! ```bash
//! rag --config ./config/rag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rag index` | Classify and upload project files in concurrent batches |
//! | `rag search "<query>"` | Search indexed documents |
//! | `rag stats` | Show server-side project statistics |
//! | `rag explore` | Interactive REPL (search/similar/stats/health) |
//! | `rag server <op>` | start/stop/restart/status/logs/health/validate |
//!
//! ## Examples
//!
//! ```bash
//! # Bring up the local deployment and wait for health
//! rag server start --deployment local
//!
//! # Index code and docs from the current directory
//! rag index --path . --include-code --include-docs
//!
//! # Search with a type filter
//! rag search "error handling" --limit 10 --file-types code
//!
//! # Tail logs for one service
//! rag server logs --service rag-api --tail 50
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rag_toolkit::models::InclusionSpec;
use rag_toolkit::progress::ProgressMode;
use rag_toolkit::{config, explore, indexer, lifecycle, search, stats};

/// RAG Toolkit CLI — index project files into a remote retrieval service
/// and search them.
#[derive(Parser)]
#[command(
    name = "rag",
    about = "RAG Toolkit — a client-side toolkit for document indexing and retrieval",
    version,
    long_about = "RAG Toolkit classifies local project files, uploads them to a remote \
    retrieval API in bounded concurrent batches, issues search queries against that API, \
    and manages the lifecycle of the backing docker-compose deployment."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/rag.toml`. A missing file falls back to
    /// built-in defaults (API at http://localhost:8000, project "default").
    #[arg(long, global = true, default_value = "./config/rag.toml")]
    config: PathBuf,

    /// Output machine-readable JSON instead of human-formatted text.
    #[arg(long, global = true)]
    json: bool,

    /// Progress reporting on stderr: auto (TTY detection), human, json, off.
    #[arg(long, global = true, default_value = "auto")]
    progress: String,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Index project files into the retrieval service.
    ///
    /// Walks the project directory, classifies each file (code,
    /// documentation, configuration, test), applies exclusion rules, and
    /// uploads the selection in sequential batches with concurrent uploads
    /// inside each batch. Refuses to run when the service is unreachable.
    Index {
        /// Project directory to index.
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Process subdirectories recursively.
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        recursive: bool,

        /// Include source code files.
        #[arg(long)]
        include_code: bool,

        /// Include documentation files.
        #[arg(long)]
        include_docs: bool,

        /// Include configuration files.
        #[arg(long)]
        include_configs: bool,

        /// Include test files.
        #[arg(long)]
        include_tests: bool,

        /// Include every category (exclusion rules still apply).
        #[arg(long)]
        include_all: bool,

        /// Override the batch size from config (files uploaded concurrently).
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Search indexed documents.
    ///
    /// Queries the retrieval service and prints ranked results with
    /// relevance scores and excerpts.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,

        /// Use hybrid search. The service currently answers hybrid queries
        /// with plain semantic search.
        #[arg(long)]
        hybrid: bool,

        /// Filter by file types (e.g. code, documentation).
        #[arg(long, num_args = 1..)]
        file_types: Vec<String>,

        /// Filter by programming languages (e.g. python, rust).
        #[arg(long, num_args = 1..)]
        languages: Vec<String>,
    },

    /// Show server-side statistics for the configured project.
    Stats,

    /// Interactive exploration REPL.
    ///
    /// Offers `search`, `similar`, `stats`, and `health` from one prompt.
    Explore,

    /// Manage the backing service deployment.
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },
}

/// Server lifecycle subcommands.
#[derive(Subcommand)]
enum ServerAction {
    /// Start the deployment and wait for the health endpoint.
    Start {
        /// Deployment profile: local, tei, openai, or production.
        #[arg(long, short)]
        deployment: Option<String>,
    },
    /// Stop the deployment.
    Stop {
        #[arg(long, short)]
        deployment: Option<String>,
    },
    /// Stop, pause briefly, and start again.
    Restart {
        #[arg(long, short)]
        deployment: Option<String>,
    },
    /// Show compose service states and API health.
    Status {
        #[arg(long, short)]
        deployment: Option<String>,
    },
    /// Print recent service logs.
    Logs {
        #[arg(long, short)]
        deployment: Option<String>,

        /// Restrict to a single compose service.
        #[arg(long)]
        service: Option<String>,

        /// Number of log lines to show.
        #[arg(long, default_value_t = 100)]
        tail: u32,
    },
    /// Check the API health endpoint. Exit code 1 when unhealthy.
    Health {
        #[arg(long, short)]
        deployment: Option<String>,
    },
    /// Validate prerequisites and run an upload/search round-trip probe.
    Validate {
        #[arg(long, short)]
        deployment: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    let progress_mode = match cli.progress.as_str() {
        "auto" => ProgressMode::default_for_tty(),
        "human" => ProgressMode::Human,
        "json" => ProgressMode::Json,
        "off" => ProgressMode::Off,
        other => anyhow::bail!("Unknown progress mode: {}. Use auto, human, json, or off.", other),
    };

    match cli.command {
        Commands::Index {
            path,
            recursive,
            include_code,
            include_docs,
            include_configs,
            include_tests,
            include_all,
            batch_size,
        } => {
            let spec = InclusionSpec {
                code: include_code,
                docs: include_docs,
                configs: include_configs,
                tests: include_tests,
                all: include_all,
            };
            let reporter = progress_mode.reporter();
            indexer::run_index(
                &cfg,
                &path,
                recursive,
                &spec,
                batch_size,
                reporter.as_ref(),
                cli.json,
            )
            .await?;
        }
        Commands::Search {
            query,
            limit,
            hybrid,
            file_types,
            languages,
        } => {
            search::run_search(&cfg, &query, hybrid, limit, &file_types, &languages, cli.json)
                .await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg, cli.json).await?;
        }
        Commands::Explore => {
            explore::run_explore(&cfg).await?;
        }
        Commands::Server { action } => match action {
            ServerAction::Start { deployment } => {
                lifecycle::ServerManager::new(&cfg, deployment.as_deref())?
                    .start()
                    .await?;
            }
            ServerAction::Stop { deployment } => {
                lifecycle::ServerManager::new(&cfg, deployment.as_deref())?
                    .stop()
                    .await?;
            }
            ServerAction::Restart { deployment } => {
                lifecycle::ServerManager::new(&cfg, deployment.as_deref())?
                    .restart()
                    .await?;
            }
            ServerAction::Status { deployment } => {
                lifecycle::ServerManager::new(&cfg, deployment.as_deref())?
                    .status(cli.json)
                    .await?;
            }
            ServerAction::Logs {
                deployment,
                service,
                tail,
            } => {
                lifecycle::ServerManager::new(&cfg, deployment.as_deref())?
                    .logs(service.as_deref(), tail)
                    .await?;
            }
            ServerAction::Health { deployment } => {
                lifecycle::ServerManager::new(&cfg, deployment.as_deref())?
                    .health(cli.json)
                    .await?;
            }
            ServerAction::Validate { deployment } => {
                lifecycle::ServerManager::new(&cfg, deployment.as_deref())?
                    .validate()
                    .await?;
            }
        },
    }

    Ok(())
}
