//! # RAG Toolkit
//!
//! A client-side toolkit for a document indexing/retrieval service: it
//! classifies local files, uploads them to a remote retrieval API, issues
//! search queries against that API, and manages the lifecycle of the backing
//! service via docker compose.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────────┐   ┌──────────────┐   ┌────────────┐
//! │  Walker  │──▶│ Classify+Filter │──▶│ Upload Batch │──▶│  RAG API   │
//! │ walkdir  │   │  pure functions │   │  concurrent  │   │  (remote)  │
//! └──────────┘   └─────────────────┘   └──────────────┘   └─────┬──────┘
//!                                                               │
//!                                      ┌────────────────────────┤
//!                                      ▼                        ▼
//!                                ┌──────────┐             ┌──────────┐
//!                                │  search  │             │  server  │
//!                                │  stats   │             │ lifecycle│
//!                                └──────────┘             └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rag server start                      # bring up the backing service
//! rag index --path . --include-code --include-docs
//! rag search "authentication flow"
//! rag explore                           # interactive REPL
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`classify`] | Path → category/language classification |
//! | [`filter`] | File inclusion rules |
//! | [`walker`] | Project directory enumeration |
//! | [`indexer`] | Batched concurrent upload pipeline |
//! | [`client`] | Retrieval service HTTP client |
//! | [`progress`] | Injected progress reporting |
//! | [`lifecycle`] | Backing-service lifecycle via docker compose |

pub mod classify;
pub mod client;
pub mod config;
pub mod explore;
pub mod filter;
pub mod indexer;
pub mod lifecycle;
pub mod models;
pub mod progress;
pub mod search;
pub mod stats;
pub mod walker;
