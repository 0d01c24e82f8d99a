//! Core data models used throughout the toolkit.
//!
//! These types represent the files, inclusion rules, and statistics that flow
//! through the classification and indexing pipeline, plus the search results
//! returned by the retrieval service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Semantic category assigned to every candidate file.
///
/// Assignment is total: any path maps to exactly one category, with
/// unrecognized extensions degrading to [`DocumentCategory::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Code,
    Documentation,
    Configuration,
    Test,
    Other,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Code => "code",
            DocumentCategory::Documentation => "documentation",
            DocumentCategory::Configuration => "configuration",
            DocumentCategory::Test => "test",
            DocumentCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-file metadata captured by the walker at enumeration time.
///
/// Immutable once constructed. The upload step re-reads file content, so a
/// file that vanishes between enumeration and upload surfaces as a per-item
/// upload failure, not a walker failure.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub category: DocumentCategory,
    /// Present only when `category == Code` and the extension is recognized.
    pub language: Option<&'static str>,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub project_id: String,
}

/// Caller-supplied category flags controlling which files are indexed.
#[derive(Debug, Clone, Copy, Default)]
pub struct InclusionSpec {
    pub code: bool,
    pub docs: bool,
    pub configs: bool,
    pub tests: bool,
    /// Bypasses category gating entirely. Hidden-path, deny-list, and size
    /// exclusions still apply.
    pub all: bool,
}

impl InclusionSpec {
    /// Human-readable summary of the active flags, e.g. `"code, docs"`.
    pub fn describe(&self) -> String {
        if self.all {
            return "all".to_string();
        }
        let mut parts = Vec::new();
        if self.code {
            parts.push("code");
        }
        if self.docs {
            parts.push("docs");
        }
        if self.configs {
            parts.push("configs");
        }
        if self.tests {
            parts.push("tests");
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// The unit the upload batcher schedules: a file plus its metadata.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub path: PathBuf,
    pub metadata: FileMetadata,
}

/// Accumulated results of one indexing run.
///
/// Owned by a single run and finalized before being returned. The by-category
/// map counts *processed* items: a failed upload still increments its
/// category's tally, so `by_category` sums to `total_files`, not `successful`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexingStats {
    pub total_files: u64,
    pub successful: u64,
    pub failed: u64,
    pub by_category: BTreeMap<DocumentCategory, u64>,
}

/// Search mode requested from the retrieval service.
///
/// The service exposes no dedicated hybrid endpoint; `Hybrid` is treated as
/// an alias of `Semantic` at this boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Semantic,
    Hybrid,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Semantic => "semantic",
            SearchMode::Hybrid => "hybrid",
        }
    }
}

/// A ranked search result returned by the retrieval service.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub rank: usize,
    pub source: String,
    pub excerpt: String,
    pub score: Option<f64>,
    pub file_type: Option<String>,
    pub language: Option<String>,
}
