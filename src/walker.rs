//! Project directory enumeration.
//!
//! Walks a project root, applies the inclusion filter to every regular file,
//! and materializes the full worklist up front so the total file count is
//! known before any upload begins. Traversal order from the filesystem is
//! unspecified; the worklist is sorted by path so batch membership is
//! reproducible within a run.

use anyhow::{bail, Result};
use chrono::{DateTime, TimeZone, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

use crate::classify::classify;
use crate::config::Config;
use crate::filter::should_include_with_size;
use crate::models::{FileMetadata, InclusionSpec, WorkItem};

/// Enumerate the files under `root` that should be indexed.
///
/// Inclusion rules are evaluated against the path relative to `root`, so an
/// indexing run is unaffected by hidden or deny-listed ancestors of the root
/// itself. Files whose metadata cannot be read at enumeration time are
/// skipped with a warning; a file that vanishes after enumeration is a
/// per-item upload failure, not a walker failure.
pub fn walk(
    config: &Config,
    root: &Path,
    recursive: bool,
    spec: &InclusionSpec,
) -> Result<Vec<WorkItem>> {
    if !root.is_dir() {
        bail!("Project path does not exist: {}", root.display());
    }

    let exclude_set = build_globset(&config.indexing.exclude_globs)?;

    let mut walker = WalkDir::new(root);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut items = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            // Unreadable subtree: skip rather than aborting the run.
            Err(e) => {
                eprintln!("warning: skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);

        if exclude_set.is_match(relative) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                eprintln!("warning: could not stat {}: {}", path.display(), e);
                continue;
            }
        };

        if !should_include_with_size(relative, spec, Some(metadata.len())) {
            continue;
        }

        let (category, language) = classify(relative);
        items.push(WorkItem {
            path: path.to_path_buf(),
            metadata: FileMetadata {
                path: path.to_path_buf(),
                category,
                language,
                size: metadata.len(),
                last_modified: modified_time(&metadata),
                project_id: config.api.project_id.clone(),
            },
        });
    }

    // Sort for deterministic batch membership
    items.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(items)
}

fn modified_time(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    let modified = metadata
        .modified()
        .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
    let secs = modified
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
