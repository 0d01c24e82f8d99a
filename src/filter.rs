//! File inclusion rules for indexing runs.
//!
//! Decides whether a candidate file participates in indexing. Rules apply in
//! order, short-circuiting on the first exclusion:
//!
//! 1. hidden path segments (with a small dotfile allow-list),
//! 2. build/VCS/dependency directory deny-list (absolute — not overridable),
//! 3. file size ceiling,
//! 4. category gating against the caller's [`InclusionSpec`].

use std::path::Path;

use crate::classify::classify;
use crate::models::{DocumentCategory, InclusionSpec};

/// Files larger than this are never indexed.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MiB

/// Dotfiles worth indexing despite being hidden.
static ALLOWED_DOTFILES: &[&str] = &[".gitignore", ".env.example", ".dockerignore"];

/// Directory names whose presence anywhere in a path excludes the file
/// unconditionally. Matched per path segment, not by substring, so a project
/// named `distribution` is not caught by `dist`.
static SKIP_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "__pycache__",
    ".git",
    "venv",
    "env",
    ".venv",
    "target",
    "bin",
    "obj",
    "out",
];

/// Decide whether `path` should be indexed under `spec`.
///
/// Reads the file's size from the filesystem; a failed lookup (e.g. a broken
/// symlink) excludes the file rather than propagating an error.
pub fn should_include(path: &Path, spec: &InclusionSpec) -> bool {
    let size = std::fs::metadata(path).ok().map(|m| m.len());
    should_include_with_size(path, spec, size)
}

/// Same as [`should_include`], with the size supplied by the caller.
///
/// The walker uses this to avoid a second `stat` when it already holds the
/// entry's metadata. `None` means the size could not be determined and the
/// file is excluded.
pub fn should_include_with_size(path: &Path, spec: &InclusionSpec, size: Option<u64>) -> bool {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    // 1. Hidden segments, unless the filename itself is on the allow-list.
    let has_hidden_segment = path.components().any(|c| {
        c.as_os_str()
            .to_string_lossy()
            .starts_with('.')
    });
    if has_hidden_segment && !ALLOWED_DOTFILES.contains(&file_name.as_str()) {
        return false;
    }

    // 2. Deny-listed directories. Absolute: not even `all` overrides this.
    let denied = path
        .components()
        .any(|c| SKIP_DIRS.contains(&c.as_os_str().to_string_lossy().as_ref()));
    if denied {
        return false;
    }

    // 3. Size ceiling; unknown size excludes.
    match size {
        Some(s) if s <= MAX_FILE_SIZE => {}
        _ => return false,
    }

    // 4. Category gating.
    if spec.all {
        return true;
    }

    let (category, _) = classify(path);
    match category {
        DocumentCategory::Code => spec.code,
        DocumentCategory::Documentation => spec.docs,
        DocumentCategory::Configuration => spec.configs,
        DocumentCategory::Test => spec.tests,
        DocumentCategory::Other => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn spec_all() -> InclusionSpec {
        InclusionSpec {
            all: true,
            ..Default::default()
        }
    }

    fn spec_code_docs() -> InclusionSpec {
        InclusionSpec {
            code: true,
            docs: true,
            ..Default::default()
        }
    }

    fn include(path: &str, spec: &InclusionSpec) -> bool {
        should_include_with_size(&PathBuf::from(path), spec, Some(100))
    }

    #[test]
    fn test_hidden_excluded() {
        assert!(!include("project/.secret/config.py", &spec_all()));
        assert!(!include("project/.hidden.md", &spec_all()));
    }

    #[test]
    fn test_hidden_allowlist() {
        assert!(include("project/.gitignore", &spec_all()));
        assert!(include("project/.env.example", &spec_all()));
        assert!(include("project/.dockerignore", &spec_all()));
        // Allow-list names the file, not its directory.
        assert!(!include("project/.github/workflows/ci.yml", &spec_all()));
    }

    #[test]
    fn test_deny_list_absolute() {
        // Not overridable by the all flag.
        assert!(!include("project/node_modules/lib/index.js", &spec_all()));
        assert!(!include("project/.git/HEAD", &spec_all()));
        assert!(!include("project/target/debug/app.rs", &spec_code_docs()));
        assert!(!include("project/venv/lib/site.py", &spec_all()));
    }

    #[test]
    fn test_deny_list_matches_segments_not_substrings() {
        // `distribution` contains `dist` but is not a deny-listed segment.
        assert!(include("project/distribution/notes.md", &spec_code_docs()));
        assert!(!include("project/dist/notes.md", &spec_code_docs()));
    }

    #[test]
    fn test_size_ceiling() {
        let p = PathBuf::from("project/big.py");
        let spec = spec_all();
        assert!(should_include_with_size(&p, &spec, Some(MAX_FILE_SIZE)));
        assert!(!should_include_with_size(&p, &spec, Some(MAX_FILE_SIZE + 1)));
        // Failed size lookup excludes instead of erroring.
        assert!(!should_include_with_size(&p, &spec, None));
    }

    #[test]
    fn test_category_gating() {
        let spec = spec_code_docs();
        assert!(include("src/main.py", &spec));
        assert!(include("README.md", &spec));
        assert!(!include("config.yaml", &spec));
        assert!(!include("tests/test_foo.py", &spec));
        assert!(!include("data.bin", &spec));
    }

    #[test]
    fn test_all_override_bypasses_gating() {
        let spec = spec_all();
        assert!(include("config.yaml", &spec));
        assert!(include("tests/test_foo.py", &spec));
        assert!(include("data.bin", &spec));
    }

    #[test]
    fn test_no_flags_excludes_everything() {
        let spec = InclusionSpec::default();
        assert!(!include("src/main.py", &spec));
        assert!(!include("README.md", &spec));
        assert!(!include("config.yaml", &spec));
        assert!(!include("tests/test_foo.py", &spec));
        assert!(!include("data.bin", &spec));
    }

    #[test]
    fn test_missing_file_excluded() {
        // Size lookup fails for a file that does not exist.
        assert!(!should_include(
            &PathBuf::from("no_such_file_anywhere.py"),
            &spec_all()
        ));
    }
}
