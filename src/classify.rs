//! Path-based document classification.
//!
//! Maps a file path to a [`DocumentCategory`] and, for code files, a
//! programming-language tag. Classification is a pure function of the path
//! string: no filesystem access, deterministic, and total — every path maps
//! to exactly one category, with unknown extensions falling back to
//! [`DocumentCategory::Other`].
//!
//! Test detection runs first and wins over extension lookup, so
//! `tests/helpers.py` classifies as `Test`, not `Code`. The language tag is
//! still derived from the extension in that case.

use std::path::Path;

use crate::models::DocumentCategory;

/// Substrings (checked case-insensitively against the full path) that mark a
/// file as test-related regardless of its extension.
static TEST_PATTERNS: &[&str] = &[
    "test_",
    "_test",
    ".test.",
    ".spec.",
    "tests/",
    "test/",
    "__tests__/",
    "spec/",
    "cypress/",
    "e2e/",
];

/// Extensions classified as source code.
static CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "tsx", "jsx", "java", "cpp", "c", "h", "cs", "php", "rb", "go", "rs",
    "swift", "kt", "scala", "r", "m", "mm", "sql", "sh", "bash", "ps1", "lua", "pl",
];

/// Extensions classified as documentation.
static DOC_EXTENSIONS: &[&str] = &["md", "txt", "rst", "adoc", "tex", "doc", "docx", "pdf"];

/// Extensions classified as configuration.
static CONFIG_EXTENSIONS: &[&str] = &[
    "json", "yaml", "yml", "toml", "ini", "conf", "cfg", "env", "properties", "xml", "plist",
];

/// Extension → language tag for code files. Absent entry means no tag.
static LANGUAGE_MAP: &[(&str, &str)] = &[
    ("py", "python"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("jsx", "javascript"),
    ("java", "java"),
    ("cpp", "cpp"),
    ("c", "c"),
    ("h", "c"),
    ("cs", "csharp"),
    ("php", "php"),
    ("rb", "ruby"),
    ("go", "go"),
    ("rs", "rust"),
    ("swift", "swift"),
    ("kt", "kotlin"),
    ("scala", "scala"),
    ("r", "r"),
    ("m", "objective-c"),
    ("sql", "sql"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("ps1", "powershell"),
];

/// Classify a path into a category and an optional language tag.
///
/// The language tag is only populated for [`DocumentCategory::Code`] files,
/// or for [`DocumentCategory::Test`] files whose extension maps to a known
/// language (a Python test is still Python).
pub fn classify(path: &Path) -> (DocumentCategory, Option<&'static str>) {
    let path_lower = path.to_string_lossy().to_lowercase();
    let ext = extension_lowercase(path);

    // Test indicators take precedence over extension-based classification.
    if TEST_PATTERNS.iter().any(|p| path_lower.contains(p)) {
        return (DocumentCategory::Test, language_for(ext.as_deref()));
    }

    let category = match ext.as_deref() {
        Some(e) if CODE_EXTENSIONS.contains(&e) => DocumentCategory::Code,
        Some(e) if DOC_EXTENSIONS.contains(&e) => DocumentCategory::Documentation,
        Some(e) if CONFIG_EXTENSIONS.contains(&e) => DocumentCategory::Configuration,
        _ => DocumentCategory::Other,
    };

    let language = if category == DocumentCategory::Code {
        language_for(ext.as_deref())
    } else {
        None
    };

    (category, language)
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

fn language_for(ext: Option<&str>) -> Option<&'static str> {
    let ext = ext?;
    LANGUAGE_MAP
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn classify_str(s: &str) -> (DocumentCategory, Option<&'static str>) {
        classify(&PathBuf::from(s))
    }

    #[test]
    fn test_code_with_language() {
        assert_eq!(
            classify_str("src/main.py"),
            (DocumentCategory::Code, Some("python"))
        );
        assert_eq!(
            classify_str("lib/util.rs"),
            (DocumentCategory::Code, Some("rust"))
        );
        assert_eq!(
            classify_str("app/component.tsx"),
            (DocumentCategory::Code, Some("typescript"))
        );
    }

    #[test]
    fn test_code_without_language_entry() {
        // `.pl` is in the code set but has no language mapping.
        assert_eq!(classify_str("scripts/run.pl"), (DocumentCategory::Code, None));
        assert_eq!(classify_str("ui/view.mm"), (DocumentCategory::Code, None));
    }

    #[test]
    fn test_documentation_and_configuration() {
        assert_eq!(
            classify_str("README.md"),
            (DocumentCategory::Documentation, None)
        );
        assert_eq!(
            classify_str("config.yaml"),
            (DocumentCategory::Configuration, None)
        );
        assert_eq!(
            classify_str("settings.TOML"),
            (DocumentCategory::Configuration, None)
        );
    }

    #[test]
    fn test_pattern_wins_over_extension() {
        // A `.py` file under tests/ is Test, not Code — but keeps its language.
        assert_eq!(
            classify_str("tests/test_foo.py"),
            (DocumentCategory::Test, Some("python"))
        );
        assert_eq!(
            classify_str("src/auth.spec.ts"),
            (DocumentCategory::Test, Some("typescript"))
        );
        // Doc and config extensions under a test directory are Test too.
        assert_eq!(
            classify_str("e2e/fixtures.json"),
            (DocumentCategory::Test, None)
        );
    }

    #[test]
    fn test_pattern_case_insensitive() {
        assert_eq!(classify_str("Tests/Foo.java").0, DocumentCategory::Test);
        assert_eq!(classify_str("src/TEST_utils.go").0, DocumentCategory::Test);
    }

    #[test]
    fn test_unknown_degrades_to_other() {
        assert_eq!(classify_str("data.bin"), (DocumentCategory::Other, None));
        assert_eq!(classify_str("Makefile"), (DocumentCategory::Other, None));
        assert_eq!(classify_str(""), (DocumentCategory::Other, None));
        assert_eq!(
            classify_str("no_extension_file"),
            (DocumentCategory::Other, None)
        );
    }

    #[test]
    fn test_deterministic() {
        let p = PathBuf::from("src/server/handler.ts");
        assert_eq!(classify(&p), classify(&p));
    }

    #[test]
    fn test_extension_sets_disjoint() {
        // Order of set checks only matters if a set overlaps; assert they don't.
        for e in CODE_EXTENSIONS {
            assert!(!DOC_EXTENSIONS.contains(e), "{} in both code and docs", e);
            assert!(
                !CONFIG_EXTENSIONS.contains(e),
                "{} in both code and configs",
                e
            );
        }
        for e in DOC_EXTENSIONS {
            assert!(
                !CONFIG_EXTENSIONS.contains(e),
                "{} in both docs and configs",
                e
            );
        }
    }
}
