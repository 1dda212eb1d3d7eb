//! The two on-disk pattern files shared by the server and the analyzer:
//! which commit messages count as bugfixes, and which file names are
//! dropped from the analysis entirely.

use regex::Regex;
use std::path::Path;

pub const BUGFIX_PATTERN_FILE: &str = "regex_recognized_bugfixes.json";
pub const FILETYPE_PATTERN_FILE: &str = "regex_filtered_file_types.json";

/// Bugfix indicators observed across common commit conventions
/// (conventional-commit `fix:`, `fix(scope):`, plain `bug`/`hotfix`, and
/// ticket-style `line-NNN` references).
const DEFAULT_BUGFIX_PATTERNS: &[&str] = &[
    r"(?i)line-[0-9]+",
    r"(?i)bug",
    r"(?i)hotfix",
    r"(?i)fix:",
    r"(?i)fix(.*):",
    r"(?i)bugfix",
    r"(?i)[ \n]fix ",
];

/// Data and doc files change for non-code reasons and drown out the signal.
const DEFAULT_FILETYPE_FILTERS: &[&str] = &[r"(?i).json$", r"(?i).md$"];

/// Loads bugfix indicator patterns from `dir`, falling back to the
/// built-in set when the file is missing or holds an empty list.
pub fn load_bugfix_patterns(dir: &Path) -> Result<Vec<Regex>, String> {
    load_pattern_file(&dir.join(BUGFIX_PATTERN_FILE), DEFAULT_BUGFIX_PATTERNS)
}

/// Loads filetype exclusion patterns from `dir`, same fallback rules.
pub fn load_filetype_filters(dir: &Path) -> Result<Vec<Regex>, String> {
    load_pattern_file(&dir.join(FILETYPE_PATTERN_FILE), DEFAULT_FILETYPE_FILTERS)
}

fn load_pattern_file(path: &Path, defaults: &[&str]) -> Result<Vec<Regex>, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return compile_all(defaults.iter().copied()),
    };
    let patterns: Vec<String> = serde_json::from_str(&raw)
        .map_err(|e| format!("{}: not a JSON list of strings: {e}", path.display()))?;
    if patterns.is_empty() {
        return compile_all(defaults.iter().copied());
    }
    compile_all(patterns.iter().map(|s| s.as_str()))
}

fn compile_all<'a>(patterns: impl Iterator<Item = &'a str>) -> Result<Vec<Regex>, String> {
    patterns
        .map(|p| Regex::new(p).map_err(|e| format!("invalid pattern '{p}': {e}")))
        .collect()
}

/// Writes one pattern file as a JSON list holding at most one string:
/// the raw query parameter when present, an empty list otherwise.
pub fn write_pattern_file(dir: &Path, file: &str, pattern: Option<&str>) -> Result<(), String> {
    let list: Vec<&str> = pattern.into_iter().collect();
    let json = serde_json::to_string(&list).map_err(|e| e.to_string())?;
    let path = dir.join(file);
    std::fs::write(&path, json).map_err(|e| format!("failed to write {}: {e}", path.display()))
}

/// True when any pattern matches `text`.
pub fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let patterns = load_bugfix_patterns(dir.path()).unwrap();
        assert_eq!(patterns.len(), DEFAULT_BUGFIX_PATTERNS.len());
        assert!(matches_any(&patterns, "hotfix: broken login"));
        assert!(matches_any(&patterns, "fix(parser): trailing comma"));
        assert!(!matches_any(&patterns, "add new feature"));
    }

    #[test]
    fn test_empty_list_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FILETYPE_PATTERN_FILE), "[]").unwrap();
        let filters = load_filetype_filters(dir.path()).unwrap();
        assert!(matches_any(&filters, "package.json"));
        assert!(matches_any(&filters, "README.md"));
        assert!(!matches_any(&filters, "src/app.js"));
    }

    #[test]
    fn test_file_patterns_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(BUGFIX_PATTERN_FILE),
            r#"["(?i)oops"]"#,
        )
        .unwrap();
        let patterns = load_bugfix_patterns(dir.path()).unwrap();
        assert_eq!(patterns.len(), 1);
        assert!(matches_any(&patterns, "Oops, revert that"));
        assert!(!matches_any(&patterns, "fix: something"), "defaults must not apply");
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(BUGFIX_PATTERN_FILE), r#"["("]"#).unwrap();
        assert!(load_bugfix_patterns(dir.path()).is_err());
    }

    #[test]
    fn test_write_pattern_file_mirrors_query_parameter() {
        let dir = tempfile::tempdir().unwrap();
        write_pattern_file(dir.path(), BUGFIX_PATTERN_FILE, Some("(?i)fix")).unwrap();
        let raw = std::fs::read_to_string(dir.path().join(BUGFIX_PATTERN_FILE)).unwrap();
        let list: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(list, vec!["(?i)fix".to_string()]);

        write_pattern_file(dir.path(), BUGFIX_PATTERN_FILE, None).unwrap();
        let raw = std::fs::read_to_string(dir.path().join(BUGFIX_PATTERN_FILE)).unwrap();
        let list: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert!(list.is_empty(), "absent parameter writes an empty list");
    }
}
