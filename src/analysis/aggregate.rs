use regex::Regex;

use crate::patterns::matches_any;
use crate::types::{CommitMap, DiffRecord, FileIndex};

/// Folds a commit map into per-file/per-function statistics.
///
/// Commits are split at `cutoff_percent` of the history (by age): commits
/// inside the measured window feed the ranking counters, commits past it
/// only count "later bugfixes" against files and functions that were
/// already seen — that holdout is what the prediction report scores the
/// ranking fields against. The measured window is folded first so the
/// "already seen" check does not depend on map iteration order.
pub fn build_file_index(
    commits: &CommitMap,
    cutoff_percent: usize,
    bugfix_patterns: &[Regex],
    filetype_filters: &[Regex],
) -> FileIndex {
    let max_age = commits.len();
    let cutoff = (max_age as f32 * (cutoff_percent as f32 / 100.0)) as i32;
    let mut index = FileIndex::new(max_age.saturating_sub(1));

    // Measured window.
    for records in commits.values() {
        if past_cutoff(records, cutoff) {
            continue;
        }
        for record in records {
            if matches_any(filetype_filters, &record.file) {
                continue;
            }
            let bug = if matches_any(bugfix_patterns, &record.message) {
                1.0
            } else {
                0.0
            };
            let aged = round2(record.age as f32 / max_age as f32);
            let aged_bug = round2(bug * record.age as f32 / max_age as f32);
            index.add_file(
                &record.file,
                1.0,
                bug,
                aged,
                aged_bug,
                (record.age, record.age),
            );
            for function in &record.functions {
                index.add_function(
                    &record.file,
                    function,
                    1.0,
                    bug,
                    0.0,
                    0.0,
                    (record.age, record.age),
                );
            }
        }
    }

    // Holdout window.
    for records in commits.values() {
        if !past_cutoff(records, cutoff) {
            continue;
        }
        for record in records {
            if matches_any(filetype_filters, &record.file) {
                continue;
            }
            if !matches_any(bugfix_patterns, &record.message) {
                continue;
            }
            // A fix on a file or function first seen past the cutoff is
            // ignored: the ranking could never have predicted it.
            let Some(file) = index.files.get_mut(&record.file) else {
                continue;
            };
            index.total_later_bugfixes += 1;
            file.later_bugfixes += 1;
            for function in &record.functions {
                if let Some(f) = file.functions.get_mut(function) {
                    file.later_function_bugfixes += 1;
                    f.later_bugfixes += 1;
                }
            }
        }
    }

    index
}

/// All records of a commit share its age; an empty commit belongs to the
/// measured window (it contributes nothing either way).
fn past_cutoff(records: &[DiffRecord], cutoff: i32) -> bool {
    records.first().map(|r| r.age > cutoff).unwrap_or(false)
}

fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(file: &str, functions: &[&str], age: i32, message: &str) -> DiffRecord {
        DiffRecord {
            file: file.to_string(),
            functions: functions.iter().map(|s| s.to_string()).collect(),
            age,
            message: message.to_string(),
        }
    }

    fn bugfix_patterns() -> Vec<Regex> {
        vec![Regex::new(r"(?i)fix").unwrap()]
    }

    /// Four commits: three measured (ages 0..2 with a 60% cutoff), one
    /// holdout bugfix at age 3.
    fn sample_commits() -> CommitMap {
        let mut map = HashMap::new();
        map.insert(
            "c0".to_string(),
            vec![record("src/cart.js", &["checkout"], 0, "initial import")],
        );
        map.insert(
            "c1".to_string(),
            vec![
                record("src/cart.js", &["checkout"], 1, "fix checkout rounding"),
                record("src/user.js", &[], 1, "fix checkout rounding"),
            ],
        );
        map.insert(
            "c2".to_string(),
            vec![record("src/user.js", &["login"], 2, "add login")],
        );
        map.insert(
            "c3".to_string(),
            vec![record("src/cart.js", &["checkout"], 3, "fix cart again")],
        );
        map
    }

    #[test]
    fn test_measured_counters() {
        let index = build_file_index(&sample_commits(), 60, &bugfix_patterns(), &[]);
        let cart = &index.files["src/cart.js"];
        assert_eq!(cart.freq, 2.0, "two measured changes");
        assert_eq!(cart.bug_freq, 1.0, "one measured bugfix");
        assert_eq!(cart.oldest_newest, (0, 1));
        assert_eq!(cart.functions["checkout"].freq, 2.0);
    }

    #[test]
    fn test_holdout_bugfix_accounting() {
        let index = build_file_index(&sample_commits(), 60, &bugfix_patterns(), &[]);
        assert_eq!(index.total_later_bugfixes, 1);
        let cart = &index.files["src/cart.js"];
        assert_eq!(cart.later_bugfixes, 1);
        assert_eq!(cart.later_function_bugfixes, 1);
        assert_eq!(cart.functions["checkout"].later_bugfixes, 1);
        assert_eq!(index.files["src/user.js"].later_bugfixes, 0);
    }

    #[test]
    fn test_holdout_fix_on_unseen_file_is_ignored() {
        let mut map = sample_commits();
        map.insert(
            "c4".to_string(),
            vec![record("src/new.js", &[], 4, "fix brand new file")],
        );
        let index = build_file_index(&map, 60, &bugfix_patterns(), &[]);
        assert!(!index.files.contains_key("src/new.js"));
    }

    #[test]
    fn test_filetype_filter_excludes_everywhere() {
        let filters = vec![Regex::new(r"(?i)\.md$").unwrap()];
        let mut map = sample_commits();
        map.insert(
            "c5".to_string(),
            vec![record("README.md", &[], 0, "fix typo")],
        );
        let index = build_file_index(&map, 60, &bugfix_patterns(), &filters);
        assert!(!index.files.contains_key("README.md"));
    }

    #[test]
    fn test_full_cutoff_has_no_holdout() {
        let index = build_file_index(&sample_commits(), 100, &bugfix_patterns(), &[]);
        assert_eq!(index.total_later_bugfixes, 0);
        // The age-3 fix is now part of the measured window.
        assert_eq!(index.files["src/cart.js"].freq, 3.0);
    }

    #[test]
    fn test_aged_counters_rounded_to_two_decimals() {
        let index = build_file_index(&sample_commits(), 100, &bugfix_patterns(), &[]);
        let user = &index.files["src/user.js"];
        // ages 1 and 2 over 4 commits: 0.25 + 0.5
        assert!((user.aged_freq - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_history() {
        let index = build_file_index(&HashMap::new(), 50, &bugfix_patterns(), &[]);
        assert!(index.files.is_empty());
        assert_eq!(index.max_age, 0);
    }
}
