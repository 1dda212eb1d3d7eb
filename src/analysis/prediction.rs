use std::cmp::Ordering;

use regex::Regex;

use crate::analysis::aggregate::build_file_index;
use crate::factors::{field_name, FIELD_COUNT};
use crate::types::{CommitMap, FileIndex, FileStats};

/// Cutoff percentages swept by the multi analysis.
pub const MULTI_CUTOFFS: [usize; 15] = [5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75];

/// Top-of-ranking breakpoints (percent of files) the multi analysis samples.
pub const MULTI_BREAKPOINTS: [usize; 25] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25,
];

/// Breakpoints used by the single-cutoff `text` report.
pub const TEXT_BREAKPOINTS: [usize; 6] = [1, 5, 10, 25, 50, 75];

/// "If you had reviewed the top `top_percent` files of this ranking, you
/// would have caught `bugs_found_percent` of the holdout bugfixes."
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    pub top_percent: usize,
    pub bugs_found_percent: f32,
}

/// Scores one ranking field against the holdout bugfixes: sorts files by
/// the field (descending) and reports the cumulative share of later
/// bugfixes reached at each breakpoint.
pub fn predict_breakpoints(
    index: &FileIndex,
    field: usize,
    breakpoints: &[usize],
) -> Vec<PredictionRow> {
    let mut files: Vec<&FileStats> = index.files.values().collect();
    files.sort_by(|a, b| {
        b.field(field)
            .partial_cmp(&a.field(field))
            .unwrap_or(Ordering::Equal)
    });

    let boundaries: Vec<usize> = breakpoints.iter().map(|p| files.len() * p / 100).collect();
    let total = index.total_later_bugfixes as f32;

    let mut rows = Vec::with_capacity(breakpoints.len());
    let mut cumulative = 0.0_f32;
    let mut next = 0;

    for (i, file) in files.iter().enumerate() {
        if total > 0.0 {
            cumulative += ((file.later_bugfixes as f32 / total) * 10_000.0).round() / 100.0;
        }
        while next < boundaries.len() && i == boundaries[next] {
            rows.push(PredictionRow {
                top_percent: breakpoints[next],
                bugs_found_percent: cumulative,
            });
            next += 1;
        }
    }

    rows
}

/// Averaged prediction quality of one ranking field across the cutoff sweep.
#[derive(Debug, Clone)]
pub struct FieldSummary {
    pub field: usize,
    pub name: &'static str,
    /// Mean of (average bugs found − breakpoint percent) over all
    /// breakpoints: how far the ranking beats (or trails) random review.
    pub mean_deviation: f64,
    pub averages: Vec<(usize, f64)>,
}

/// Runs the prediction measurement over every cutoff in `MULTI_CUTOFFS`
/// and every ranking field, averages the breakpoint results per field and
/// returns the fields ranked by mean deviation, best first. When `log` is
/// given, the per-cutoff raw rows are appended to it.
pub fn multi_analysis(
    commits: &CommitMap,
    bugfix_patterns: &[Regex],
    filetype_filters: &[Regex],
    mut log: Option<&mut String>,
) -> Vec<FieldSummary> {
    use std::fmt::Write as _;

    let mut samples: Vec<Vec<Vec<f64>>> =
        vec![vec![Vec::new(); MULTI_BREAKPOINTS.len()]; FIELD_COUNT];

    for cutoff in MULTI_CUTOFFS {
        if let Some(log) = log.as_deref_mut() {
            let _ = writeln!(log, "{cutoff}% of repo");
        }
        let index = build_file_index(commits, cutoff, bugfix_patterns, filetype_filters);
        for field in 0..FIELD_COUNT {
            if let Some(log) = log.as_deref_mut() {
                let _ = writeln!(log, "  #{field}");
            }
            let rows = predict_breakpoints(&index, field, &MULTI_BREAKPOINTS);
            for (j, row) in rows.iter().enumerate() {
                if let Some(log) = log.as_deref_mut() {
                    let _ = writeln!(
                        log,
                        "     {}% -> {}%",
                        row.top_percent, row.bugs_found_percent
                    );
                }
                samples[field][j].push(row.bugs_found_percent as f64);
            }
        }
    }

    let mut summaries: Vec<FieldSummary> = (0..FIELD_COUNT)
        .map(|field| {
            let averages: Vec<(usize, f64)> = MULTI_BREAKPOINTS
                .iter()
                .zip(&samples[field])
                .map(|(p, values)| {
                    let avg = if values.is_empty() {
                        0.0
                    } else {
                        values.iter().sum::<f64>() / values.len() as f64
                    };
                    (*p, avg)
                })
                .collect();
            let mean_deviation = averages
                .iter()
                .map(|(p, avg)| avg - *p as f64)
                .sum::<f64>()
                / MULTI_BREAKPOINTS.len() as f64;
            FieldSummary {
                field,
                name: field_name(field),
                mean_deviation,
                averages,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.mean_deviation
            .partial_cmp(&a.mean_deviation)
            .unwrap_or(Ordering::Equal)
    });
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiffRecord;
    use std::collections::HashMap;

    /// 100 files, one commit each; file_00 gets all 4 holdout bugfixes.
    fn skewed_index() -> FileIndex {
        let mut map: CommitMap = HashMap::new();
        for i in 0..100 {
            map.insert(
                format!("c{i}"),
                vec![DiffRecord {
                    file: format!("src/file_{i:02}.js"),
                    functions: vec![],
                    // file_00 changes most recently so every field that
                    // weights recency ranks it first
                    age: if i == 0 { 49 } else { i % 50 },
                    message: "change".to_string(),
                }],
            );
        }
        for j in 0..4 {
            map.insert(
                format!("h{j}"),
                vec![DiffRecord {
                    file: "src/file_00.js".to_string(),
                    functions: vec![],
                    age: 60 + j,
                    message: "fix it".to_string(),
                }],
            );
        }
        let bugfix = vec![Regex::new(r"(?i)fix").unwrap()];
        build_file_index(&map, 50, &bugfix, &[])
    }

    #[test]
    fn test_rows_are_cumulative_and_bounded() {
        let index = skewed_index();
        let rows = predict_breakpoints(&index, 3, &TEXT_BREAKPOINTS);
        let mut last = 0.0;
        for row in &rows {
            assert!(row.bugs_found_percent >= last, "cumulative must not drop");
            assert!(row.bugs_found_percent <= 100.01);
            last = row.bugs_found_percent;
        }
    }

    #[test]
    fn test_perfect_ranking_catches_everything_early() {
        let index = skewed_index();
        // field 3 = newest change; file_00 is the most recent AND holds all
        // holdout fixes, so the top 5% already catches 100% of them.
        let rows = predict_breakpoints(&index, 3, &TEXT_BREAKPOINTS);
        let top5 = rows.iter().find(|r| r.top_percent == 5).unwrap();
        assert!(
            top5.bugs_found_percent > 99.0,
            "expected ~100%, got {}",
            top5.bugs_found_percent
        );
    }

    #[test]
    fn test_no_holdout_bugfixes_scores_zero() {
        let mut index = skewed_index();
        index.total_later_bugfixes = 0;
        for f in index.files.values_mut() {
            f.later_bugfixes = 0;
        }
        let rows = predict_breakpoints(&index, 0, &TEXT_BREAKPOINTS);
        assert!(rows.iter().all(|r| r.bugs_found_percent == 0.0));
    }

    #[test]
    fn test_multi_analysis_ranks_all_fields() {
        let mut map: CommitMap = HashMap::new();
        for i in 0..40 {
            map.insert(
                format!("c{i}"),
                vec![DiffRecord {
                    file: format!("f{}.js", i % 8),
                    functions: vec![],
                    age: i,
                    message: if i % 3 == 0 { "fix bug".into() } else { "work".into() },
                }],
            );
        }
        let bugfix = vec![Regex::new(r"(?i)fix").unwrap()];
        let summaries = multi_analysis(&map, &bugfix, &[], None);
        assert_eq!(summaries.len(), FIELD_COUNT);
        for pair in summaries.windows(2) {
            assert!(
                pair[0].mean_deviation >= pair[1].mean_deviation,
                "summaries must be sorted best first"
            );
        }
    }

    #[test]
    fn test_multi_analysis_log_capture() {
        let mut map: CommitMap = HashMap::new();
        map.insert(
            "c0".to_string(),
            vec![DiffRecord {
                file: "a.js".to_string(),
                functions: vec![],
                age: 0,
                message: "work".to_string(),
            }],
        );
        let bugfix = vec![Regex::new(r"(?i)fix").unwrap()];
        let mut log = String::new();
        multi_analysis(&map, &bugfix, &[], Some(&mut log));
        assert!(log.contains("5% of repo"));
        assert!(log.contains("75% of repo"));
    }
}
