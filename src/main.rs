use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use git_diffmap::analysis::{aggregate, prediction};
use git_diffmap::factors::{field_name, FIELD_COUNT};
use git_diffmap::git::log_parser;
use git_diffmap::patterns;
use git_diffmap::reporters::{d3, terminal, text};
use git_diffmap::types::{CommitMap, FileIndex};

#[derive(Parser, Debug)]
#[command(
    name = "git-diffmap",
    about = "Mine git history for bug-prone hotspots and render them as treemaps",
    version,
    long_about = "Parses a repository's full git log into a per-commit diff map,\n\
                  scores files and functions by a selectable risk factor, and\n\
                  emits D3 treemap JSON, folder structure reports, or terminal\n\
                  prediction tables."
)]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse a repository's git log and write the commit map as JSON.
    Repo {
        /// Path to the git repository to ingest.
        repo_path: PathBuf,
    },
    /// Generate D3 treemap JSON and folder reports from a commit map.
    D3 {
        /// Commit map JSON written by the `repo` subcommand.
        json_path: PathBuf,
        /// Prefix for the output files (`<prefix>_d3.json`, ...).
        out_prefix: String,
        /// `files` for one treemap entry per file, anything else for
        /// per-function children.
        sub_mode: String,
        /// Ranking field index (0-25).
        field: usize,
        /// Maximum number of entries in the truncated treemap.
        #[arg(default_value_t = 100)]
        limit: usize,
    },
    /// Aggregate at one age cutoff and dump the whole file index as JSON.
    Classes {
        json_path: PathBuf,
        out_prefix: String,
        /// Percentage of history treated as measured (the rest is holdout).
        #[arg(default_value_t = 50)]
        age_cutoff: usize,
    },
    /// Print prediction tables for every ranking field at one age cutoff
    /// and write them to a text report.
    Text {
        json_path: PathBuf,
        out_prefix: String,
        #[arg(default_value_t = 50)]
        age_cutoff: usize,
    },
    /// Sweep many age cutoffs and rank every field by predictive power.
    MultiAnalysis {
        json_path: PathBuf,
        out_prefix: String,
        /// Also write the per-cutoff detail log next to the report.
        #[arg(long)]
        log: bool,
    },
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let cwd = PathBuf::from(".");
    let bugfix_patterns = patterns::load_bugfix_patterns(&cwd)?;
    let filetype_filters = patterns::load_filetype_filters(&cwd)?;

    match args.cmd {
        Cmd::Repo { repo_path } => {
            let commits = log_parser::parse_history(&repo_path)?;
            let commits = filter_commit_map(commits, &filetype_filters);
            let commit_count = commits.len();
            let json = serde_json::to_string(&commits)
                .map_err(|e| format!("failed to serialize commit map: {e}"))?;
            fs::write("generatedJson.json", json)
                .map_err(|e| format!("failed to write generatedJson.json: {e}"))?;
            eprintln!("✔ wrote generatedJson.json ({commit_count} commits)");
        }
        Cmd::D3 { json_path, out_prefix, sub_mode, field, limit } => {
            if field >= FIELD_COUNT {
                return Err(format!("field index {field} out of range (0-{})", FIELD_COUNT - 1));
            }
            let commits = read_commit_map(&json_path)?;
            // Full history is measured; the treemap has no holdout window.
            let index = aggregate::build_file_index(&commits, 100, &bugfix_patterns, &filetype_filters);
            let container = if sub_mode == "files" {
                d3::container_files_only(&index, field)
            } else {
                d3::container_full(&index, field)
            };
            d3::write_reports(container, &filetype_filters, &cwd, &out_prefix, limit)?;
            eprintln!("✔ wrote {out_prefix}_d3.json ranked by '{}'", field_name(field));
        }
        Cmd::Classes { json_path, out_prefix, age_cutoff } => {
            let commits = read_commit_map(&json_path)?;
            let index = aggregate::build_file_index(&commits, age_cutoff, &bugfix_patterns, &filetype_filters);
            let json = serde_json::to_string_pretty(&index)
                .map_err(|e| format!("failed to serialize file index: {e}"))?;
            let path = format!("{out_prefix}.json");
            fs::write(&path, json).map_err(|e| format!("failed to write {path}: {e}"))?;
            eprintln!("✔ wrote {path} ({} files)", index.files.len());
        }
        Cmd::Text { json_path, out_prefix, age_cutoff } => {
            let commits = read_commit_map(&json_path)?;
            let index = aggregate::build_file_index(&commits, age_cutoff, &bugfix_patterns, &filetype_filters);
            let tables = all_field_tables(&index);
            terminal::report_breakpoints(age_cutoff, &tables);
            let report = text::render_breakpoint_report(&tables);
            let path = format!("{out_prefix}_fileMap.txt");
            fs::write(&path, report).map_err(|e| format!("failed to write {path}: {e}"))?;
            eprintln!("✔ wrote {path}");
        }
        Cmd::MultiAnalysis { json_path, out_prefix, log } => {
            let commits = read_commit_map(&json_path)?;
            let mut detail = String::new();
            let summaries = if log {
                prediction::multi_analysis(&commits, &bugfix_patterns, &filetype_filters, Some(&mut detail))
            } else {
                prediction::multi_analysis(&commits, &bugfix_patterns, &filetype_filters, None)
            };
            terminal::report_field_ranking(&summaries);
            let report = text::render_macro_report(&summaries);
            let path = format!("{out_prefix}__macro_analysis.txt");
            fs::write(&path, report).map_err(|e| format!("failed to write {path}: {e}"))?;
            if log {
                let log_path = format!("{out_prefix}__log");
                fs::write(&log_path, detail).map_err(|e| format!("failed to write {log_path}: {e}"))?;
            }
            eprintln!("✔ wrote {path}");
        }
    }
    Ok(())
}

/// Drops records whose file matches a filetype filter. Commits whose every
/// record is filtered out still appear in the map with an empty list, so
/// history length (and therefore ages) stays stable.
fn filter_commit_map(commits: CommitMap, filters: &[regex::Regex]) -> CommitMap {
    commits
        .into_iter()
        .map(|(hash, records)| {
            let kept = records
                .into_iter()
                .filter(|r| !patterns::matches_any(filters, &r.file))
                .collect();
            (hash, kept)
        })
        .collect()
}

fn read_commit_map(path: &PathBuf) -> Result<CommitMap, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

fn all_field_tables(index: &FileIndex) -> Vec<(&'static str, Vec<prediction::PredictionRow>)> {
    (0..FIELD_COUNT)
        .map(|f| {
            (
                field_name(f),
                prediction::predict_breakpoints(index, f, &prediction::TEXT_BREAKPOINTS),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use git_diffmap::types::DiffRecord;
    use regex::Regex;

    #[test]
    fn test_filter_commit_map_keeps_commit_keys() {
        let mut commits = CommitMap::new();
        commits.insert(
            "abc".to_string(),
            vec![DiffRecord {
                file: "README.md".to_string(),
                functions: vec![],
                age: 0,
                message: "docs".to_string(),
            }],
        );
        let filters = vec![Regex::new(r"(?i)\.md$").unwrap()];
        let filtered = filter_commit_map(commits, &filters);
        assert!(filtered.contains_key("abc"));
        assert!(filtered["abc"].is_empty());
    }
}
