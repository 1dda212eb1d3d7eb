use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::path::Path;
use std::process::Command;

use crate::types::{CommitMap, DiffRecord};

static DIFF_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^diff --git a/(.*) b/").unwrap());

/// Matches JS-style declarations: `function name(...)`, `name = (...) =>`
/// and `name = async (...) =>`.
static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"function\s+[a-zA-Z0-9_]+\(+[a-zA-Z0-9_:, ]*\)|[a-zA-Z0-9]+\s*=\s*\([a-zA-Z0-9: ]*\)\s*=>|[a-zA-Z0-9]+\s*=\s*async\s*\([a-zA-Z0-9: ]*\)\s*=>",
    )
    .unwrap()
});

/// Runs a single `git log --patch` over the repository and returns, per
/// commit, which files changed and which function declarations the patch
/// touched. Commit age is the position in the log, newest first.
///
/// One subprocess for the whole history; the per-commit patch scanning is
/// the expensive part and runs on the rayon pool.
pub fn parse_history(repo: &Path) -> Result<CommitMap, String> {
    let output = Command::new("git")
        .args(["log", "--format=COMMIT|%H|%s", "--patch", "--no-color"])
        .current_dir(repo)
        .output()
        .map_err(|e| format!("Failed to run git: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git log failed: {stderr}"));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    Ok(parse_log_output(&text))
}

fn parse_log_output(text: &str) -> CommitMap {
    // Split the combined output into per-commit chunks first, so ages are
    // assigned in log order before parallel parsing scrambles completion order.
    let mut commits: Vec<(String, String, Vec<&str>)> = Vec::new();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("COMMIT|") {
            let mut parts = rest.splitn(2, '|');
            let sha = parts.next().unwrap_or("").to_string();
            let subject = parts.next().unwrap_or("").to_string();
            commits.push((sha, subject, Vec::new()));
        } else if let Some(current) = commits.last_mut() {
            current.2.push(line);
        }
    }

    let pb = ProgressBar::new(commits.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40} {pos}/{len} [{elapsed_precise}] ({eta})")
            .unwrap(),
    );

    let map: CommitMap = commits
        .par_iter()
        .enumerate()
        .map(|(age, (sha, subject, lines))| {
            pb.inc(1);
            (sha.clone(), parse_patch(lines, age as i32, subject))
        })
        .collect();

    pb.finish_and_clear();
    map
}

/// Walks one commit's patch text and collects a record per changed file
/// with the function declarations its hunks touched.
fn parse_patch(lines: &[&str], age: i32, message: &str) -> Vec<DiffRecord> {
    let mut records: Vec<DiffRecord> = Vec::new();
    let mut current_file = String::new();
    let mut current_functions: Vec<String> = Vec::new();

    for line in lines {
        if let Some(header) = DIFF_HEADER_RE.captures(line) {
            if !current_file.is_empty() {
                records.push(DiffRecord {
                    file: current_file.clone(),
                    functions: std::mem::take(&mut current_functions),
                    age,
                    message: message.to_string(),
                });
            }
            current_file = header[1].to_string();
        } else if !current_file.is_empty() {
            if let Some(m) = FUNCTION_RE.find(line) {
                current_functions.push(clean_function_name(m.as_str()));
            }
        }
    }

    if !current_file.is_empty() {
        records.push(DiffRecord {
            file: current_file,
            functions: current_functions,
            age,
            message: message.to_string(),
        });
    }

    records
}

/// Reduces a matched declaration to a bare identifier:
/// `function doThing(a, b)` → `doThing`, `onSave = async (e) =>` → `onSave`.
fn clean_function_name(matched: &str) -> String {
    let head = matched.split('(').next().unwrap_or(matched);
    head.replace("function", "")
        .replace("async", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=' && *c != '>')
        .collect()
}
