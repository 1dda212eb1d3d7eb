use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Commit map (output of the `repo` ingestion pass) ─────────────────────────

/// One changed file inside one commit: which functions the patch touched,
/// how old the commit is (position in the log, newest first) and the
/// commit subject the bugfix patterns are matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub file: String,
    pub functions: Vec<String>,
    pub age: i32,
    pub message: String,
}

/// Full-history extraction result: commit sha → diff records.
pub type CommitMap = HashMap<String, Vec<DiffRecord>>;

// ─── Aggregated statistics ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionStats {
    pub name: String,
    pub freq: f32,
    pub bug_freq: f32,
    pub aged_freq: f32,
    pub aged_bug_freq: f32,
    /// (oldest change age, newest change age), merged by min/max.
    pub oldest_newest: (i32, i32),
    /// Bugfixes that landed on this function past the measuring cutoff.
    pub later_bugfixes: u32,
}

impl FunctionStats {
    /// Function-level ranking fields. Only the four raw counters exist
    /// at function granularity.
    pub fn field(&self, n: usize) -> f32 {
        match n {
            0 => self.freq,
            1 => self.bug_freq,
            2 => self.aged_freq,
            3 => self.aged_bug_freq,
            _ => -1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStats {
    pub name: String,
    pub freq: f32,
    pub bug_freq: f32,
    pub aged_freq: f32,
    pub aged_bug_freq: f32,
    pub oldest_newest: (i32, i32),
    pub functions: HashMap<String, FunctionStats>,
    pub later_bugfixes: u32,
    pub later_function_bugfixes: u32,
    pub repo_max_age: i32,
}

impl FileStats {
    /// File-level ranking fields, indexed by the factor table
    /// (see `factors::field_name`). Out-of-range → -1.0.
    pub fn field(&self, n: usize) -> f32 {
        let oldest = self.oldest_newest.0 as f32;
        let newest = self.oldest_newest.1 as f32;
        match n {
            0 => self.freq,
            1 => self.bug_freq,
            2 => oldest,
            3 => newest,
            4 => self.aged_freq,
            5 => self.aged_bug_freq,
            6 => self.freq * newest,
            7 => self.bug_freq * newest,
            8 => self.freq * oldest,
            9 => self.bug_freq * oldest,

            10 => newest * self.aged_freq,
            11 => newest * self.aged_bug_freq,

            12 => newest * self.aged_freq + newest * self.aged_bug_freq,
            13 => newest * self.aged_freq * 2.0 + newest * self.aged_bug_freq,
            14 => newest * self.aged_freq * 10.0 + newest * self.aged_bug_freq,
            15 => newest * self.aged_freq + newest * self.aged_bug_freq * 2.0,
            16 => newest * self.aged_freq + newest * self.aged_bug_freq * 10.0,
            // single-counter variants
            17 => newest * self.aged_freq + newest,
            18 => newest * self.aged_bug_freq + newest,
            // variants weighting the newest change harder
            19 => newest + newest * self.aged_freq + newest * self.aged_bug_freq,
            20 => newest + newest * self.aged_freq * 2.0 + newest * self.aged_bug_freq,
            21 => newest + newest * self.aged_freq * 10.0 + newest * self.aged_bug_freq,
            22 => newest + newest * self.aged_freq + newest * self.aged_bug_freq * 2.0,
            23 => newest + newest * self.aged_freq + newest * self.aged_bug_freq * 10.0,

            24 => newest + newest * self.aged_freq + newest,
            25 => newest + newest * self.aged_bug_freq + newest,
            _ => -1.0,
        }
    }
}

/// The aggregation result for one repository at one cutoff percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileIndex {
    pub files: HashMap<String, FileStats>,
    pub max_age: usize,
    pub total_later_bugfixes: u32,
}

impl FileIndex {
    pub fn new(max_age: usize) -> FileIndex {
        FileIndex {
            files: HashMap::new(),
            max_age,
            total_later_bugfixes: 0,
        }
    }

    /// Merges one commit's contribution into a file entry, creating it on
    /// first sight. `oldest_newest` merges by min/max so the pair spans the
    /// file's full change window.
    pub fn add_file(
        &mut self,
        name: &str,
        freq: f32,
        bug_freq: f32,
        aged_freq: f32,
        aged_bug_freq: f32,
        oldest_newest: (i32, i32),
    ) {
        let repo_max_age = self.max_age as i32;
        let entry = self
            .files
            .entry(name.to_string())
            .or_insert_with(|| FileStats {
                name: name.to_string(),
                freq: 0.0,
                bug_freq: 0.0,
                aged_freq: 0.0,
                aged_bug_freq: 0.0,
                oldest_newest,
                functions: HashMap::new(),
                later_bugfixes: 0,
                later_function_bugfixes: 0,
                repo_max_age,
            });
        entry.freq += freq;
        entry.bug_freq += bug_freq;
        entry.aged_freq += aged_freq;
        entry.aged_bug_freq += aged_bug_freq;
        entry.oldest_newest.0 = entry.oldest_newest.0.min(oldest_newest.0);
        entry.oldest_newest.1 = entry.oldest_newest.1.max(oldest_newest.1);
    }

    /// Merges one commit's contribution into a function entry under `file`,
    /// creating file and function entries as needed. A function created here
    /// without a prior `add_file` gets a zero-counter file entry.
    #[allow(clippy::too_many_arguments)]
    pub fn add_function(
        &mut self,
        file: &str,
        function: &str,
        freq: f32,
        bug_freq: f32,
        aged_freq: f32,
        aged_bug_freq: f32,
        oldest_newest: (i32, i32),
    ) {
        if !self.files.contains_key(file) {
            self.add_file(file, 0.0, 0.0, 0.0, 0.0, oldest_newest);
        }
        let entry = self
            .files
            .get_mut(file)
            .expect("file entry inserted above")
            .functions
            .entry(function.to_string())
            .or_insert_with(|| FunctionStats {
                name: function.to_string(),
                freq: 0.0,
                bug_freq: 0.0,
                aged_freq: 0.0,
                aged_bug_freq: 0.0,
                oldest_newest,
                later_bugfixes: 0,
            });
        entry.freq += freq;
        entry.bug_freq += bug_freq;
        entry.aged_freq += aged_freq;
        entry.aged_bug_freq += aged_bug_freq;
        entry.oldest_newest.0 = entry.oldest_newest.0.min(oldest_newest.0);
        entry.oldest_newest.1 = entry.oldest_newest.1.max(oldest_newest.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(freq: f32, bug: f32, aged: f32, aged_bug: f32, on: (i32, i32)) -> FileStats {
        FileStats {
            name: "a.js".to_string(),
            freq,
            bug_freq: bug,
            aged_freq: aged,
            aged_bug_freq: aged_bug,
            oldest_newest: on,
            functions: HashMap::new(),
            later_bugfixes: 0,
            later_function_bugfixes: 0,
            repo_max_age: 100,
        }
    }

    #[test]
    fn test_raw_counter_fields() {
        let s = stats(7.0, 3.0, 0.5, 0.25, (2, 9));
        assert_eq!(s.field(0), 7.0);
        assert_eq!(s.field(1), 3.0);
        assert_eq!(s.field(2), 2.0);
        assert_eq!(s.field(3), 9.0);
        assert_eq!(s.field(4), 0.5);
        assert_eq!(s.field(5), 0.25);
    }

    #[test]
    fn test_combined_fields_use_change_window() {
        let s = stats(2.0, 1.0, 0.5, 0.25, (1, 10));
        assert_eq!(s.field(6), 20.0, "freq * newest");
        assert_eq!(s.field(8), 2.0, "freq * oldest");
        assert_eq!(s.field(12), 10.0 * 0.5 + 10.0 * 0.25);
        assert_eq!(s.field(19), 10.0 + 10.0 * 0.5 + 10.0 * 0.25);
    }

    #[test]
    fn test_out_of_range_field_is_negative() {
        let s = stats(1.0, 0.0, 0.0, 0.0, (0, 0));
        assert_eq!(s.field(26), -1.0);
        let f = FunctionStats {
            name: "f".to_string(),
            freq: 1.0,
            bug_freq: 0.0,
            aged_freq: 0.0,
            aged_bug_freq: 0.0,
            oldest_newest: (0, 0),
            later_bugfixes: 0,
        };
        assert_eq!(f.field(4), -1.0);
    }

    #[test]
    fn test_add_file_merges_counters_and_window() {
        let mut index = FileIndex::new(10);
        index.add_file("src/a.js", 1.0, 1.0, 0.1, 0.1, (3, 3));
        index.add_file("src/a.js", 1.0, 0.0, 0.2, 0.0, (7, 7));
        let file = &index.files["src/a.js"];
        assert_eq!(file.freq, 2.0);
        assert_eq!(file.bug_freq, 1.0);
        assert_eq!(file.oldest_newest, (3, 7), "window spans both changes");
    }

    #[test]
    fn test_add_function_creates_missing_file_entry() {
        let mut index = FileIndex::new(10);
        index.add_function("src/a.js", "init", 1.0, 0.0, 0.0, 0.0, (2, 2));
        let file = &index.files["src/a.js"];
        assert_eq!(file.freq, 0.0, "implicit file entry carries no counters");
        assert_eq!(file.functions["init"].freq, 1.0);
    }
}
