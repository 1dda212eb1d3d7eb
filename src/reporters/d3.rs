//! D3-treemap output: three-level `Container` → `Parent` → `Child` JSON
//! documents plus per-folder partial containers, in the shape the bundled
//! viewer page consumes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::patterns::matches_any;
use crate::types::FileIndex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Child {
    pub name: String,
    /// Full file path the value belongs to; the folder tree is built from it.
    pub group: String,
    pub value: f32,
    pub colname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parent {
    pub name: String,
    pub children: Vec<Child>,
    pub value: f32,
    pub colname: String,
}

impl Parent {
    pub fn sort_children_by_value(&mut self) {
        self.children
            .sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    }

    pub fn remove_children_matching(&mut self, filters: &[Regex]) {
        self.children.retain(|c| !matches_any(filters, &c.name));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub children: Vec<Parent>,
}

impl Container {
    pub fn sort_parents_by_total_child_value(&mut self) {
        self.children.sort_by(|a, b| {
            let a_total: f32 = a.children.iter().map(|c| c.value).sum();
            let b_total: f32 = b.children.iter().map(|c| c.value).sum();
            b_total.partial_cmp(&a_total).unwrap_or(Ordering::Equal)
        });
    }
}

/// `files` sub-mode: one parent per file holding a single child carrying
/// the file's field value. Parent names are the bare file names, child
/// groups the full paths.
pub fn container_files_only(index: &FileIndex, field: usize) -> Container {
    let mut parents = Vec::with_capacity(index.files.len());
    for file in index.files.values() {
        let short = file.name.split('/').next_back().unwrap_or(&file.name);
        parents.push(Parent {
            name: short.to_string(),
            children: vec![Child {
                name: short.to_string(),
                group: file.name.clone(),
                value: file.field(field),
                colname: "level3".to_string(),
            }],
            value: 0.0,
            colname: "level2".to_string(),
        });
    }
    let mut container = Container {
        name: "Container".to_string(),
        children: parents,
    };
    container.sort_parents_by_total_child_value();
    container
}

/// `full` sub-mode: one parent per file, one child per touched function.
/// Function values only exist for the four raw counters; other fields
/// render functions flat.
pub fn container_full(index: &FileIndex, field: usize) -> Container {
    let mut parents = Vec::with_capacity(index.files.len());
    for file in index.files.values() {
        let children = file
            .functions
            .values()
            .map(|function| Child {
                name: function.name.clone(),
                group: file.name.clone(),
                value: function.field(field),
                colname: "level3".to_string(),
            })
            .collect();
        parents.push(Parent {
            name: file.name.clone(),
            children,
            value: file.field(field),
            colname: "level2".to_string(),
        });
    }
    let mut container = Container {
        name: "Container".to_string(),
        children: parents,
    };
    container.sort_parents_by_total_child_value();
    container
}

// ─── Folder tree ──────────────────────────────────────────────────────────────

/// Aggregates child values along the directory hierarchy so every folder
/// can be rendered as its own treemap.
#[derive(Debug, Default)]
pub struct Folder {
    pub name: String,
    pub files: HashMap<String, f32>,
    pub subfolders: HashMap<String, Folder>,
}

impl Folder {
    pub fn new(name: &str) -> Folder {
        Folder {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn add_file(&mut self, path: &str, value: f32) {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some((file_name, folders)) = parts.split_last() else {
            return;
        };
        let mut current = self;
        for part in folders {
            current = current
                .subfolders
                .entry(part.to_string())
                .or_insert_with(|| Folder::new(part));
        }
        *current.files.entry(file_name.to_string()).or_insert(0.0) += value;
    }

    pub fn total_value(&self) -> f32 {
        let files: f32 = self.files.values().sum();
        let folders: f32 = self.subfolders.values().map(|f| f.total_value()).sum();
        files + folders
    }

    fn descend(&self, path: &str) -> Option<&Folder> {
        let mut current = self;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = current.subfolders.get(part)?;
        }
        Some(current)
    }

    /// Direct entries of `path` — files with their values and subfolders
    /// with their aggregated totals, sorted by value descending.
    pub fn path_items(&self, path: &str) -> Option<Vec<(String, f32)>> {
        let folder = self.descend(path)?;
        let mut items: Vec<(String, f32)> = folder
            .files
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();
        items.extend(
            folder
                .subfolders
                .values()
                .map(|f| (f.name.clone(), f.total_value())),
        );
        items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Some(items)
    }

    /// Single-parent container for one folder, used for the drill-down
    /// treemaps under `containers/`.
    pub fn path_container(&self, path: &str) -> Option<Container> {
        let items = self.path_items(path)?;
        let parent = Parent {
            name: path.to_string(),
            children: items
                .into_iter()
                .map(|(name, value)| Child {
                    name,
                    group: String::new(),
                    value,
                    colname: "level3".to_string(),
                })
                .collect(),
            value: 0.0,
            colname: String::new(),
        };
        Some(Container {
            name: path.to_string(),
            children: vec![parent],
        })
    }

    /// Indented folder listing with aggregated values, largest first.
    pub fn render_structure(&self, depth: u32) -> String {
        let mut out = String::new();
        let indent = "--".repeat((depth * 2) as usize);
        out.push_str(&format!("{}{} - {:.2}\n", indent, self.name, self.total_value()));

        let mut subfolders: Vec<&Folder> = self.subfolders.values().collect();
        subfolders.sort_by(|a, b| {
            b.total_value()
                .partial_cmp(&a.total_value())
                .unwrap_or(Ordering::Equal)
        });
        for folder in subfolders {
            out.push_str(&folder.render_structure(depth + 1));
        }
        out
    }
}

// ─── Report writing ───────────────────────────────────────────────────────────

/// Writes the full set of treemap artifacts for one container into `dir`:
///
/// * `<prefix>_file_structure.txt` — the aggregated folder listing,
/// * `containers/<folder>.json` — one drill-down container per folder
///   (`root.json` for the repository root),
/// * `<prefix>_all_d3.json` — every parent,
/// * `<prefix>_d3.json` — the top `limit` parents.
///
/// Parents and children matching a filetype filter are dropped first.
pub fn write_reports(
    container: Container,
    filters: &[Regex],
    dir: &Path,
    prefix: &str,
    limit: usize,
) -> Result<(), String> {
    let mut kept = Container {
        name: container.name.clone(),
        children: Vec::new(),
    };
    let mut tree = Folder::new("");
    let mut folder_paths: HashSet<String> = HashSet::new();
    folder_paths.insert(String::new());

    for mut parent in container.children {
        if matches_any(filters, &parent.name) {
            continue;
        }
        parent.remove_children_matching(filters);
        parent.sort_children_by_value();

        for child in &parent.children {
            tree.add_file(&child.group, child.value);
            let mut parts: Vec<&str> = child.group.split('/').collect();
            parts.pop();
            let mut path = String::new();
            for part in parts {
                if !path.is_empty() {
                    path.push('/');
                }
                path.push_str(part);
                folder_paths.insert(path.clone());
            }
        }
        kept.children.push(parent);
    }

    write_file(&dir.join(format!("{prefix}_file_structure.txt")), &tree.render_structure(0))?;

    let containers_dir = dir.join("containers");
    let _ = std::fs::remove_dir_all(&containers_dir);
    for path in &folder_paths {
        let Some(partial) = tree.path_container(path) else {
            continue;
        };
        let slot = match path.strip_prefix('.').unwrap_or(path) {
            "" => "root",
            stripped => stripped,
        };
        let json = serde_json::to_string_pretty(&partial)
            .map_err(|e| format!("JSON serialization failed: {e}"))?;
        let out = containers_dir.join(format!("{slot}.json"));
        if let Some(parent_dir) = out.parent() {
            std::fs::create_dir_all(parent_dir)
                .map_err(|e| format!("Failed to create {}: {e}", parent_dir.display()))?;
        }
        write_file(&out, &json)?;
    }

    let all = serde_json::to_string_pretty(&kept)
        .map_err(|e| format!("JSON serialization failed: {e}"))?;
    write_file(&dir.join(format!("{prefix}_all_d3.json")), &all)?;

    kept.children.truncate(limit);
    let top = serde_json::to_string_pretty(&kept)
        .map_err(|e| format!("JSON serialization failed: {e}"))?;
    write_file(&dir.join(format!("{prefix}_d3.json")), &top)?;

    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<(), String> {
    std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}
