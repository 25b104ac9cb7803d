//! Per-file change history and rename resolution.

use super::rename::{extract_edge, RenameEdge};
use crate::model::{CommitRecord, HistoryEntry};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Path to ordered change history. Keys keep first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileHistoryTable {
    files: IndexMap<String, Vec<HistoryEntry>>,
}

impl FileHistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// File every non-binary change under the path it was reported with.
    pub fn from_commits(commits: &[CommitRecord]) -> Self {
        let mut table = Self::new();
        let mut skipped_binary = 0usize;
        for commit in commits {
            for change in &commit.files {
                if change.binary {
                    skipped_binary += 1;
                    continue;
                }
                table.push(
                    change.path.clone(),
                    HistoryEntry {
                        developer: commit.author.clone(),
                        timestamp: commit.timestamp,
                        change: change.clone(),
                    },
                );
            }
        }
        debug!(
            files = table.len(),
            entries = table.entry_count(),
            skipped_binary,
            "built file history"
        );
        table
    }

    pub fn push(&mut self, path: impl Into<String>, entry: HistoryEntry) {
        self.files.entry(path.into()).or_default().push(entry);
    }

    pub fn get(&self, path: &str) -> Option<&[HistoryEntry]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HistoryEntry])> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Rename edges found in the keys, in key order.
    pub fn rename_edges(&self) -> Vec<RenameEdge> {
        self.files.keys().filter_map(|k| extract_edge(k)).collect()
    }

    /// Extract rename edges from the keys and merge every history under
    /// its final name.
    pub fn resolve(self) -> Self {
        let edges = self.rename_edges();
        resolve_renames(self, &edges)
    }
}

impl FromIterator<(String, HistoryEntry)> for FileHistoryTable {
    fn from_iter<I: IntoIterator<Item = (String, HistoryEntry)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (path, entry) in iter {
            table.push(path, entry);
        }
        table
    }
}

/// Move every history entry under the last name in its rename chain.
///
/// Each edge links both its literal annotated key and its `from` path to
/// `to`. Edges are read in reverse extraction order and the first link
/// recorded for a node wins, so when one path was renamed twice the
/// most recently extracted rename is followed. A rename cycle stops at the
/// last node reached before the walk would revisit one, and every node on
/// the walk is pinned to that target so a cycle collapses into one bucket.
///
/// Entries are moved, never copied, and empty buckets are dropped.
pub fn resolve_renames(table: FileHistoryTable, edges: &[RenameEdge]) -> FileHistoryTable {
    if edges.is_empty() {
        return table;
    }

    let mut next: HashMap<&str, &str> = HashMap::new();
    for edge in edges.iter().rev() {
        if edge.key != edge.to {
            next.entry(edge.key.as_str()).or_insert(edge.to.as_str());
        }
        if edge.from != edge.to {
            next.entry(edge.from.as_str()).or_insert(edge.to.as_str());
        }
    }

    let mut memo: HashMap<String, String> = HashMap::new();
    let mut files: IndexMap<String, Vec<HistoryEntry>> = IndexMap::new();
    let mut relocated = 0usize;

    for (path, entries) in table.files {
        if entries.is_empty() {
            continue;
        }
        let target = canonical(&path, &next, &mut memo);
        if target != path {
            debug!(from = %path, to = %target, entries = entries.len(), "relocating history");
            relocated += entries.len();
        }
        files.entry(target).or_default().extend(entries);
    }

    info!(
        edges = edges.len(),
        relocated,
        files = files.len(),
        "resolved renames"
    );
    FileHistoryTable { files }
}

fn canonical<'a>(
    start: &'a str,
    next: &HashMap<&'a str, &'a str>,
    memo: &mut HashMap<String, String>,
) -> String {
    let mut walked: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = start;

    let target = loop {
        if let Some(done) = memo.get(current) {
            break done.clone();
        }
        seen.insert(current);
        walked.push(current);
        match next.get(current) {
            Some(&successor) if !seen.contains(successor) => current = successor,
            Some(_) => {
                debug!(node = current, "rename cycle, stopping walk");
                break current.to_string();
            }
            None => break current.to_string(),
        }
    };

    for node in walked {
        memo.insert(node.to_string(), target.clone());
    }
    target
}
