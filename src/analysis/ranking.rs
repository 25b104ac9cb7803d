//! Top contributors by volume of change.

use super::history::FileHistoryTable;
use crate::model::{CommitRecord, ContributorSummary};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributorTotals {
    pub insertions: u64,
    pub deletions: u64,
    pub commits: u64,
    pub files_touched: u64,
}

impl ContributorTotals {
    /// Distinct files per commit, rounded to two decimals.
    pub fn average_files_per_commit(&self) -> f64 {
        if self.commits == 0 {
            return 0.0;
        }
        let avg = self.files_touched as f64 / self.commits as f64;
        (avg * 100.0).round() / 100.0
    }
}

/// Per-developer totals, keyed in the order developers first appear in
/// `commits`.
///
/// Line counts come from the resolved history, so binary changes are already
/// gone. Commit and file counts come from the raw records and include every
/// commit, even one that only touched binary files.
pub fn contributor_totals(
    commits: &[CommitRecord],
    history: &FileHistoryTable,
) -> IndexMap<String, ContributorTotals> {
    let mut totals: IndexMap<String, ContributorTotals> = IndexMap::new();

    for commit in commits {
        let distinct: HashSet<&str> = commit.files.iter().map(|f| f.path.as_str()).collect();
        let t = totals.entry(commit.author.clone()).or_default();
        t.commits += 1;
        t.files_touched += distinct.len() as u64;
    }

    for (_, entries) in history.iter() {
        for entry in entries {
            let t = totals.entry(entry.developer.clone()).or_default();
            t.insertions += entry.change.insertions;
            t.deletions += entry.change.deletions;
        }
    }

    totals
}

/// The `limit` developers with the most insertions. Ties keep first-seen
/// order.
pub fn top_contributors(
    commits: &[CommitRecord],
    history: &FileHistoryTable,
    limit: usize,
) -> Vec<ContributorSummary> {
    let mut ranked: Vec<ContributorSummary> = contributor_totals(commits, history)
        .into_iter()
        .map(|(developer, t)| ContributorSummary {
            average_files_per_commit: t.average_files_per_commit(),
            developer,
            insertions: t.insertions,
            deletions: t.deletions,
            commits: t.commits,
        })
        .collect();

    // stable: equal insertions stay in first-seen order
    ranked.sort_by(|a, b| b.insertions.cmp(&a.insertions));
    debug!(developers = ranked.len(), limit, "ranked contributors");
    ranked.truncate(limit);
    ranked
}
