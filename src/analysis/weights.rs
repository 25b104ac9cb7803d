//! Developer by file contribution weights.

use super::history::FileHistoryTable;
use crate::model::FileChange;
use std::collections::BTreeMap;
use tracing::debug;

/// developer -> canonical path -> accumulated weight
pub type DeveloperWeightTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Weight of one change. Linear in lines touched.
pub fn edit_weight(change: &FileChange) -> f64 {
    change.changes as f64
}

pub fn aggregate(history: &FileHistoryTable) -> DeveloperWeightTable {
    aggregate_with(history, edit_weight)
}

/// Sum `weight` over every entry of every resolved file. Entries weighing
/// zero are skipped so they never register as a touch.
pub fn aggregate_with<F>(history: &FileHistoryTable, weight: F) -> DeveloperWeightTable
where
    F: Fn(&FileChange) -> f64,
{
    let mut table = DeveloperWeightTable::new();
    for (path, entries) in history.iter() {
        for entry in entries {
            if entry.change.binary {
                continue;
            }
            let w = weight(&entry.change);
            if w <= 0.0 {
                continue;
            }
            *table
                .entry(entry.developer.clone())
                .or_default()
                .entry(path.to_string())
                .or_insert(0.0) += w;
        }
    }
    debug!(developers = table.len(), "aggregated contribution weights");
    table
}

pub fn total_weight(files: &BTreeMap<String, f64>) -> f64 {
    files.values().sum()
}
