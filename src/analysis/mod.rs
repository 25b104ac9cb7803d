//! The analysis pipeline.
//!
//! commit records -> file history -> rename-resolved history -> weights ->
//! similarity pairs and contributor ranking. Each stage takes the previous
//! stage's output and returns a fresh structure.

pub mod history;
pub mod ranking;
pub mod rename;
pub mod similarity;
pub mod weights;

pub use history::{resolve_renames, FileHistoryTable};
pub use ranking::{contributor_totals, top_contributors, ContributorTotals};
pub use rename::{annotate, extract_edge, RenameEdge, RenamePath};
pub use similarity::{pair_similarity, similar_pairs};
pub use weights::{aggregate, edit_weight, DeveloperWeightTable};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::model::{CommitRecord, ContributorSummary, SimilarityPair};
use indexmap::IndexSet;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub history: FileHistoryTable,
    pub weights: DeveloperWeightTable,
    pub pairs: Vec<SimilarityPair>,
    pub contributors: Vec<ContributorSummary>,
}

pub struct Analysis {
    config: AnalysisConfig,
}

impl Analysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every stage over `commits`. Fails on invalid configuration or a
    /// malformed commit record; nothing is partially computed.
    pub fn run(&self, commits: &[CommitRecord]) -> Result<AnalysisReport> {
        self.config.validate()?;
        for commit in commits {
            commit.validate()?;
        }

        let history = FileHistoryTable::from_commits(commits).resolve();
        let weights = aggregate(&history);

        let developers: Vec<String> = commits
            .iter()
            .map(|c| c.author.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();

        let pairs = similar_pairs(
            &weights,
            &developers,
            self.config.threshold,
            self.config.min_activity,
        )?;
        let contributors = top_contributors(commits, &history, self.config.top);

        info!(
            commits = commits.len(),
            developers = developers.len(),
            files = history.len(),
            pairs = pairs.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            history,
            weights,
            pairs,
            contributors,
        })
    }
}
