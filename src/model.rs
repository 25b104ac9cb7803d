use crate::error::{CollabError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// One commit as handed to the analysis core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(default)]
    pub id: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub files: Vec<FileChange>,
}

impl CommitRecord {
    pub fn validate(&self) -> Result<()> {
        if self.author.trim().is_empty() {
            let id = if self.id.is_empty() { "<unnamed>" } else { self.id.as_str() };
            return Err(CollabError::InvalidInput(format!(
                "commit {id} at {} has no author",
                self.timestamp
            )));
        }
        for file in &self.files {
            if file.path.is_empty() {
                return Err(CollabError::InvalidInput(format!(
                    "commit by {} at {} contains a change with an empty path",
                    self.author, self.timestamp
                )));
            }
        }
        Ok(())
    }
}

/// One file touched by one commit. `path` may carry a rename annotation
/// such as `src/{old.rs => new.rs}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub insertions: u64,
    pub deletions: u64,
    pub changes: u64,
    #[serde(default)]
    pub binary: bool,
}

impl FileChange {
    pub fn new(path: impl Into<String>, insertions: u64, deletions: u64) -> Self {
        Self {
            path: path.into(),
            insertions,
            deletions,
            changes: insertions + deletions,
            binary: false,
        }
    }

    pub fn binary(path: impl Into<String>) -> Self {
        Self {
            binary: true,
            ..Self::new(path, 0, 0)
        }
    }
}

/// A change attributed to a developer, filed under one file-history bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub developer: String,
    pub timestamp: DateTime<Utc>,
    pub change: FileChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityPair {
    pub developer_a: String,
    pub developer_b: String,
    pub similarity_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorSummary {
    pub developer: String,
    pub insertions: u64,
    pub deletions: u64,
    pub commits: u64,
    pub average_files_per_commit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairsOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub threshold: f64,
    pub min_activity: f64,
    pub pairs: Vec<SimilarityPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub limit: usize,
    pub contributors: Vec<ContributorSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub commit_count: usize,
    pub file_count: usize,
    pub pairs: Vec<SimilarityPair>,
    pub contributors: Vec<ContributorSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub commits: Vec<CommitRecord>,
}

#[derive(Debug, Clone)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new()
    }
}
