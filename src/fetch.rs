//! Where commit records come from: a git repository or a JSON export.

use crate::cli::CommonArgs;
use crate::config::AnalysisConfig;
use crate::error::{CollabError, Result};
use crate::git::{resolve_date, GitRepo};
use crate::model::{CommitRecord, DateRange};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CommitSource {
    /// Repository path or input file, for reporting.
    pub label: String,
    /// Repository root, where `.gcollab.toml` is looked up.
    pub root: Option<PathBuf>,
    pub commits: Vec<CommitRecord>,
}

pub fn fetch_commits(common: &CommonArgs, show_progress: bool) -> anyhow::Result<CommitSource> {
    if let Some(input) = &common.input {
        let range = resolve_range_offline(common.since.as_deref(), common.until.as_deref())
            .context("Failed to resolve date range")?;
        let commits = read_commit_file(input)
            .with_context(|| format!("Failed to read commit records from {}", input.display()))?;
        let total = commits.len();
        let commits: Vec<_> = commits
            .into_iter()
            .filter(|c| range.contains(&c.timestamp))
            .collect();
        debug!(total, kept = commits.len(), "loaded commit records from file");
        return Ok(CommitSource {
            label: input.display().to_string(),
            root: None,
            commits,
        });
    }

    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let range = repo
        .resolve_range(common.since.as_deref(), common.until.as_deref())
        .context("Failed to resolve date range")?;
    let commits = repo
        .collect_commits(&range, common.include_merges, show_progress)
        .context("Failed to collect commits from repository")?;

    Ok(CommitSource {
        label: repo.path().to_string_lossy().to_string(),
        root: Some(repo.path().to_path_buf()),
        commits,
    })
}

/// Config file (explicit or found in the repository) with flag overrides.
pub fn analysis_config(
    common: &CommonArgs,
    source: &CommitSource,
    threshold: Option<f64>,
    top: Option<usize>,
    min_activity: Option<f64>,
) -> anyhow::Result<AnalysisConfig> {
    let config = AnalysisConfig::load(common.config.as_deref(), source.root.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(threshold, top, min_activity);
    config.validate().context("Invalid analysis settings")?;
    Ok(config)
}

pub fn read_commit_file(path: &Path) -> Result<Vec<CommitRecord>> {
    let content = std::fs::read_to_string(path)?;
    parse_commit_document(&content)
}

/// Accepts the `export --json` envelope (`{"commits": [...]}`) or a bare
/// array of commit records.
pub fn parse_commit_document(content: &str) -> Result<Vec<CommitRecord>> {
    let value: Value = serde_json::from_str(content)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("commits") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CollabError::InvalidInput(
                    "expected a `commits` array in the input document".into(),
                ))
            }
        },
        _ => {
            return Err(CollabError::InvalidInput(
                "expected an array of commit records or an object with `commits`".into(),
            ))
        }
    };

    let mut commits = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let commit: CommitRecord = serde_json::from_value(item)
            .map_err(|e| CollabError::InvalidInput(format!("commit #{index}: {e}")))?;
        commit.validate()?;
        commits.push(commit);
    }
    Ok(commits)
}

fn resolve_range_offline(since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
    let parse = |input: &str| -> Result<DateTime<Utc>> {
        resolve_date(input)?.ok_or_else(|| {
            CollabError::InvalidDate(format!(
                "'{input}' is not a date; revisions can only be used with a repository"
            ))
        })
    };

    let mut range = DateRange::new();
    if let Some(s) = since {
        range = range.with_since(parse(s)?);
    }
    if let Some(u) = until {
        range = range.with_until(parse(u)?);
    }
    if let (Some(s), Some(u)) = (range.since, range.until) {
        if s > u {
            return Err(CollabError::InvalidDate(format!(
                "Invalid range: since ({s}) is after until ({u})"
            )));
        }
    }
    Ok(range)
}
