use crate::analysis::annotate;
use crate::error::{CollabError, Result};
use crate::model::{CommitRecord, DateRange, FileChange};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gix::object::tree::diff::ChangeDetached;
use gix::object::tree::EntryMode;
use gix::{discover, ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use similar::{ChangeTag, TextDiff};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

const BINARY_PROBE_LEN: usize = 8192;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        debug!(path = %path.display(), "opened repository");

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve_range(&self, since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
        let mut range = DateRange::new();

        let since_dt = since.map(|s| self.parse_commit_or_date(s)).transpose()?;
        let until_dt = until.map(|u| self.parse_commit_or_date(u)).transpose()?;

        if let (Some(s), Some(u)) = (since_dt, until_dt) {
            if s > u {
                return Err(CollabError::InvalidDate(format!(
                    "Invalid range: since ({s}) is after until ({u})"
                )));
            }
        }

        if let Some(s) = since_dt {
            range = range.with_since(s);
        }
        if let Some(u) = until_dt {
            range = range.with_until(u);
        }

        Ok(range)
    }

    fn parse_commit_or_date(&self, input: &str) -> Result<DateTime<Utc>> {
        if let Some(dt) = resolve_date(input)? {
            return Ok(dt);
        }

        // Fallback to a git revision
        let id = self
            .repo
            .rev_parse_single(input)
            .map_err(|e| CollabError::Parse(format!("Invalid commit or date '{input}': {e}")))?;

        let commit = id
            .object()?
            .try_into_commit()
            .map_err(|_| CollabError::Parse(format!("Not a commit: {input}")))?;

        let secs = commit.time()?.seconds;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| CollabError::InvalidDate(format!("Invalid timestamp: {secs}")))
    }

    /// Walk history from HEAD and return one record per commit in `range`,
    /// newest first. Merge commits are skipped unless `include_merges`.
    pub fn collect_commits(
        &self,
        range: &DateRange,
        include_merges: bool,
        show_progress: bool,
    ) -> Result<Vec<CommitRecord>> {
        let mut head = self.repo.head()?;
        if head.is_unborn() {
            debug!("repository has no commits");
            return Ok(Vec::new());
        }
        let head_commit = head.peel_to_commit_in_place()?;

        let mut commits = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: VecDeque<ObjectId> = VecDeque::from([head_commit.id]);
        let mut merges_skipped = 0usize;

        let pb = if show_progress {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} {pos}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Collecting commits...");

        while let Some(commit_id) = stack.pop_back() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let secs = commit.time()?.seconds;
            let timestamp = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| CollabError::InvalidDate(format!("Invalid timestamp: {secs}")))?;

            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();
            stack.extend(parents.iter().copied());

            if !range.contains(&timestamp) {
                continue;
            }

            if !include_merges && parents.len() > 1 {
                merges_skipped += 1;
                pb.inc(1);
                continue;
            }

            let author = commit.author()?;
            let author = if author.name.is_empty() {
                author.email.to_string()
            } else {
                author.name.to_string()
            };

            let files = self.commit_changes(commit_id, parents.first().copied())?;
            commits.push(CommitRecord {
                id: commit_id.to_string(),
                author,
                timestamp,
                files,
            });

            pb.inc(1);
        }

        pb.finish_with_message("Commits collected");
        commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        info!(commits = commits.len(), merges_skipped, "collected commit history");
        Ok(commits)
    }

    fn commit_changes(&self, commit_id: ObjectId, parent_id: Option<ObjectId>) -> Result<Vec<FileChange>> {
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;
        let changes: Vec<ChangeDetached> = match parent_id {
            Some(pid) => {
                let parent_tree = self.repo.find_commit(pid)?.tree()?;
                self.repo
                    .diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), diff_options())?
            }
            None => self.repo.diff_tree_to_tree(None, Some(&commit_tree), diff_options())?,
        };

        let mut files = Vec::new();
        for change in changes {
            if let Some(file) = self.file_change(change)? {
                files.push(file);
            }
        }
        Ok(files)
    }

    fn file_change(&self, change: ChangeDetached) -> Result<Option<FileChange>> {
        if !is_file(change.entry_mode()) {
            return Ok(None);
        }
        let file = match change {
            ChangeDetached::Addition { id, location, .. } => {
                let Ok(obj) = self.repo.find_object(id) else {
                    return Ok(None);
                };
                self.stats(location.to_string(), None, Some(&obj))
            }
            ChangeDetached::Deletion { id, location, .. } => {
                let Ok(obj) = self.repo.find_object(id) else {
                    return Ok(None);
                };
                self.stats(location.to_string(), Some(&obj), None)
            }
            ChangeDetached::Modification {
                previous_id,
                id,
                location,
                ..
            } => {
                let (Ok(old_obj), Ok(new_obj)) =
                    (self.repo.find_object(previous_id), self.repo.find_object(id))
                else {
                    return Ok(None);
                };
                self.stats(location.to_string(), Some(&old_obj), Some(&new_obj))
            }
            ChangeDetached::Rewrite {
                source_id,
                id,
                source_location,
                location,
                copy,
                ..
            } => {
                let (Ok(old_obj), Ok(new_obj)) =
                    (self.repo.find_object(source_id), self.repo.find_object(id))
                else {
                    return Ok(None);
                };
                if copy {
                    // the source keeps its history; the copy starts fresh
                    self.stats(location.to_string(), None, Some(&new_obj))
                } else {
                    let path = annotate(&source_location.to_string(), &location.to_string());
                    self.stats(path, Some(&old_obj), Some(&new_obj))
                }
            }
        };
        Ok(Some(file))
    }

    fn stats(&self, path: String, old: Option<&gix::Object<'_>>, new: Option<&gix::Object<'_>>) -> FileChange {
        let old_data = old.map(|o| o.data.as_slice()).unwrap_or_default();
        let new_data = new.map(|o| o.data.as_slice()).unwrap_or_default();

        if is_binary(old_data) || is_binary(new_data) {
            return FileChange::binary(path);
        }

        let (insertions, deletions) = line_diff(old_data, new_data);
        FileChange::new(path, insertions, deletions)
    }
}

/// Full paths with rename tracking on, whatever `diff.renames` says.
fn diff_options() -> gix::diff::Options {
    let mut options = gix::diff::Options::default();
    options
        .track_path()
        .track_rewrites(Some(gix::diff::Rewrites::default()));
    options
}

fn is_file(mode: EntryMode) -> bool {
    !(mode.is_tree() || mode.is_commit())
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(BINARY_PROBE_LEN).any(|&b| b == 0)
}

fn line_diff(old: &[u8], new: &[u8]) -> (u64, u64) {
    let old_text = String::from_utf8_lossy(old);
    let new_text = String::from_utf8_lossy(new);
    let diff = TextDiff::from_lines(old_text.as_ref(), new_text.as_ref());

    let mut insertions = 0u64;
    let mut deletions = 0u64;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => insertions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }
    (insertions, deletions)
}

/// Resolve an absolute date or a duration relative to now. `Ok(None)`
/// means the input is neither and may still name a git revision.
pub fn resolve_date(input: &str) -> Result<Option<DateTime<Utc>>> {
    if let Some(dt) = parse_date(input) {
        return Ok(Some(dt));
    }
    let Some(duration) = parse_relative_duration(input) else {
        return Ok(None);
    };
    let target = SystemTime::now()
        .checked_sub(duration)
        .ok_or_else(|| CollabError::InvalidDate(format!("Duration overflow for '{input}'")))?;
    Ok(Some(DateTime::<Utc>::from(target)))
}

fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt))
}

/// "3 weeks ago", "90d", "-2months"
fn parse_relative_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    let input = input.strip_suffix(" ago").unwrap_or(&input);
    let input = input.trim().trim_start_matches('-');

    for (unit, secs) in [("day", 86_400u64), ("week", 7 * 86_400), ("month", 30 * 86_400)] {
        let rest = input
            .strip_suffix(unit)
            .or_else(|| input.strip_suffix(&format!("{unit}s")));
        if let Some(n) = rest.and_then(|n| n.trim().parse::<u64>().ok()) {
            return n.checked_mul(secs).map(Duration::from_secs);
        }
    }

    humantime::parse_duration(input).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_durations() {
        let day = 86_400;
        assert_eq!(parse_relative_duration("3 days ago"), Some(Duration::from_secs(3 * day)));
        assert_eq!(parse_relative_duration("2 weeks ago"), Some(Duration::from_secs(14 * day)));
        assert_eq!(parse_relative_duration("1 month ago"), Some(Duration::from_secs(30 * day)));
        assert_eq!(parse_relative_duration("-90d"), Some(Duration::from_secs(90 * day)));
        assert_eq!(parse_relative_duration("12h"), Some(Duration::from_secs(12 * 3600)));
        assert_eq!(parse_relative_duration("HEAD~3"), None);
    }

    #[test]
    fn oversized_relative_duration_is_not_a_date() {
        assert_eq!(parse_relative_duration("99999999999999999days"), None);
        assert_eq!(parse_relative_duration("99999999999999999 weeks ago"), None);
        assert!(resolve_date("99999999999999999days").unwrap().is_none());
    }

    #[test]
    fn resolve_date_accepts_relative_input() {
        let dt = resolve_date("2 days ago").unwrap().unwrap();
        assert!(dt < Utc::now());
        assert!(resolve_date("main").unwrap().is_none());
    }

    #[test]
    fn absolute_dates() {
        let dt = parse_date("2024-02-29").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-02-29T00:00:00+00:00");
        assert!(parse_date("2024-02-29T10:00:00+02:00").is_some());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn binary_probe_looks_for_nul() {
        assert!(is_binary(b"PNG\0\x01"));
        assert!(!is_binary(b"fn main() {}\n"));
        assert!(!is_binary(b""));
    }

    #[test]
    fn line_diff_counts_changed_lines() {
        assert_eq!(line_diff(b"", b"a\nb\n"), (2, 0));
        assert_eq!(line_diff(b"a\nb\nc\n", b"a\nc\n"), (0, 1));
        assert_eq!(line_diff(b"a\nb\n", b"a\nB\n"), (1, 1));
        assert_eq!(line_diff(b"same\n", b"same\n"), (0, 0));
    }
}
