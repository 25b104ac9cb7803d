use crate::cli::CommonArgs;
use crate::fetch::{fetch_commits, CommitSource};
use crate::model::{CommitRecord, ExportOutput, SCHEMA_VERSION};
use chrono::Utc;
use console::style;
use std::collections::HashSet;

pub fn exec(common: CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let source = fetch_commits(&common, !json && !ndjson)?;

    if json {
        output_json(&source, &common)?;
    } else if ndjson {
        output_ndjson(&source.commits)?;
    } else {
        output_summary(&source.commits)?;
    }

    Ok(())
}

fn output_json(source: &CommitSource, common: &CommonArgs) -> anyhow::Result<()> {
    let output = ExportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        source: source.label.clone(),
        since: common.since.clone(),
        until: common.until.clone(),
        commits: source.commits.clone(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_ndjson(commits: &[CommitRecord]) -> anyhow::Result<()> {
    for commit in commits {
        println!("{}", serde_json::to_string(commit)?);
    }
    Ok(())
}

fn output_summary(commits: &[CommitRecord]) -> anyhow::Result<()> {
    println!("{}", style("Export Summary").bold());
    println!("{}", "─".repeat(50));

    let total_files: usize = commits.iter().map(|c| c.files.len()).sum();
    let files = || commits.iter().flat_map(|c| &c.files);
    let total_added: u64 = files().map(|f| f.insertions).sum();
    let total_deleted: u64 = files().map(|f| f.deletions).sum();
    let renames = files().filter(|f| f.path.contains(" => ")).count();
    let binary = files().filter(|f| f.binary).count();
    let unique_authors: HashSet<_> = commits.iter().map(|c| &c.author).collect();

    println!("Total commits: {}", style(commits.len()).cyan());
    println!("Total file changes: {}", style(total_files).cyan());
    println!("Renames: {}", style(renames).cyan());
    println!("Binary changes: {}", style(binary).cyan());
    println!("Total lines added: {}", style(total_added).green());
    println!("Total lines deleted: {}", style(total_deleted).red());
    println!("Unique authors: {}", style(unique_authors.len()).yellow());

    let oldest = commits.iter().map(|c| c.timestamp).min();
    let newest = commits.iter().map(|c| c.timestamp).max();
    if let (Some(first), Some(last)) = (oldest, newest) {
        println!(
            "Date range: {} to {}",
            style(first.format("%Y-%m-%d")).dim(),
            style(last.format("%Y-%m-%d")).dim()
        );
    }

    println!("\nUse --json or --ndjson flags to export the raw data.");
    Ok(())
}
