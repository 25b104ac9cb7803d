use crate::analysis::Analysis;
use crate::cli::CommonArgs;
use crate::fetch::{analysis_config, fetch_commits, CommitSource};
use crate::model::{ContributorSummary, TopOutput, SCHEMA_VERSION};
use anyhow::Context;
use chrono::Utc;
use console::style;

pub fn exec(common: CommonArgs, json: bool, ndjson: bool, limit: Option<usize>) -> anyhow::Result<()> {
    let source = fetch_commits(&common, !json && !ndjson)?;
    let config = analysis_config(&common, &source, None, limit, None)?;

    let report = Analysis::new(config.clone())
        .run(&source.commits)
        .context("Failed to rank contributors")?;

    if json {
        output_json(&report.contributors, &source, &common, config.top)?;
    } else if ndjson {
        output_ndjson(&report.contributors)?;
    } else {
        output_table(&report.contributors)?;
    }

    Ok(())
}

fn output_json(
    contributors: &[ContributorSummary],
    source: &CommitSource,
    common: &CommonArgs,
    limit: usize,
) -> anyhow::Result<()> {
    let output = TopOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        source: source.label.clone(),
        since: common.since.clone(),
        until: common.until.clone(),
        limit,
        contributors: contributors.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub(crate) fn output_ndjson(contributors: &[ContributorSummary]) -> anyhow::Result<()> {
    for c in contributors {
        println!("{}", serde_json::to_string(c)?);
    }
    Ok(())
}

pub(crate) fn output_table(contributors: &[ContributorSummary]) -> anyhow::Result<()> {
    println!("{}", style("Top contributors").bold());
    println!("{}", "─".repeat(80));

    if contributors.is_empty() {
        println!("No commits to rank");
        return Ok(());
    }

    println!(
        "{:<4} {:<32} {:>10} {:>10} {:>8} {:>12}",
        style("#").bold(),
        style("Developer").bold(),
        style("Added").bold(),
        style("Deleted").bold(),
        style("Commits").bold(),
        style("Files/commit").bold()
    );
    for (i, c) in contributors.iter().enumerate() {
        println!(
            "{:<4} {:<32} {:>10} {:>10} {:>8} {:>12.2}",
            i + 1,
            c.developer,
            style(c.insertions).green(),
            style(c.deletions).red(),
            c.commits,
            c.average_files_per_commit
        );
    }
    Ok(())
}
