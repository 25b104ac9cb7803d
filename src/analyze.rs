use crate::analysis::{Analysis, AnalysisReport};
use crate::cli::CommonArgs;
use crate::fetch::{analysis_config, fetch_commits, CommitSource};
use crate::model::{AnalyzeOutput, SCHEMA_VERSION};
use anyhow::Context;
use chrono::Utc;
use console::style;
use serde_json::json;

pub fn exec(
    common: CommonArgs,
    json: bool,
    ndjson: bool,
    threshold: Option<f64>,
    min_activity: Option<f64>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let source = fetch_commits(&common, !json && !ndjson)?;
    let config = analysis_config(&common, &source, threshold, limit, min_activity)?;

    let report = Analysis::new(config.clone())
        .run(&source.commits)
        .context("Failed to analyze commit history")?;

    if json {
        output_json(&report, &source, &common)?;
    } else if ndjson {
        output_ndjson(&report)?;
    } else {
        println!(
            "Analyzed {} commits across {} files",
            style(source.commits.len()).cyan(),
            style(report.history.len()).cyan()
        );
        println!();
        crate::pairs::output_table(&report.pairs, &config)?;
        println!();
        crate::top::output_table(&report.contributors)?;
    }

    Ok(())
}

fn output_json(report: &AnalysisReport, source: &CommitSource, common: &CommonArgs) -> anyhow::Result<()> {
    let output = AnalyzeOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        source: source.label.clone(),
        since: common.since.clone(),
        until: common.until.clone(),
        commit_count: source.commits.len(),
        file_count: report.history.len(),
        pairs: report.pairs.clone(),
        contributors: report.contributors.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// One line per record, tagged with `kind` so pairs and contributors can
/// share a stream.
fn output_ndjson(report: &AnalysisReport) -> anyhow::Result<()> {
    for p in &report.pairs {
        println!("{}", json!({ "kind": "pair", "pair": p }));
    }
    for c in &report.contributors {
        println!("{}", json!({ "kind": "contributor", "contributor": c }));
    }
    Ok(())
}
