use crate::analysis::Analysis;
use crate::cli::CommonArgs;
use crate::config::AnalysisConfig;
use crate::fetch::{analysis_config, fetch_commits, CommitSource};
use crate::model::{PairsOutput, SimilarityPair, SCHEMA_VERSION};
use anyhow::Context;
use chrono::Utc;
use console::style;

pub fn exec(
    common: CommonArgs,
    json: bool,
    ndjson: bool,
    threshold: Option<f64>,
    min_activity: Option<f64>,
) -> anyhow::Result<()> {
    let source = fetch_commits(&common, !json && !ndjson)?;
    let config = analysis_config(&common, &source, threshold, None, min_activity)?;

    let report = Analysis::new(config.clone())
        .run(&source.commits)
        .context("Failed to compute collaboration similarity")?;

    if json {
        output_json(&report.pairs, &source, &common, &config)?;
    } else if ndjson {
        output_ndjson(&report.pairs)?;
    } else {
        output_table(&report.pairs, &config)?;
    }

    Ok(())
}

fn output_json(
    pairs: &[SimilarityPair],
    source: &CommitSource,
    common: &CommonArgs,
    config: &AnalysisConfig,
) -> anyhow::Result<()> {
    let output = PairsOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        source: source.label.clone(),
        since: common.since.clone(),
        until: common.until.clone(),
        threshold: config.threshold,
        min_activity: config.min_activity,
        pairs: pairs.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub(crate) fn output_ndjson(pairs: &[SimilarityPair]) -> anyhow::Result<()> {
    for p in pairs {
        println!("{}", serde_json::to_string(p)?);
    }
    Ok(())
}

pub(crate) fn output_table(pairs: &[SimilarityPair], config: &AnalysisConfig) -> anyhow::Result<()> {
    println!(
        "{}",
        style(format!(
            "Collaboration pairs (similarity > {:.0}%)",
            config.threshold * 100.0
        ))
        .bold()
    );
    println!("{}", "─".repeat(72));

    if pairs.is_empty() {
        println!("No developer pairs above the threshold");
        return Ok(());
    }

    println!(
        "{:<30} {:<30} {:>10}",
        style("Developer").bold(),
        style("Developer").bold(),
        style("Similarity").bold()
    );
    for p in pairs {
        println!(
            "{:<30} {:<30} {:>9}%",
            p.developer_a,
            p.developer_b,
            style(p.similarity_percent).cyan()
        );
    }
    Ok(())
}
