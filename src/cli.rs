use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gcollab")]
#[command(about = "Git history analysis for developer collaboration and top contributors")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(
        long,
        conflicts_with = "repo",
        help = "Read commit records from a JSON file (as written by `export --json`) instead of a repository"
    )]
    pub input: Option<PathBuf>,

    #[arg(long, help = "Path to a TOML config file (defaults to .gcollab.toml in the repository)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Include merge commits")]
    pub include_merges: bool,

    #[arg(long, help = "Start from this commit or date (RFC3339, YYYY-MM-DD, or relative like '90d')")]
    pub since: Option<String>,

    #[arg(long, help = "End at this commit or date (RFC3339, YYYY-MM-DD, or relative like '90d')")]
    pub until: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Developer pairs that edit the same files
    Pairs {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, conflicts_with = "json", help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long, help = "Report pairs whose similarity is above this value, in [0, 1)")]
        threshold: Option<f64>,

        #[arg(long, help = "Skip pairs whose combined weight is below this value")]
        min_activity: Option<f64>,
    },
    /// Top contributors by lines inserted
    Top {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, conflicts_with = "json", help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long, short = 'n', help = "Number of contributors to show")]
        limit: Option<usize>,
    },
    /// Similarity pairs and top contributors in one report
    Analyze {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, conflicts_with = "json", help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long, help = "Report pairs whose similarity is above this value, in [0, 1)")]
        threshold: Option<f64>,

        #[arg(long, help = "Skip pairs whose combined weight is below this value")]
        min_activity: Option<f64>,

        #[arg(long, short = 'n', help = "Number of contributors to show")]
        limit: Option<usize>,
    },
    /// Dump the commit records used as analysis input
    Export {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, conflicts_with = "json", help = "Output as NDJSON")]
        ndjson: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Pairs {
                json,
                ndjson,
                threshold,
                min_activity,
            } => crate::pairs::exec(self.common, json, ndjson, threshold, min_activity),
            Commands::Top { json, ndjson, limit } => crate::top::exec(self.common, json, ndjson, limit),
            Commands::Analyze {
                json,
                ndjson,
                threshold,
                min_activity,
                limit,
            } => crate::analyze::exec(self.common, json, ndjson, threshold, min_activity, limit),
            Commands::Export { json, ndjson } => crate::export::exec(self.common, json, ndjson),
        }
    }
}
