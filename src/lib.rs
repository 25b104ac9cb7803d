//! Collaboration similarity and top-contributor analysis over git history.
//!
//! Commit records come from a repository (via gix) or a JSON export. File
//! histories are merged across renames before contribution weights, pairwise
//! similarity and contributor rankings are computed.

pub mod analysis;
pub mod analyze;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod git;
pub mod model;
pub mod pairs;
pub mod top;

pub use analysis::{Analysis, AnalysisReport};
pub use config::AnalysisConfig;
pub use error::{CollabError, Result};
