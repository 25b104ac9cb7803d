//! Analysis settings.
//!
//! Resolution order: built-in defaults, then a TOML file (`--config` or
//! `.gcollab.toml` in the repository root), then command line flags.

use crate::error::{CollabError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = ".gcollab.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pairs must score strictly above this similarity, in `[0, 1)`.
    pub threshold: f64,
    /// Number of contributors kept by the ranking.
    pub top: usize,
    /// Pairs whose combined weight is below this floor are never compared.
    pub min_activity: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            top: 5,
            min_activity: 100.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    analysis: AnalysisConfig,
}

impl AnalysisConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.analysis)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load an explicit config file, or `.gcollab.toml` under `root` if it
    /// exists, falling back to defaults.
    pub fn load(explicit: Option<&Path>, root: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config file");
            return Self::from_file(path);
        }
        if let Some(candidate) = root.map(|r| r.join(CONFIG_FILE_NAME)) {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "loading repository config");
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn with_overrides(
        mut self,
        threshold: Option<f64>,
        top: Option<usize>,
        min_activity: Option<f64>,
    ) -> Self {
        if let Some(t) = threshold {
            self.threshold = t;
        }
        if let Some(n) = top {
            self.top = n;
        }
        if let Some(m) = min_activity {
            self.min_activity = m;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.threshold) {
            return Err(CollabError::Config(format!(
                "threshold must be in [0, 1), got {}",
                self.threshold
            )));
        }
        if self.top == 0 {
            return Err(CollabError::Config("top must be at least 1".into()));
        }
        if !self.min_activity.is_finite() || self.min_activity <= 0.0 {
            return Err(CollabError::Config(format!(
                "min_activity must be a positive number, got {}",
                self.min_activity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.threshold, 0.6);
        assert_eq!(config.top, 5);
        assert_eq!(config.min_activity, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = AnalysisConfig::from_toml("[analysis]\ntop = 10\n").unwrap();
        assert_eq!(config.top, 10);
        assert_eq!(config.threshold, 0.6);
    }

    #[test]
    fn empty_toml_is_default() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config.min_activity, 100.0);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            AnalysisConfig::from_toml("[analysis]\ntop = \"many\""),
            Err(CollabError::Toml(_))
        ));
    }

    #[test]
    fn flags_override_file_values() {
        let config = AnalysisConfig::from_toml("[analysis]\nthreshold = 0.3\ntop = 2\n")
            .unwrap()
            .with_overrides(Some(0.8), None, Some(50.0));
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.top, 2);
        assert_eq!(config.min_activity, 50.0);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let base = AnalysisConfig::default();
        assert!(base.clone().with_overrides(Some(1.0), None, None).validate().is_err());
        assert!(base.clone().with_overrides(Some(-0.1), None, None).validate().is_err());
        assert!(base.clone().with_overrides(None, Some(0), None).validate().is_err());
        assert!(base.clone().with_overrides(None, None, Some(-1.0)).validate().is_err());
        assert!(base.with_overrides(None, None, Some(f64::NAN)).validate().is_err());
    }

    #[test]
    fn zero_activity_floor_is_rejected() {
        let config = AnalysisConfig::default().with_overrides(None, None, Some(0.0));
        assert!(matches!(config.validate(), Err(CollabError::Config(_))));
        let config = AnalysisConfig::default().with_overrides(None, None, Some(0.5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_picks_up_repository_config() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[analysis]\ntop = 3\n").unwrap();
        let config = AnalysisConfig::load(None, Some(dir.path())).unwrap();
        assert_eq!(config.top, 3);
    }

    #[test]
    fn load_without_file_is_default() {
        let dir = tempdir().unwrap();
        let config = AnalysisConfig::load(None, Some(dir.path())).unwrap();
        assert_eq!(config.top, 5);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            AnalysisConfig::load(Some(&missing), None),
            Err(CollabError::Io(_))
        ));
    }
}
