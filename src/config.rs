//! Gauge configuration.
//!
//! Loaded from `gauge.toml` in the batch directory, or from `--config`.
//! Scoring thresholds have defaults; the remediation policy does not, so
//! `remediate` refuses to start without a `[remediation]` section.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors raised while loading configuration. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "no config file found at {}\n\
         Create one with at minimum:\n\n\
         [remediation]\n\
         max-cycles = 3",
        .0.display()
    )]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("no [remediation] section in {}", .0.display())]
    MissingPolicy(PathBuf),

    #[error("invalid value in {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Gauge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Acceptance policy for the remediation loop.
    pub remediation: Option<RemediationPolicy>,

    /// Scoring thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(skip)]
    path: PathBuf,
}

/// When a batch is good enough to stop remediating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RemediationPolicy {
    /// When false, one cycle is evaluated and the fixer is never invoked.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Hard cap on cycles, including the first.
    #[serde(alias = "maxCycles")]
    pub max_cycles: u32,

    #[serde(default = "default_min_pass_rate", alias = "minPassRate")]
    pub min_pass_rate: f64,

    #[serde(default, alias = "maxNeedsReviewRate")]
    pub max_needs_review_rate: f64,

    #[serde(default = "default_true", alias = "requireZeroCriticalFailures")]
    pub require_zero_critical_failures: bool,

    /// Every screen must pass; the rate thresholds are ignored.
    #[serde(default, alias = "strictPassRequired")]
    pub strict_pass_required: bool,
}

/// Scoring thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Thresholds {
    /// Worst visual diff (percent) strictly below this passes.
    pub visual_pass_below: f64,

    /// Worst visual diff (percent) up to and including this needs review.
    pub visual_review_up_to: f64,

    pub max_load_time_ms: u64,

    /// Ceiling for the largest script payload, in KB.
    pub max_script_kb: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            visual_pass_below: 2.0,
            visual_review_up_to: 10.0,
            max_load_time_ms: 3000,
            max_script_kb: 250,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_min_pass_rate() -> f64 {
    1.0
}

impl Config {
    /// The config file name inside a batch directory.
    pub const FILE_NAME: &'static str = "gauge.toml";

    /// Load config from `path`. Errors if the file is missing or invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(path, &contents)
    }

    /// Load config from `path`, falling back to defaults if it doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Missing(_)) => Ok(Self {
                path: path.to_path_buf(),
                ..Self::default()
            }),
            other => other,
        }
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.path = path.to_path_buf();
        config.check()?;
        Ok(config)
    }

    /// The remediation policy; required for the remediation loop.
    pub fn policy(&self) -> Result<RemediationPolicy, ConfigError> {
        self.remediation
            .ok_or_else(|| ConfigError::MissingPolicy(self.path.clone()))
    }

    fn check(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Invalid {
            path: self.path.clone(),
            message,
        };

        if let Some(policy) = &self.remediation {
            if policy.max_cycles == 0 {
                return Err(invalid("remediation.max-cycles must be at least 1".into()));
            }
            for (name, rate) in [
                ("min-pass-rate", policy.min_pass_rate),
                ("max-needs-review-rate", policy.max_needs_review_rate),
            ] {
                if !(0.0..=1.0).contains(&rate) {
                    return Err(invalid(format!(
                        "remediation.{name} must be between 0 and 1 (got {rate})"
                    )));
                }
            }
        }

        let t = &self.thresholds;
        if !(t.visual_pass_below > 0.0 && t.visual_pass_below <= t.visual_review_up_to) {
            return Err(invalid(
                "thresholds.visual-pass-below must be positive and not above visual-review-up-to"
                    .into(),
            ));
        }
        if t.max_load_time_ms == 0 || t.max_script_kb == 0 {
            return Err(invalid(
                "thresholds.max-load-time-ms and max-script-kb must be positive".into(),
            ));
        }

        Ok(())
    }
}
