use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

use schnapsen_ml::dataset::StrategyIdentity;
use schnapsen_ml::knn::DEFAULT_NEIGHBORS;

const DEFAULT_HOLDOUT_FRACTION: f64 = 0.3;
const DEFAULT_SHUFFLE_SEED: u64 = 7;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root harness configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LabConfig {
    pub run_id: String,
    pub replay: ReplayConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LabConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: LabConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.replay.validate(&self.run_id)?;
        self.training.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            model: resolve_template(&self.run_id, &self.outputs.model),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// Replay-generation configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReplayConfig {
    /// Number of games simulated per target.
    pub games: usize,
    /// Base seed; game `i` of every target runs with `seed + i`.
    pub seed: Option<u64>,
    /// Delete pre-existing logs before simulating instead of appending.
    #[serde(default)]
    pub overwrite: bool,
    pub targets: Vec<TargetConfig>,
}

impl ReplayConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        if self.games == 0 {
            return Err(ValidationError::InvalidField {
                field: "replay.games".to_string(),
                message: "number of games must be greater than zero".to_string(),
            });
        }

        if self.targets.is_empty() {
            return Err(ValidationError::InvalidField {
                field: "replay.targets".to_string(),
                message: "at least one target must be specified".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (index, target) in self.targets.iter().enumerate() {
            if target.log.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: format!("replay.targets[{index}].log"),
                    message: "log path must not be empty".to_string(),
                });
            }
            let resolved = target.resolved_log(run_id);
            if !seen.insert(resolved.clone()) {
                return Err(ValidationError::InvalidField {
                    field: format!("replay.targets[{index}].log"),
                    message: format!(
                        "log path '{}' is written by more than one target",
                        resolved.display()
                    ),
                });
            }
        }

        Ok(())
    }
}

/// One observation-log target: which strategy is recorded, whom it plays,
/// and where the log goes. The strategy field doubles as the label every
/// record of this log receives at assembly time.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TargetConfig {
    pub strategy: StrategyIdentity,
    /// Defaults to a self-play pair of the same strategy, in which case
    /// both seats are recorded into the log.
    #[serde(default)]
    pub opponent: Option<StrategyIdentity>,
    pub log: String,
}

impl TargetConfig {
    pub fn opponent(&self) -> StrategyIdentity {
        self.opponent.unwrap_or(self.strategy)
    }

    pub fn resolved_log(&self, run_id: &str) -> PathBuf {
        resolve_template(run_id, &self.log)
    }

    pub fn label(&self) -> String {
        format!("{}_vs_{}", self.strategy, self.opponent())
    }
}

/// Classifier-training configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrainingConfig {
    #[serde(default = "default_neighbors")]
    pub k: usize,
    #[serde(default = "default_holdout_fraction")]
    pub holdout_fraction: f64,
    #[serde(default = "default_shuffle_seed")]
    pub shuffle_seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_NEIGHBORS,
            holdout_fraction: DEFAULT_HOLDOUT_FRACTION,
            shuffle_seed: DEFAULT_SHUFFLE_SEED,
        }
    }
}

impl TrainingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.k == 0 {
            return Err(ValidationError::InvalidField {
                field: "training.k".to_string(),
                message: "neighbor count must be at least 1".to_string(),
            });
        }

        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(ValidationError::InvalidField {
                field: "training.holdout_fraction".to_string(),
                message: "holdout fraction must lie strictly between 0 and 1".to_string(),
            });
        }

        Ok(())
    }
}

fn default_neighbors() -> usize {
    DEFAULT_NEIGHBORS
}

fn default_holdout_fraction() -> f64 {
    DEFAULT_HOLDOUT_FRACTION
}

fn default_shuffle_seed() -> u64 {
    DEFAULT_SHUFFLE_SEED
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub model: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.model", &self.model),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub model: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
