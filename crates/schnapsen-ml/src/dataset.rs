use core::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separates feature values within one observation line.
pub const FEATURE_DELIMITER: char = ',';
/// Separates the feature block from the game-outcome indicator.
pub const OUTCOME_DELIMITER: &str = "||";

/// Tag for one of the candidate strategies a replay log was recorded under.
/// Every log file carries exactly one identity, supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum StrategyIdentity {
    Random = 0,
    Bully = 1,
    Rdeep = 2,
    Chaser = 3,
}

impl StrategyIdentity {
    pub const ALL: [StrategyIdentity; 4] = [
        StrategyIdentity::Random,
        StrategyIdentity::Bully,
        StrategyIdentity::Rdeep,
        StrategyIdentity::Chaser,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StrategyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StrategyIdentity::Random => "random",
            StrategyIdentity::Bully => "bully",
            StrategyIdentity::Rdeep => "rdeep",
            StrategyIdentity::Chaser => "chaser",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
#[error("unknown strategy '{0}'")]
pub struct UnknownStrategy(String);

impl FromStr for StrategyIdentity {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(StrategyIdentity::Random),
            "bully" => Ok(StrategyIdentity::Bully),
            "rdeep" => Ok(StrategyIdentity::Rdeep),
            "chaser" => Ok(StrategyIdentity::Chaser),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// A feature vector whose length deviates from the dataset's dimension.
#[derive(Debug, Clone, Copy, Error)]
#[error("expected dimension {expected}, found {found}")]
pub struct DimensionError {
    pub expected: usize,
    pub found: usize,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read replay log {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record at {path:?} line {line}: {reason}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("feature dimension mismatch at {path:?} line {line}: expected {expected}, found {found}")]
    DimensionMismatch {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Labeled feature vectors with a uniform dimension. The label is the
/// strategy that produced the decision, never the game outcome.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<(Vec<f64>, StrategyIdentity)>,
    dim: Option<usize>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The feature dimension, fixed by the first record.
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn records(&self) -> &[(Vec<f64>, StrategyIdentity)] {
        &self.records
    }

    pub fn push(
        &mut self,
        vector: Vec<f64>,
        label: StrategyIdentity,
    ) -> Result<(), DimensionError> {
        match self.dim {
            Some(expected) if expected != vector.len() => Err(DimensionError {
                expected,
                found: vector.len(),
            }),
            _ => {
                self.dim.get_or_insert(vector.len());
                self.records.push((vector, label));
                Ok(())
            }
        }
    }

    /// Splits into (train, holdout) with a seeded shuffle. The two parts are
    /// disjoint and together contain every record exactly once; the same
    /// seed over the same record order reproduces the same partition. The
    /// shuffle is plain, not stratified per class.
    pub fn split(self, holdout_fraction: f64, seed: u64) -> (Dataset, Dataset) {
        let total = self.records.len();
        let holdout_count = ((total as f64) * holdout_fraction).round() as usize;
        let holdout_count = holdout_count.min(total);

        let mut indices: Vec<usize> = (0..total).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let mut records: Vec<Option<(Vec<f64>, StrategyIdentity)>> =
            self.records.into_iter().map(Some).collect();

        let mut holdout = Dataset {
            records: Vec::with_capacity(holdout_count),
            dim: self.dim,
        };
        let mut train = Dataset {
            records: Vec::with_capacity(total - holdout_count),
            dim: self.dim,
        };

        for (position, index) in indices.into_iter().enumerate() {
            let record = records[index].take().expect("each index is visited once");
            if position < holdout_count {
                holdout.records.push(record);
            } else {
                train.records.push(record);
            }
        }

        (train, holdout)
    }
}

/// Reads every `(identity, log file)` pair into one dataset. The per-record
/// outcome indicator is validated and then discarded; records are labeled
/// with the identity configured for their log.
pub fn assemble(sources: &[(StrategyIdentity, PathBuf)]) -> Result<Dataset, DatasetError> {
    let mut dataset = Dataset::new();

    for (identity, path) in sources {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.clone(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut loaded = 0usize;

        for (line_index, line) in reader.lines().enumerate() {
            let line_number = line_index + 1;
            let line = line.map_err(|source| DatasetError::Io {
                path: path.clone(),
                source,
            })?;

            let vector = parse_record(&line).map_err(|reason| DatasetError::MalformedRecord {
                path: path.clone(),
                line: line_number,
                reason,
            })?;

            dataset
                .push(vector, *identity)
                .map_err(|err| DatasetError::DimensionMismatch {
                    path: path.clone(),
                    line: line_number,
                    expected: err.expected,
                    found: err.found,
                })?;
            loaded += 1;
        }

        tracing::debug!(%identity, path = %path.display(), records = loaded, "loaded replay log");
    }

    Ok(dataset)
}

/// Parses one `f0,f1,...||o` line, returning the feature vector. The
/// outcome token must be `0` or `1` but is not returned: this pipeline
/// learns strategy identity, not game outcome.
fn parse_record(line: &str) -> Result<Vec<f64>, String> {
    let Some((features_part, outcome_part)) = line.split_once(OUTCOME_DELIMITER) else {
        return Err(format!("missing '{OUTCOME_DELIMITER}' outcome delimiter"));
    };

    if outcome_part != "0" && outcome_part != "1" {
        return Err(format!(
            "outcome indicator must be 0 or 1, found '{outcome_part}'"
        ));
    }

    features_part
        .split(FEATURE_DELIMITER)
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| format!("non-numeric feature token '{token}'"))
        })
        .collect()
}
