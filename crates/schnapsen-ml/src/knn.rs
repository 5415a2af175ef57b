use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::{Dataset, StrategyIdentity};

pub const DEFAULT_NEIGHBORS: usize = 5;

#[derive(Debug, Error)]
pub enum KnnError {
    #[error("cannot fit a classifier on an empty training set")]
    EmptyTrainingSet,
    #[error("neighbor count {k} must be between 1 and the training size {size}")]
    InvalidNeighborCount { k: usize, size: usize },
    #[error("query vector has dimension {found}, classifier expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// A fitted k-nearest-neighbor classifier. Fitting stores the full training
/// set; there is no parametric compression. Prediction is a majority vote
/// among the k nearest points under squared Euclidean distance (rank
/// equivalent to Euclidean over the raw, unnormalized features).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    k: usize,
    dim: usize,
    points: Vec<TrainingPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrainingPoint {
    features: Vec<f64>,
    label: StrategyIdentity,
}

impl KnnClassifier {
    pub fn fit(train: &Dataset, k: usize) -> Result<Self, KnnError> {
        let dim = train.dim().ok_or(KnnError::EmptyTrainingSet)?;
        if k == 0 || k > train.len() {
            return Err(KnnError::InvalidNeighborCount {
                k,
                size: train.len(),
            });
        }

        let points = train
            .records()
            .iter()
            .map(|(features, label)| TrainingPoint {
                features: features.clone(),
                label: *label,
            })
            .collect();

        Ok(Self { k, dim, points })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn training_size(&self) -> usize {
        self.points.len()
    }

    /// Majority vote among the k nearest training points. A vote tie is
    /// resolved in favor of the tied label holding the nearest neighbor:
    /// neighbors are walked nearest-first and the first label that reaches
    /// the winning vote count is returned.
    pub fn predict(&self, query: &[f64]) -> Result<StrategyIdentity, KnnError> {
        if query.len() != self.dim {
            return Err(KnnError::DimensionMismatch {
                expected: self.dim,
                found: query.len(),
            });
        }

        let mut neighbors: Vec<(f64, StrategyIdentity)> = self
            .points
            .iter()
            .map(|point| (squared_distance(&point.features, query), point.label))
            .collect();
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));
        neighbors.truncate(self.k);

        let mut votes = [0usize; StrategyIdentity::ALL.len()];
        for (_, label) in &neighbors {
            votes[label.index()] += 1;
        }
        let winning = votes.iter().copied().max().unwrap_or(0);

        for (_, label) in &neighbors {
            if votes[label.index()] == winning {
                return Ok(*label);
            }
        }
        Err(KnnError::EmptyTrainingSet)
    }

    /// Accuracy plus per-class precision and recall over a holdout set.
    pub fn evaluate(&self, holdout: &Dataset) -> Result<Evaluation, KnnError> {
        let mut support = [0usize; StrategyIdentity::ALL.len()];
        let mut predicted = [0usize; StrategyIdentity::ALL.len()];
        let mut correct = [0usize; StrategyIdentity::ALL.len()];
        let mut correct_total = 0usize;

        for (vector, label) in holdout.records() {
            let prediction = self.predict(vector)?;
            support[label.index()] += 1;
            predicted[prediction.index()] += 1;
            if prediction == *label {
                correct[label.index()] += 1;
                correct_total += 1;
            }
        }

        let classes = StrategyIdentity::ALL
            .iter()
            .map(|identity| ClassReport {
                label: *identity,
                support: support[identity.index()],
                predicted: predicted[identity.index()],
                correct: correct[identity.index()],
            })
            .collect();

        Ok(Evaluation {
            total: holdout.len(),
            correct: correct_total,
            classes,
        })
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub total: usize,
    pub correct: usize,
    pub classes: Vec<ClassReport>,
}

impl Evaluation {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub label: StrategyIdentity,
    pub support: usize,
    pub predicted: usize,
    pub correct: usize,
}

impl ClassReport {
    pub fn precision(&self) -> f64 {
        if self.predicted == 0 {
            0.0
        } else {
            self.correct as f64 / self.predicted as f64
        }
    }

    pub fn recall(&self) -> f64 {
        if self.support == 0 {
            0.0
        } else {
            self.correct as f64 / self.support as f64
        }
    }
}
