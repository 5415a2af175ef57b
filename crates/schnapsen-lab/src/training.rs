use std::fs;
use std::path::{Path, PathBuf};

use schnapsen_ml::dataset::{self, DatasetError, StrategyIdentity};
use schnapsen_ml::knn::{Evaluation, KnnClassifier, KnnError};
use schnapsen_ml::store::{self, StoreError};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::LabConfig;

/// Runs the dataset-assembly / train / evaluate / persist pipeline over the
/// logs produced by the replay targets.
pub struct TrainingRunner {
    config: LabConfig,
}

/// Summary details returned after a training run.
pub struct TrainingSummary {
    pub train_records: usize,
    pub holdout_records: usize,
    pub dim: usize,
    pub evaluation: Evaluation,
    pub model_path: PathBuf,
    pub summary_path: PathBuf,
    pub summary_json_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Knn(#[from] KnnError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode summary for {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TrainingRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: LabConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<TrainingSummary, TrainingError> {
        let sources: Vec<(StrategyIdentity, PathBuf)> = self
            .config
            .replay
            .targets
            .iter()
            .map(|target| (target.strategy, target.resolved_log(&self.config.run_id)))
            .collect();

        let dataset = dataset::assemble(&sources)?;
        let dim = dataset.dim().unwrap_or(0);
        let total = dataset.len();

        let (train, holdout) = dataset.split(
            self.config.training.holdout_fraction,
            self.config.training.shuffle_seed,
        );
        let model = KnnClassifier::fit(&train, self.config.training.k)?;
        let evaluation = model.evaluate(&holdout)?;

        let outputs = self.config.resolved_outputs();
        store::save(&model, &outputs.model)?;
        write_markdown(&outputs.summary_md, &self.config, &evaluation, &train, &holdout)?;
        let summary_json_path = outputs.summary_md.with_extension("json");
        write_json(&summary_json_path, &evaluation)?;

        event!(
            target: "schnapsen_lab::training",
            Level::INFO,
            run_id = %self.config.run_id,
            records = total as u64,
            dim = dim as u64,
            k = self.config.training.k as u64,
            accuracy = evaluation.accuracy(),
            model = %outputs.model.display()
        );

        Ok(TrainingSummary {
            train_records: train.len(),
            holdout_records: holdout.len(),
            dim,
            evaluation,
            model_path: outputs.model,
            summary_path: outputs.summary_md,
            summary_json_path,
        })
    }
}

fn write_json(path: &Path, evaluation: &Evaluation) -> Result<(), TrainingError> {
    let encoded =
        serde_json::to_string_pretty(evaluation).map_err(|source| TrainingError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, encoded).map_err(|source| TrainingError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_markdown(
    path: &Path,
    config: &LabConfig,
    evaluation: &Evaluation,
    train: &schnapsen_ml::dataset::Dataset,
    holdout: &schnapsen_ml::dataset::Dataset,
) -> Result<(), TrainingError> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| TrainingError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut rows = String::new();
    rows.push_str("# Strategy Classification Summary\n\n");
    rows.push_str(&format!(
        "Run `{}`: k = {}, {} training records, {} holdout records.\n\n",
        config.run_id,
        config.training.k,
        train.len(),
        holdout.len(),
    ));
    rows.push_str(&format!(
        "Holdout accuracy: **{:.3}**\n\n",
        evaluation.accuracy()
    ));
    rows.push_str("| Strategy | Support | Predicted | Precision | Recall |\n");
    rows.push_str("|----------|---------|-----------|-----------|--------|\n");

    for class in &evaluation.classes {
        rows.push_str(&format!(
            "| {label} | {support} | {predicted} | {precision:.3} | {recall:.3} |\n",
            label = class.label,
            support = class.support,
            predicted = class.predicted,
            precision = class.precision(),
            recall = class.recall(),
        ));
    }

    fs::write(path, rows).map_err(|source| TrainingError::Io {
        path: path.to_path_buf(),
        source,
    })
}
