use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::knn::KnnClassifier;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write model to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read model from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode model for {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode model at {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Persists the full fitted classifier (training set, k, dimension) so it
/// can be reloaded without retraining. No schema versioning: callers own
/// compatibility across format changes.
pub fn save(model: &KnnClassifier, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let encoded = serde_json::to_string(model).map_err(|source| StoreError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, encoded).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load(path: impl AsRef<Path>) -> Result<KnnClassifier, StoreError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, StrategyIdentity};

    fn fitted_model() -> KnnClassifier {
        let mut dataset = Dataset::new();
        for (value, identity) in StrategyIdentity::ALL.iter().enumerate() {
            for offset in 0..5 {
                dataset
                    .push(
                        vec![value as f64 * 4.0 + offset as f64 * 0.1, 1.0],
                        *identity,
                    )
                    .expect("push");
            }
        }
        KnnClassifier::fit(&dataset, 3).expect("fit")
    }

    #[test]
    fn round_trip_reproduces_predictions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("models").join("knn.json");

        let model = fitted_model();
        save(&model, &path).expect("save");
        let reloaded = load(&path).expect("load");

        assert_eq!(reloaded.k(), model.k());
        assert_eq!(reloaded.dim(), model.dim());
        assert_eq!(reloaded.training_size(), model.training_size());
        for query in [[0.3, 1.0], [4.2, 0.9], [8.1, 1.1], [12.7, 1.0]] {
            assert_eq!(
                reloaded.predict(&query).expect("predict"),
                model.predict(&query).expect("predict")
            );
        }
    }

    #[test]
    fn load_from_missing_path_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load(dir.path().join("absent.json")).expect_err("missing file");
        assert!(matches!(err, StoreError::Read { .. }));
    }

    #[test]
    fn load_from_garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("garbage.json");
        fs::write(&path, "not a model").expect("write");
        let err = load(&path).expect_err("garbage");
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
