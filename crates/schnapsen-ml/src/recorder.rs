use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use schnapsen_core::game::bot::Bot;
use schnapsen_core::game::perspective::Perspective;
use schnapsen_core::model::card::Card;
use schnapsen_core::model::moves::Move;
use thiserror::Error;

use crate::dataset::{FEATURE_DELIMITER, OUTCOME_DELIMITER};
use crate::features::extract_features;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("failed to append observations to {path:?}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only destination for observation records. One game's worth of
/// records is written in a single call, so a crash mid-game never leaves
/// partially labeled lines behind.
#[derive(Debug, Clone)]
pub struct ReplayLog {
    path: PathBuf,
}

impl ReplayLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line per buffered vector, all carrying the same outcome
    /// indicator. Returns the number of records written.
    pub fn append_game(&self, vectors: &[Vec<f64>], won: bool) -> Result<usize, RecorderError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.append_error(source))?;
        let mut writer = BufWriter::new(file);

        let outcome = if won { '1' } else { '0' };
        for vector in vectors {
            let mut line = String::new();
            for (index, value) in vector.iter().enumerate() {
                if index > 0 {
                    line.push(FEATURE_DELIMITER);
                }
                line.push_str(&value.to_string());
            }
            line.push_str(OUTCOME_DELIMITER);
            line.push(outcome);
            line.push('\n');
            writer
                .write_all(line.as_bytes())
                .map_err(|source| self.append_error(source))?;
        }

        writer.flush().map_err(|source| self.append_error(source))?;
        Ok(vectors.len())
    }

    fn append_error(&self, source: std::io::Error) -> RecorderError {
        RecorderError::Append {
            path: self.path.clone(),
            source,
        }
    }
}

/// Wraps a bot and records one feature vector per decision it makes. The
/// wrapped bot plays exactly as it would unwrapped; the recorder is a pure
/// observer. Vectors are buffered until the game ends, because the win/loss
/// indicator that labels them only exists then.
pub struct RecordingBot {
    inner: Box<dyn Bot>,
    log: ReplayLog,
    pending: Vec<Vec<f64>>,
    records_written: usize,
    failure: Option<RecorderError>,
}

impl RecordingBot {
    pub fn new(inner: Box<dyn Bot>, log: ReplayLog) -> Self {
        Self {
            inner,
            log,
            pending: Vec::new(),
            records_written: 0,
            failure: None,
        }
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Surfaces a write failure from the last finished game. The `Bot`
    /// notification hooks cannot return errors, so the driver polls this
    /// after every game.
    pub fn take_failure(&mut self) -> Option<RecorderError> {
        self.failure.take()
    }
}

impl Bot for RecordingBot {
    fn choose_move(&mut self, perspective: &Perspective<'_>) -> Move {
        self.pending.push(extract_features(perspective));
        self.inner.choose_move(perspective)
    }

    fn notify_trump_exchange(&mut self, jack: Card) {
        self.inner.notify_trump_exchange(jack);
    }

    fn notify_game_end(&mut self, won: bool, perspective: &Perspective<'_>) {
        match self.log.append_game(&self.pending, won) {
            Ok(count) => {
                self.records_written += count;
                tracing::debug!(
                    records = count,
                    won,
                    path = %self.log.path().display(),
                    "flushed game observations"
                );
            }
            Err(err) => self.failure = Some(err),
        }
        self.pending.clear();
        self.inner.notify_game_end(won, perspective);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{StrategyIdentity, assemble};
    use crate::features::FEATURE_DIM;
    use schnapsen_core::game::engine;
    use schnapsen_bot::RandBot;
    use std::fs;

    #[test]
    fn records_one_line_per_decision() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("random.txt");

        let mut recorder =
            RecordingBot::new(Box::new(RandBot::new(11)), ReplayLog::new(path.clone()));
        let mut opponent = RandBot::new(12);
        engine::play_game(&mut recorder, &mut opponent, 1).expect("game completes");

        assert!(recorder.take_failure().is_none());
        let contents = fs::read_to_string(&path).expect("log readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), recorder.records_written());
        assert!(!lines.is_empty());
        for line in &lines {
            assert!(line.contains(OUTCOME_DELIMITER));
        }

        // The log parses back with the recorder's feature dimension.
        let dataset = assemble(&[(StrategyIdentity::Random, path)]).expect("parses");
        assert_eq!(dataset.dim(), Some(FEATURE_DIM));
        assert_eq!(dataset.len(), lines.len());
    }

    #[test]
    fn outcome_is_shared_by_all_lines_of_a_game() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("random.txt");

        let mut recorder =
            RecordingBot::new(Box::new(RandBot::new(3)), ReplayLog::new(path.clone()));
        let mut opponent = RandBot::new(4);
        engine::play_game(&mut recorder, &mut opponent, 7).expect("game completes");

        let contents = fs::read_to_string(&path).expect("log readable");
        let outcomes: Vec<&str> = contents
            .lines()
            .map(|line| line.split_once(OUTCOME_DELIMITER).expect("delimited").1)
            .collect();
        assert!(outcomes.iter().all(|o| *o == outcomes[0]));
        assert!(outcomes[0] == "0" || outcomes[0] == "1");
    }

    #[test]
    fn nothing_is_written_before_game_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("random.txt");

        let state = engine::deal(9);
        let perspective =
            schnapsen_core::game::perspective::Perspective::leader(&state);
        let mut recorder =
            RecordingBot::new(Box::new(RandBot::new(5)), ReplayLog::new(path.clone()));
        let _ = recorder.choose_move(&perspective);

        assert!(!path.exists());
        assert_eq!(recorder.records_written(), 0);
    }

    #[test]
    fn games_append_rather_than_truncate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("random.txt");

        let mut recorder =
            RecordingBot::new(Box::new(RandBot::new(21)), ReplayLog::new(path.clone()));
        let mut opponent = RandBot::new(22);
        engine::play_game(&mut recorder, &mut opponent, 1).expect("first game");
        let after_first = fs::read_to_string(&path).expect("log").lines().count();
        engine::play_game(&mut recorder, &mut opponent, 2).expect("second game");
        let after_second = fs::read_to_string(&path).expect("log").lines().count();

        assert!(after_second > after_first);
        assert_eq!(after_second, recorder.records_written());
    }
}
