use std::fs;
use std::path::{Path, PathBuf};

use schnapsen_bot::{BullyBot, ChaserBot, RandBot, RdeepBot};
use schnapsen_core::game::bot::Bot;
use schnapsen_core::game::engine::{self, EngineError};
use schnapsen_ml::dataset::StrategyIdentity;
use schnapsen_ml::recorder::{RecorderError, RecordingBot, ReplayLog};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{LabConfig, TargetConfig};

const PROGRESS_INTERVAL: usize = 500;
// Lookahead budget for rdeep targets, matching the rollout depth the
// strategy was tuned with.
const RDEEP_SAMPLES: usize = 6;
const RDEEP_DEPTH: usize = 6;

/// Drives replay generation: one observation log per configured target,
/// `games` seeded games each.
pub struct ReplayRunner {
    config: LabConfig,
}

/// Summary details returned after a generation run.
pub struct ReplaySummary {
    pub targets: usize,
    pub games_per_target: usize,
    pub records_written: usize,
    pub log_paths: Vec<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("game {game} of target '{target}' failed: {source}")]
    Game {
        target: String,
        game: usize,
        #[source]
        source: EngineError,
    },
    #[error(transparent)]
    Recorder(#[from] RecorderError),
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReplayRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: LabConfig) -> Self {
        Self { config }
    }

    /// Simulate every target sequentially, appending one line per recorded
    /// decision. With `overwrite` set, stale logs are deleted before the
    /// first game so a crash can never leave a mixed old/new log behind.
    pub fn run(&self) -> Result<ReplaySummary, ReplayError> {
        let base_seed = self.config.replay.seed.unwrap_or(0);
        let games = self.config.replay.games;
        let mut records_written = 0usize;
        let mut log_paths = Vec::new();

        for (target_index, target) in self.config.replay.targets.iter().enumerate() {
            let path = target.resolved_log(&self.config.run_id);
            ensure_parent(path.parent())?;

            if self.config.replay.overwrite && path.exists() {
                fs::remove_file(&path).map_err(|source| ReplayError::Io {
                    path: path.clone(),
                    source,
                })?;
            }

            let written = self.run_target(target, target_index, base_seed, &path)?;
            records_written += written;
            log_paths.push(path);
        }

        Ok(ReplaySummary {
            targets: self.config.replay.targets.len(),
            games_per_target: games,
            records_written,
            log_paths,
        })
    }

    fn run_target(
        &self,
        target: &TargetConfig,
        target_index: usize,
        base_seed: u64,
        path: &Path,
    ) -> Result<usize, ReplayError> {
        let label = target.label();
        let games = self.config.replay.games;
        let log = ReplayLog::new(path.to_path_buf());

        // Bot seeds are derived from the base seed and target position, so a
        // re-run reproduces the logs byte for byte.
        let seed_a = base_seed.wrapping_add(target_index as u64 * 2 + 1);
        let seed_b = base_seed.wrapping_add(target_index as u64 * 2 + 2);

        let mut recorder = RecordingBot::new(spawn_bot(target.strategy, seed_a), log.clone());
        // In a self-play pair both seats produce observations of the same
        // strategy, so both land in the target's log.
        let mut opponent = if target.opponent() == target.strategy {
            OpponentSeat::Recorded(RecordingBot::new(spawn_bot(target.opponent(), seed_b), log))
        } else {
            OpponentSeat::Plain(spawn_bot(target.opponent(), seed_b))
        };

        for game in 1..=games {
            let seed = base_seed.wrapping_add(game as u64);
            // Swap the lead every other game so both seats start equally often.
            let result = if game % 2 == 0 {
                engine::play_game(opponent.as_bot_mut(), &mut recorder, seed)
            } else {
                engine::play_game(&mut recorder, opponent.as_bot_mut(), seed)
            };
            result.map_err(|source| ReplayError::Game {
                target: label.clone(),
                game,
                source,
            })?;

            if let Some(failure) = recorder.take_failure() {
                return Err(failure.into());
            }
            if let OpponentSeat::Recorded(other) = &mut opponent
                && let Some(failure) = other.take_failure()
            {
                return Err(failure.into());
            }

            if game % PROGRESS_INTERVAL == 0 {
                println!("Progress: {game}/{games} games for target '{label}'");
            }
        }

        let mut written = recorder.records_written();
        if let OpponentSeat::Recorded(other) = &opponent {
            written += other.records_written();
        }

        event!(
            target: "schnapsen_lab::replay",
            Level::INFO,
            run_id = %self.config.run_id,
            target_label = %label,
            games = games as u64,
            records = written as u64,
            log = %path.display()
        );

        Ok(written)
    }
}

enum OpponentSeat {
    Recorded(RecordingBot),
    Plain(Box<dyn Bot>),
}

impl OpponentSeat {
    fn as_bot_mut(&mut self) -> &mut dyn Bot {
        match self {
            OpponentSeat::Recorded(bot) => bot,
            OpponentSeat::Plain(bot) => bot.as_mut(),
        }
    }
}

pub(crate) fn spawn_bot(identity: StrategyIdentity, seed: u64) -> Box<dyn Bot> {
    match identity {
        StrategyIdentity::Random => Box::new(RandBot::new(seed)),
        StrategyIdentity::Bully => Box::new(BullyBot::new(seed)),
        StrategyIdentity::Rdeep => Box::new(RdeepBot::new(RDEEP_SAMPLES, RDEEP_DEPTH, seed)),
        StrategyIdentity::Chaser => Box::new(ChaserBot::new(seed)),
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), ReplayError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| ReplayError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
