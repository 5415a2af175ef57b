use schnapsen_core::game::engine::{self, EngineError};
use schnapsen_core::game::state::PlayerId;
use schnapsen_ml::dataset::StrategyIdentity;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::replay::spawn_bot;

const PROGRESS_INTERVAL: usize = 50;

/// Head-to-head experiment result with a two-sided normal-approximation
/// test of the first strategy's win count against a fair coin.
#[derive(Debug, Clone)]
pub struct MatchupReport {
    pub first: StrategyIdentity,
    pub second: StrategyIdentity,
    pub games: usize,
    pub first_wins: usize,
    pub second_wins: usize,
    pub z_score: f64,
    pub p_value: f64,
}

impl MatchupReport {
    pub fn first_win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.first_wins as f64 / self.games as f64
        }
    }
}

#[derive(Debug, Error)]
pub enum MatchupError {
    #[error("game {game} failed: {source}")]
    Game {
        game: usize,
        #[source]
        source: EngineError,
    },
}

/// Plays `games` seeded games between the two strategies, alternating who
/// leads, and reports win counts with the significance test.
pub fn run_matchup(
    first: StrategyIdentity,
    second: StrategyIdentity,
    games: usize,
    seed: u64,
) -> Result<MatchupReport, MatchupError> {
    let mut first_bot = spawn_bot(first, seed.wrapping_add(1));
    let mut second_bot = spawn_bot(second, seed.wrapping_add(2));

    let mut first_wins = 0usize;
    for game in 1..=games {
        let game_seed = seed.wrapping_add(game as u64);
        // Swap the lead every other game so both strategies start equally often.
        let (outcome, first_was_leader) = if game % 2 == 0 {
            (
                engine::play_game(second_bot.as_mut(), first_bot.as_mut(), game_seed),
                false,
            )
        } else {
            (
                engine::play_game(first_bot.as_mut(), second_bot.as_mut(), game_seed),
                true,
            )
        };
        let outcome = outcome.map_err(|source| MatchupError::Game { game, source })?;

        let first_won = match outcome.winner {
            PlayerId::One => first_was_leader,
            PlayerId::Two => !first_was_leader,
        };
        if first_won {
            first_wins += 1;
        }

        if game % PROGRESS_INTERVAL == 0 {
            println!("Progress: {game}/{games} games finished");
        }
    }

    let (z_score, p_value) = fair_coin_test(first_wins, games);

    Ok(MatchupReport {
        first,
        second,
        games,
        first_wins,
        second_wins: games - first_wins,
        z_score,
        p_value,
    })
}

/// Two-sided one-sample proportion z-test against p = 0.5.
fn fair_coin_test(wins: usize, games: usize) -> (f64, f64) {
    if games == 0 {
        return (0.0, 1.0);
    }

    let n = games as f64;
    let z = (wins as f64 - n * 0.5) / (n * 0.25).sqrt();
    let normal = Normal::new(0.0, 1.0).unwrap();
    let p = 2.0 * (1.0 - normal.cdf(z.abs()));
    (z, p.clamp(0.0, 1.0))
}
