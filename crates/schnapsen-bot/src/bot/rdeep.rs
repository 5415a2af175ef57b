use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use schnapsen_core::game::bot::Bot;
use schnapsen_core::game::engine::{self, EngineError};
use schnapsen_core::game::perspective::Perspective;
use schnapsen_core::model::moves::Move;

/// Lookahead bot: scores every valid move by averaging bounded random
/// rollouts over determinized states and plays the best one.
pub struct RdeepBot {
    num_samples: usize,
    depth: usize,
    rng: SmallRng,
}

impl RdeepBot {
    /// `num_samples` rollouts per candidate move, each at most `depth`
    /// tricks deep. Both are clamped to at least one.
    pub fn new(num_samples: usize, depth: usize, seed: u64) -> Self {
        Self {
            num_samples: num_samples.max(1),
            depth: depth.max(1),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Rolls one determinized state forward with the candidate move fixed
    /// and random play thereafter, returning the share of direct points
    /// this bot ended up with.
    fn evaluate(&mut self, perspective: &Perspective<'_>, candidate: Move) -> Result<f64, EngineError> {
        let mut state = perspective.make_assumption(&mut self.rng);
        let my_id = perspective.my_id();
        let mut me = FixedFirstMoveBot::new(candidate, self.rng.next_u64());

        if perspective.is_leader() {
            let mut opponent = super::RandBot::new(self.rng.next_u64());
            engine::play_at_most_n_tricks(&mut state, &mut me, &mut opponent, self.depth)?;
        } else {
            let Some(leader_move) = perspective.leader_move().copied() else {
                return Ok(0.5);
            };
            let mut opponent = FixedFirstMoveBot::new(leader_move, self.rng.next_u64());
            engine::play_at_most_n_tricks(&mut state, &mut opponent, &mut me, self.depth)?;
        }

        let mine = state.player(my_id).score().direct_points as f64;
        let theirs = state.player(my_id.other()).score().direct_points as f64;
        if mine + theirs == 0.0 {
            Ok(0.5)
        } else {
            Ok(mine / (mine + theirs))
        }
    }
}

impl Bot for RdeepBot {
    fn choose_move(&mut self, perspective: &Perspective<'_>) -> Move {
        let mut moves = perspective.valid_moves();
        moves.shuffle(&mut self.rng);

        let mut best_move = moves[0];
        let mut best_score = f64::NEG_INFINITY;
        for candidate in moves {
            let mut total = 0.0;
            for _ in 0..self.num_samples {
                match self.evaluate(perspective, candidate) {
                    Ok(value) => total += value,
                    Err(err) => {
                        tracing::warn!(error = %err, "rollout aborted, scoring sample as zero");
                    }
                }
            }
            let average = total / self.num_samples as f64;
            if average > best_score {
                best_score = average;
                best_move = candidate;
            }
        }
        best_move
    }
}

/// Plays one predetermined move, then random valid moves. Used to pin the
/// candidate move (and the opponent's observed move) at the start of a
/// rollout.
struct FixedFirstMoveBot {
    first: Option<Move>,
    rng: SmallRng,
}

impl FixedFirstMoveBot {
    fn new(first: Move, seed: u64) -> Self {
        Self {
            first: Some(first),
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Bot for FixedFirstMoveBot {
    fn choose_move(&mut self, perspective: &Perspective<'_>) -> Move {
        if let Some(mv) = self.first.take() {
            return mv;
        }
        let moves = perspective.valid_moves();
        *moves
            .choose(&mut self.rng)
            .expect("a player asked to move always has a valid move")
    }
}
