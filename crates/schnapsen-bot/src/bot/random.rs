use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use schnapsen_core::game::bot::Bot;
use schnapsen_core::game::perspective::Perspective;
use schnapsen_core::model::moves::Move;

/// Plays a uniformly random valid move.
pub struct RandBot {
    rng: SmallRng,
}

impl RandBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Bot for RandBot {
    fn choose_move(&mut self, perspective: &Perspective<'_>) -> Move {
        let moves = perspective.valid_moves();
        *moves
            .choose(&mut self.rng)
            .expect("a player asked to move always has a valid move")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schnapsen_core::game::engine;

    #[test]
    fn same_seed_picks_same_move() {
        let state = engine::deal(5);
        let perspective = Perspective::leader(&state);
        let first = RandBot::new(9).choose_move(&perspective);
        let second = RandBot::new(9).choose_move(&perspective);
        assert_eq!(first, second);
        assert!(perspective.valid_moves().contains(&first));
    }
}
