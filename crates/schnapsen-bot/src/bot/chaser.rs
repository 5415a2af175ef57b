use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use schnapsen_core::game::bot::Bot;
use schnapsen_core::game::perspective::Perspective;
use schnapsen_core::model::moves::Move;
use schnapsen_core::model::suit::Suit;

/// Suit-chasing heuristic: when trailing on points it hunts marriages and
/// trump exchanges; otherwise it keeps leading the suit of its own previous
/// move with the cheapest matching card, and plays a random regular move
/// when neither applies.
pub struct ChaserBot {
    rng: SmallRng,
    last_suit: Option<Suit>,
}

impl ChaserBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            last_suit: None,
        }
    }
}

impl Bot for ChaserBot {
    fn choose_move(&mut self, perspective: &Perspective<'_>) -> Move {
        let valid = perspective.valid_moves();
        let mut choices: Vec<Move> = Vec::new();

        let my_points = perspective.my_score().direct_points;
        let opponent_points = perspective.opponent_score().direct_points;

        if my_points < opponent_points {
            choices = valid
                .iter()
                .copied()
                .filter(|mv| mv.is_marriage() || mv.is_trump_exchange())
                .collect();
        } else if let Some(chased) = self.last_suit {
            let mut cheapest: Option<(u32, Move)> = None;
            for mv in valid.iter().copied().filter(|mv| mv.suit() == chased) {
                let points = match mv {
                    Move::TrumpExchange(_) => 0,
                    Move::Marriage { queen, .. } => queen.points(),
                    Move::Regular(card) => card.points(),
                };
                if cheapest.map_or(true, |(cp, _)| points <= cp) {
                    cheapest = Some((points, mv));
                }
            }
            if let Some((_, mv)) = cheapest {
                choices.push(mv);
            }
        }

        if choices.is_empty() {
            choices = valid.iter().copied().filter(Move::is_regular).collect();
        }

        let chosen = match choices.choose(&mut self.rng) {
            Some(mv) => *mv,
            None => valid[0],
        };
        self.last_suit = Some(chosen.suit());
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schnapsen_core::game::state::GameState;
    use schnapsen_core::model::card::Card;
    use schnapsen_core::model::rank::Rank;
    use schnapsen_core::model::score::Score;

    #[test]
    fn hunts_marriage_when_trailing() {
        let mut state = GameState::from_hands(
            vec![
                Card::new(Rank::Queen, Suit::Hearts),
                Card::new(Rank::King, Suit::Hearts),
                Card::new(Rank::Jack, Suit::Spades),
            ],
            vec![Card::new(Rank::Ace, Suit::Diamonds)],
            vec![
                Card::new(Rank::Ten, Suit::Diamonds),
                Card::new(Rank::Ace, Suit::Clubs),
            ],
        )
        .expect("state");
        state.set_scores(Score::new(10, 0), Score::new(30, 0));

        let perspective = Perspective::leader(&state);
        let mv = ChaserBot::new(4).choose_move(&perspective);
        assert!(mv.is_marriage());
    }

    #[test]
    fn chases_its_previous_suit_with_the_cheapest_card() {
        let mut bot = ChaserBot::new(4);

        let first = GameState::from_hands(
            vec![Card::new(Rank::Ten, Suit::Hearts)],
            vec![Card::new(Rank::Ace, Suit::Diamonds)],
            vec![
                Card::new(Rank::Ten, Suit::Diamonds),
                Card::new(Rank::Ace, Suit::Clubs),
            ],
        )
        .expect("state");
        let perspective = Perspective::leader(&first);
        assert_eq!(
            bot.choose_move(&perspective),
            Move::Regular(Card::new(Rank::Ten, Suit::Hearts))
        );

        let second = GameState::from_hands(
            vec![
                Card::new(Rank::Ace, Suit::Hearts),
                Card::new(Rank::Jack, Suit::Hearts),
                Card::new(Rank::King, Suit::Clubs),
            ],
            vec![Card::new(Rank::Ace, Suit::Diamonds)],
            vec![
                Card::new(Rank::Ten, Suit::Diamonds),
                Card::new(Rank::Ace, Suit::Clubs),
            ],
        )
        .expect("state");
        let perspective = Perspective::leader(&second);
        assert_eq!(
            bot.choose_move(&perspective),
            Move::Regular(Card::new(Rank::Jack, Suit::Hearts))
        );
    }

    #[test]
    fn falls_back_to_a_regular_move() {
        let state = GameState::from_hands(
            vec![
                Card::new(Rank::Ace, Suit::Spades),
                Card::new(Rank::Ten, Suit::Clubs),
            ],
            vec![Card::new(Rank::Ace, Suit::Diamonds)],
            vec![
                Card::new(Rank::Ten, Suit::Diamonds),
                Card::new(Rank::Ace, Suit::Clubs),
            ],
        )
        .expect("state");
        let perspective = Perspective::leader(&state);
        let mv = ChaserBot::new(4).choose_move(&perspective);
        assert!(mv.is_regular());
    }
}
