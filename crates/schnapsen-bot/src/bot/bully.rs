use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use schnapsen_core::game::bot::Bot;
use schnapsen_core::game::perspective::Perspective;
use schnapsen_core::model::moves::Move;

/// Aggressive heuristic: lead trump whenever possible, follow the led suit
/// otherwise, and fall back to the highest-value card.
pub struct BullyBot {
    rng: SmallRng,
}

impl BullyBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Bot for BullyBot {
    fn choose_move(&mut self, perspective: &Perspective<'_>) -> Move {
        let mut moves = perspective.valid_moves();
        moves.shuffle(&mut self.rng);

        let trump = perspective.trump_suit();
        let trump_moves: Vec<Move> = moves
            .iter()
            .copied()
            .filter(|mv| mv.suit() == trump)
            .collect();
        if let Some(mv) = trump_moves.choose(&mut self.rng) {
            return *mv;
        }

        if !perspective.is_leader()
            && let Some(leader_card) = perspective.leader_move().and_then(Move::played_card)
        {
            let same_suit: Vec<Move> = moves
                .iter()
                .copied()
                .filter(|mv| mv.suit() == leader_card.suit)
                .collect();
            if let Some(mv) = same_suit.choose(&mut self.rng) {
                return *mv;
            }
        }

        let mut best: Option<(u32, Move)> = None;
        for mv in moves {
            let points = mv.cards()[0].points();
            if best.map_or(true, |(bp, _)| points > bp) {
                best = Some((points, mv));
            }
        }
        best.expect("a player asked to move always has a valid move").1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schnapsen_core::game::state::GameState;
    use schnapsen_core::model::card::Card;
    use schnapsen_core::model::rank::Rank;
    use schnapsen_core::model::suit::Suit;

    #[test]
    fn leads_trump_when_available() {
        // Bottom talon card is a spade, so spades are trump.
        let state = GameState::from_hands(
            vec![
                Card::new(Rank::Ace, Suit::Hearts),
                Card::new(Rank::Jack, Suit::Spades),
                Card::new(Rank::King, Suit::Clubs),
            ],
            vec![Card::new(Rank::Ten, Suit::Diamonds)],
            vec![
                Card::new(Rank::Queen, Suit::Diamonds),
                Card::new(Rank::Ten, Suit::Spades),
            ],
        )
        .expect("state");
        let perspective = Perspective::leader(&state);
        let mv = BullyBot::new(1).choose_move(&perspective);
        assert_eq!(mv.suit(), Suit::Spades);
    }

    #[test]
    fn follows_the_led_suit_without_trumps() {
        let state = GameState::from_hands(
            vec![Card::new(Rank::Queen, Suit::Hearts)],
            vec![
                Card::new(Rank::Ace, Suit::Hearts),
                Card::new(Rank::King, Suit::Clubs),
            ],
            vec![
                Card::new(Rank::Queen, Suit::Diamonds),
                Card::new(Rank::Ten, Suit::Diamonds),
            ],
        )
        .expect("state");
        let leader_move = Move::Regular(Card::new(Rank::Queen, Suit::Hearts));
        let perspective = Perspective::follower(&state, &leader_move);
        let mv = BullyBot::new(1).choose_move(&perspective);
        assert_eq!(mv, Move::Regular(Card::new(Rank::Ace, Suit::Hearts)));
    }

    #[test]
    fn falls_back_to_highest_points() {
        let state = GameState::from_hands(
            vec![
                Card::new(Rank::Jack, Suit::Hearts),
                Card::new(Rank::Ten, Suit::Clubs),
            ],
            vec![Card::new(Rank::Queen, Suit::Hearts)],
            vec![
                Card::new(Rank::Queen, Suit::Diamonds),
                Card::new(Rank::Ace, Suit::Diamonds),
            ],
        )
        .expect("state");
        let perspective = Perspective::leader(&state);
        let mv = BullyBot::new(1).choose_move(&perspective);
        assert_eq!(mv, Move::Regular(Card::new(Rank::Ten, Suit::Clubs)));
    }
}
