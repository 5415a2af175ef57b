use crate::model::card::Card;
use crate::model::moves::Move;
use crate::model::rank::Rank;
use crate::model::suit::Suit;

use super::state::{GamePhase, GameState};

/// Every move the current leader may legally play: any card from hand, a
/// trump exchange while the talon is open, and any marriage held in hand.
pub fn legal_leader_moves(state: &GameState) -> Vec<Move> {
    let hand = state.leader().hand();
    let mut moves: Vec<Move> = hand.iter().copied().map(Move::Regular).collect();

    if !state.talon().is_empty() {
        let trump_jack = Card::new(Rank::Jack, state.trump_suit());
        if hand.contains(trump_jack) {
            moves.push(Move::TrumpExchange(trump_jack));
        }
    }

    for queen in hand.filter_rank(Rank::Queen) {
        if hand.contains(Card::new(Rank::King, queen.suit)) {
            moves.push(Move::marriage(queen.suit));
        }
    }

    moves
}

pub fn is_legal_leader_move(state: &GameState, mv: &Move) -> bool {
    let hand = state.leader().hand();
    match mv {
        Move::Regular(card) => hand.contains(*card),
        Move::Marriage { queen, king } => {
            queen.rank == Rank::Queen
                && king.rank == Rank::King
                && queen.suit == king.suit
                && hand.contains(*queen)
                && hand.contains(*king)
        }
        Move::TrumpExchange(jack) => {
            !state.talon().is_empty()
                && jack.rank == Rank::Jack
                && jack.suit == state.trump_suit()
                && hand.contains(*jack)
        }
    }
}

/// Every card the follower may legally answer with. In phase one anything
/// goes; in phase two the follower must beat the led suit if possible, else
/// follow low, else trump a non-trump lead, else play anything.
pub fn legal_follower_moves(state: &GameState, leader_card: Card) -> Vec<Move> {
    let hand = state.follower().hand();
    if state.phase() == GamePhase::One {
        return hand.iter().copied().map(Move::Regular).collect();
    }

    let same_suit = hand.filter_suit(leader_card.suit);
    if !same_suit.is_empty() {
        let higher: Vec<Card> = same_suit
            .iter()
            .copied()
            .filter(|card| card.points() > leader_card.points())
            .collect();
        let allowed = if higher.is_empty() { same_suit } else { higher };
        return allowed.into_iter().map(Move::Regular).collect();
    }

    let trumps = hand.filter_suit(state.trump_suit());
    if leader_card.suit != state.trump_suit() && !trumps.is_empty() {
        return trumps.into_iter().map(Move::Regular).collect();
    }

    hand.iter().copied().map(Move::Regular).collect()
}

/// Whether the leader's card beats the follower's. Same suit is decided on
/// card points; off-suit only wins by trumping.
pub fn resolve_trick(leader_card: Card, follower_card: Card, trump: Suit) -> bool {
    if leader_card.suit == follower_card.suit {
        leader_card.points() > follower_card.points()
    } else if leader_card.suit == trump {
        true
    } else if follower_card.suit == trump {
        false
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{PlayerId, PlayerState};
    use crate::model::hand::Hand;
    use crate::model::talon::Talon;

    fn state_with(
        leader_cards: Vec<Card>,
        follower_cards: Vec<Card>,
        talon_cards: Vec<Card>,
    ) -> GameState {
        let leader = PlayerState::new(PlayerId::One, Hand::with_cards(leader_cards));
        let follower = PlayerState::new(PlayerId::Two, Hand::with_cards(follower_cards));
        let talon = Talon::new(talon_cards).expect("talon");
        GameState::new(leader, follower, talon)
    }

    #[test]
    fn leader_moves_include_marriage_and_exchange() {
        let state = state_with(
            vec![
                Card::new(Rank::Queen, Suit::Hearts),
                Card::new(Rank::King, Suit::Hearts),
                Card::new(Rank::Jack, Suit::Spades),
            ],
            vec![Card::new(Rank::Ace, Suit::Clubs)],
            vec![
                Card::new(Rank::Ten, Suit::Spades),
                Card::new(Rank::Ace, Suit::Spades),
            ],
        );
        let moves = legal_leader_moves(&state);
        assert!(moves.iter().any(|m| m.is_marriage()));
        assert!(moves.iter().any(|m| m.is_trump_exchange()));
        assert_eq!(moves.iter().filter(|m| m.is_regular()).count(), 3);
    }

    #[test]
    fn exchange_is_illegal_once_talon_is_empty() {
        let mut state = state_with(
            vec![Card::new(Rank::Jack, Suit::Spades)],
            vec![Card::new(Rank::Ace, Suit::Clubs)],
            vec![Card::new(Rank::Ten, Suit::Spades)],
        );
        state.talon_mut().draw();
        let exchange = Move::TrumpExchange(Card::new(Rank::Jack, Suit::Spades));
        assert!(!is_legal_leader_move(&state, &exchange));
    }

    #[test]
    fn phase_two_follower_must_beat_the_led_suit() {
        let mut state = state_with(
            vec![Card::new(Rank::King, Suit::Clubs)],
            vec![
                Card::new(Rank::Ace, Suit::Clubs),
                Card::new(Rank::Jack, Suit::Clubs),
                Card::new(Rank::Ten, Suit::Spades),
            ],
            vec![Card::new(Rank::Queen, Suit::Spades)],
        );
        state.talon_mut().draw();
        let moves = legal_follower_moves(&state, Card::new(Rank::King, Suit::Clubs));
        assert_eq!(moves, vec![Move::Regular(Card::new(Rank::Ace, Suit::Clubs))]);
    }

    #[test]
    fn phase_two_follower_without_suit_must_trump() {
        let mut state = state_with(
            vec![Card::new(Rank::King, Suit::Clubs)],
            vec![
                Card::new(Rank::Jack, Suit::Spades),
                Card::new(Rank::Ten, Suit::Hearts),
            ],
            vec![Card::new(Rank::Queen, Suit::Spades)],
        );
        state.talon_mut().draw();
        let moves = legal_follower_moves(&state, Card::new(Rank::King, Suit::Clubs));
        assert_eq!(
            moves,
            vec![Move::Regular(Card::new(Rank::Jack, Suit::Spades))]
        );
    }

    #[test]
    fn phase_one_follower_may_play_anything() {
        let state = state_with(
            vec![Card::new(Rank::King, Suit::Clubs)],
            vec![
                Card::new(Rank::Jack, Suit::Spades),
                Card::new(Rank::Ten, Suit::Hearts),
            ],
            vec![Card::new(Rank::Queen, Suit::Spades)],
        );
        let moves = legal_follower_moves(&state, Card::new(Rank::King, Suit::Clubs));
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn trick_resolution_covers_all_cases() {
        let trump = Suit::Spades;
        // Same suit: higher points win.
        assert!(resolve_trick(
            Card::new(Rank::Ace, Suit::Clubs),
            Card::new(Rank::Ten, Suit::Clubs),
            trump
        ));
        assert!(!resolve_trick(
            Card::new(Rank::King, Suit::Clubs),
            Card::new(Rank::Ten, Suit::Clubs),
            trump
        ));
        // Trump beats off-suit in both directions.
        assert!(resolve_trick(
            Card::new(Rank::Jack, Suit::Spades),
            Card::new(Rank::Ace, Suit::Clubs),
            trump
        ));
        assert!(!resolve_trick(
            Card::new(Rank::Ace, Suit::Clubs),
            Card::new(Rank::Jack, Suit::Spades),
            trump
        ));
        // Off-suit, no trump: leader wins.
        assert!(resolve_trick(
            Card::new(Rank::Jack, Suit::Clubs),
            Card::new(Rank::Ace, Suit::Hearts),
            trump
        ));
    }
}
