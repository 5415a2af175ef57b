use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::moves::Move;
use crate::model::score::Score;
use crate::model::suit::Suit;
use rand::seq::SliceRandom;

use super::rules;
use super::state::{GamePhase, GameState, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Leader,
    Follower,
}

/// The partially observable view one player has of a game at a decision
/// point. Bots act exclusively through this type; it never exposes hidden
/// opponent cards outside phase two.
pub struct Perspective<'a> {
    state: &'a GameState,
    role: Role,
    leader_move: Option<&'a Move>,
}

impl<'a> Perspective<'a> {
    pub fn leader(state: &'a GameState) -> Self {
        Self {
            state,
            role: Role::Leader,
            leader_move: None,
        }
    }

    pub fn follower(state: &'a GameState, leader_move: &'a Move) -> Self {
        Self {
            state,
            role: Role::Follower,
            leader_move: Some(leader_move),
        }
    }

    pub(crate) fn for_player(state: &'a GameState, id: PlayerId) -> Self {
        if state.leader().id() == id {
            Self::leader(state)
        } else {
            Self {
                state,
                role: Role::Follower,
                leader_move: None,
            }
        }
    }

    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }

    /// The opponent's move currently on the table, when following.
    pub fn leader_move(&self) -> Option<&Move> {
        self.leader_move
    }

    pub fn my_id(&self) -> PlayerId {
        self.own().id()
    }

    pub fn hand(&self) -> &Hand {
        self.own().hand()
    }

    pub fn my_score(&self) -> Score {
        self.own().score()
    }

    pub fn opponent_score(&self) -> Score {
        self.opponent().score()
    }

    pub fn trump_suit(&self) -> Suit {
        self.state.trump_suit()
    }

    pub fn trump_card(&self) -> Option<Card> {
        self.state.talon().trump_card()
    }

    pub fn talon_size(&self) -> usize {
        self.state.talon().len()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn won_cards(&self) -> &[Card] {
        self.own().won_cards()
    }

    pub fn opponent_won_cards(&self) -> &[Card] {
        self.opponent().won_cards()
    }

    /// The opponent's full hand, available only in phase two.
    pub fn opponent_hand_in_phase_two(&self) -> Option<&Hand> {
        match self.phase() {
            GamePhase::Two => Some(self.opponent().hand()),
            GamePhase::One => None,
        }
    }

    pub fn valid_moves(&self) -> Vec<Move> {
        match self.role {
            Role::Leader => rules::legal_leader_moves(self.state),
            Role::Follower => match self.leader_move.and_then(Move::played_card) {
                Some(leader_card) => rules::legal_follower_moves(self.state, leader_card),
                None => Vec::new(),
            },
        }
    }

    /// Every card this player has legitimately seen so far: the own hand,
    /// the face-up trump, both won piles, publicly revealed opponent hand
    /// cards, and the leader's move on the table.
    pub fn seen_cards(&self) -> Vec<Card> {
        let mut seen: Vec<Card> = self.hand().cards().to_vec();
        if let Some(trump) = self.trump_card() {
            seen.push(trump);
        }
        seen.extend_from_slice(self.state.leader().won_cards());
        seen.extend_from_slice(self.state.follower().won_cards());
        seen.extend(self.opponent().revealed_cards());
        if let Some(mv) = self.leader_move {
            for card in mv.cards() {
                if !seen.contains(&card) {
                    seen.push(card);
                }
            }
        }
        seen
    }

    /// Determinizes the hidden information: unseen cards are shuffled into
    /// the opponent's hand and the talon. In phase two nothing is hidden and
    /// the true state is returned. The result preserves leader/follower
    /// roles, so it can be rolled forward with `play_at_most_n_tricks`.
    pub fn make_assumption<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> GameState {
        let mut assumed = self.state.clone();
        if self.phase() == GamePhase::Two {
            return assumed;
        }

        let seen = self.seen_cards();
        let mut unseen: Vec<Card> = Deck::standard()
            .cards()
            .iter()
            .copied()
            .filter(|card| !seen.contains(card))
            .collect();
        unseen.shuffle(rng);

        let opponent_id = self.opponent().id();
        let guessed_hand: Vec<Card> = self
            .opponent()
            .hand()
            .cards()
            .iter()
            .map(|card| {
                if seen.contains(card) {
                    *card
                } else {
                    unseen.pop().expect("unseen pool covers the opponent hand")
                }
            })
            .collect();
        assumed
            .player_mut(opponent_id)
            .set_hand(Hand::with_cards(guessed_hand));

        let guessed_talon: Vec<Card> = self
            .state
            .talon()
            .cards()
            .iter()
            .map(|card| {
                if seen.contains(card) {
                    *card
                } else {
                    unseen.pop().expect("unseen pool covers the talon")
                }
            })
            .collect();
        assumed.talon_mut().replace_cards(guessed_talon);

        debug_assert!(unseen.is_empty());
        assumed
    }

    fn own(&self) -> &super::state::PlayerState {
        match self.role {
            Role::Leader => self.state.leader(),
            Role::Follower => self.state.follower(),
        }
    }

    fn opponent(&self) -> &super::state::PlayerState {
        match self.role {
            Role::Leader => self.state.follower(),
            Role::Follower => self.state.leader(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::engine;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashSet;

    #[test]
    fn leader_perspective_hides_opponent_hand_in_phase_one() {
        let state = engine::deal(7);
        let perspective = Perspective::leader(&state);
        assert!(perspective.is_leader());
        assert_eq!(perspective.hand().len(), 5);
        assert!(perspective.opponent_hand_in_phase_two().is_none());
        assert_eq!(perspective.talon_size(), 10);
    }

    #[test]
    fn seen_cards_cover_hand_and_trump() {
        let state = engine::deal(7);
        let perspective = Perspective::leader(&state);
        let seen = perspective.seen_cards();
        assert_eq!(seen.len(), 6);
        for card in perspective.hand().iter() {
            assert!(seen.contains(card));
        }
    }

    #[test]
    fn make_assumption_keeps_own_hand_and_counts() {
        let state = engine::deal(11);
        let perspective = Perspective::leader(&state);
        let mut rng = SmallRng::seed_from_u64(3);
        let assumed = perspective.make_assumption(&mut rng);

        assert_eq!(assumed.leader().hand().cards(), state.leader().hand().cards());
        assert_eq!(assumed.follower().hand().len(), 5);
        assert_eq!(assumed.talon().len(), 10);
        assert_eq!(assumed.talon().trump_card(), state.talon().trump_card());

        // The determinized state is a permutation of the full deck.
        let mut all: Vec<_> = assumed.leader().hand().cards().to_vec();
        all.extend_from_slice(assumed.follower().hand().cards());
        all.extend_from_slice(assumed.talon().cards());
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn make_assumption_preserves_table_card_in_leader_hand() {
        let state = engine::deal(11);
        let leader_card = state.leader().hand().cards()[0];
        let leader_move = Move::Regular(leader_card);
        let perspective = Perspective::follower(&state, &leader_move);
        let mut rng = SmallRng::seed_from_u64(3);
        let assumed = perspective.make_assumption(&mut rng);
        assert!(assumed.leader().hand().contains(leader_card));
    }
}
