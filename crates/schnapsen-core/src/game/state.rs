use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::score::Score;
use crate::model::suit::Suit;
use crate::model::talon::Talon;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PlayerId {
    One = 0,
    Two = 1,
}

impl PlayerId {
    pub const LOOP: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub const fn other(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayerId::One => "player one",
            PlayerId::Two => "player two",
        };
        f.write_str(label)
    }
}

/// Schnapsen is played in two phases: while the talon holds cards the
/// follower may play anything; once it is empty the strict follow/trump
/// rules apply and hands become public.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    One,
    Two,
}

/// One player's cards and points as tracked by the engine.
#[derive(Debug, Clone)]
pub struct PlayerState {
    id: PlayerId,
    hand: Hand,
    score: Score,
    won_cards: Vec<Card>,
    revealed: Vec<Card>,
}

impl PlayerState {
    pub(crate) fn new(id: PlayerId, hand: Hand) -> Self {
        Self {
            id,
            hand,
            score: Score::default(),
            won_cards: Vec::new(),
            revealed: Vec::new(),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn won_cards(&self) -> &[Card] {
        &self.won_cards
    }

    /// Cards in this player's hand that the opponent has seen: the marriage
    /// king left behind after the queen was led, or the face-up trump taken
    /// in an exchange.
    pub fn revealed_cards(&self) -> Vec<Card> {
        self.revealed
            .iter()
            .copied()
            .filter(|card| self.hand.contains(*card))
            .collect()
    }

    pub(crate) fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub(crate) fn score_mut(&mut self) -> &mut Score {
        &mut self.score
    }

    pub(crate) fn collect_trick(&mut self, leader_card: Card, follower_card: Card) {
        self.won_cards.push(leader_card);
        self.won_cards.push(follower_card);
    }

    pub(crate) fn note_revealed(&mut self, card: Card) {
        self.revealed.push(card);
    }

    pub(crate) fn set_hand(&mut self, hand: Hand) {
        self.hand = hand;
    }
}

/// The full, perfect-information state of one game as seen by the engine.
/// Bots never receive this directly; they act through a `Perspective`.
#[derive(Debug, Clone)]
pub struct GameState {
    leader: PlayerState,
    follower: PlayerState,
    talon: Talon,
}

impl GameState {
    pub(crate) fn new(leader: PlayerState, follower: PlayerState, talon: Talon) -> Self {
        Self {
            leader,
            follower,
            talon,
        }
    }

    /// Builds a game state from explicit hands and talon cards, with
    /// `PlayerId::One` leading. Returns `None` for an empty talon, since the
    /// trump suit is fixed by the bottommost talon card. Intended for tests
    /// and constructed scenarios.
    pub fn from_hands(
        leader_cards: Vec<Card>,
        follower_cards: Vec<Card>,
        talon_cards: Vec<Card>,
    ) -> Option<Self> {
        let talon = Talon::new(talon_cards)?;
        Some(Self::new(
            PlayerState::new(PlayerId::One, Hand::with_cards(leader_cards)),
            PlayerState::new(PlayerId::Two, Hand::with_cards(follower_cards)),
            talon,
        ))
    }

    /// Overrides both players' scores in place, for constructed scenarios.
    pub fn set_scores(&mut self, leader_score: Score, follower_score: Score) {
        self.leader.score = leader_score;
        self.follower.score = follower_score;
    }

    pub fn leader(&self) -> &PlayerState {
        &self.leader
    }

    pub fn follower(&self) -> &PlayerState {
        &self.follower
    }

    pub fn player(&self, id: PlayerId) -> &PlayerState {
        if self.leader.id == id {
            &self.leader
        } else {
            &self.follower
        }
    }

    pub fn talon(&self) -> &Talon {
        &self.talon
    }

    pub fn trump_suit(&self) -> Suit {
        self.talon.trump_suit()
    }

    pub fn phase(&self) -> GamePhase {
        if self.talon.is_empty() {
            GamePhase::Two
        } else {
            GamePhase::One
        }
    }

    pub fn all_cards_played(&self) -> bool {
        self.leader.hand.is_empty() && self.follower.hand.is_empty() && self.talon.is_empty()
    }

    pub(crate) fn leader_mut(&mut self) -> &mut PlayerState {
        &mut self.leader
    }

    pub(crate) fn follower_mut(&mut self) -> &mut PlayerState {
        &mut self.follower
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        if self.leader.id == id {
            &mut self.leader
        } else {
            &mut self.follower
        }
    }

    pub(crate) fn talon_mut(&mut self) -> &mut Talon {
        &mut self.talon
    }

    pub(crate) fn swap_roles(&mut self) {
        std::mem::swap(&mut self.leader, &mut self.follower);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rank::Rank;

    fn sample_state() -> GameState {
        let leader = PlayerState::new(
            PlayerId::One,
            Hand::with_cards(vec![Card::new(Rank::Ace, Suit::Clubs)]),
        );
        let follower = PlayerState::new(
            PlayerId::Two,
            Hand::with_cards(vec![Card::new(Rank::Ten, Suit::Hearts)]),
        );
        let talon = Talon::new(vec![Card::new(Rank::King, Suit::Spades)]).expect("talon");
        GameState::new(leader, follower, talon)
    }

    #[test]
    fn swap_roles_exchanges_leader_and_follower() {
        let mut state = sample_state();
        assert_eq!(state.leader().id(), PlayerId::One);
        state.swap_roles();
        assert_eq!(state.leader().id(), PlayerId::Two);
        assert_eq!(state.follower().id(), PlayerId::One);
    }

    #[test]
    fn phase_follows_talon_emptiness() {
        let mut state = sample_state();
        assert_eq!(state.phase(), GamePhase::One);
        state.talon_mut().draw();
        assert_eq!(state.phase(), GamePhase::Two);
    }

    #[test]
    fn revealed_cards_track_hand_membership() {
        let mut state = sample_state();
        let king = Card::new(Rank::King, Suit::Clubs);
        state.leader_mut().note_revealed(king);
        assert!(state.leader().revealed_cards().is_empty());
        state.leader_mut().hand_mut().add(king);
        assert_eq!(state.leader().revealed_cards(), vec![king]);
    }
}
