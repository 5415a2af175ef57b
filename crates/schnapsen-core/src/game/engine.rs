use core::fmt;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::moves::Move;
use crate::model::score::Score;
use crate::model::talon::Talon;

use super::bot::Bot;
use super::perspective::Perspective;
use super::rules;
use super::state::{GameState, PlayerId, PlayerState};

/// Direct points needed to win outright.
const WINNING_POINTS: u32 = 66;
/// Below this many opponent points the winner scores two game points.
const SCHNEIDER_POINTS: u32 = 33;

/// The result of one finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: PlayerId,
    /// Game points awarded to the winner, 1 to 3.
    pub game_points: u8,
    pub winner_score: Score,
    pub loser_score: Score,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    IllegalLeaderMove { player: PlayerId, attempted: Move },
    IllegalFollowerMove { player: PlayerId, attempted: Move },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::IllegalLeaderMove { player, attempted } => {
                write!(f, "{player} played an illegal move as leader: {attempted}")
            }
            EngineError::IllegalFollowerMove { player, attempted } => {
                write!(f, "{player} played an illegal move as follower: {attempted}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

struct BotPair<'a> {
    one: &'a mut dyn Bot,
    two: &'a mut dyn Bot,
}

impl<'a> BotPair<'a> {
    fn get(&mut self, id: PlayerId) -> &mut dyn Bot {
        match id {
            PlayerId::One => &mut *self.one,
            PlayerId::Two => &mut *self.two,
        }
    }
}

/// Deals a fresh game from the seeded deck shuffle: five cards each in
/// alternation, the remaining ten form the talon with the bottom card fixing
/// trump. `PlayerId::One` leads the first trick.
pub fn deal(seed: u64) -> GameState {
    let mut rng = StdRng::seed_from_u64(seed);
    let deck = Deck::shuffled(&mut rng);
    let cards = deck.cards();

    let hand_one: Vec<_> = cards.iter().copied().step_by(2).take(5).collect();
    let hand_two: Vec<_> = cards.iter().copied().skip(1).step_by(2).take(5).collect();
    let talon = Talon::new(cards[10..].to_vec()).expect("ten cards remain for the talon");

    GameState::new(
        PlayerState::new(PlayerId::One, Hand::with_cards(hand_one)),
        PlayerState::new(PlayerId::Two, Hand::with_cards(hand_two)),
        talon,
    )
}

/// Plays one full game between the two bots. The first bot leads the first
/// trick and is `PlayerId::One` in the outcome. Both bots are notified of
/// the result before this returns.
pub fn play_game(
    first_leader: &mut dyn Bot,
    first_follower: &mut dyn Bot,
    seed: u64,
) -> Result<GameOutcome, EngineError> {
    let mut state = deal(seed);
    let mut bots = BotPair {
        one: first_leader,
        two: first_follower,
    };

    let outcome = loop {
        play_trick(&mut state, &mut bots)?;
        if let Some(outcome) = declare_winner(&state) {
            break outcome;
        }
    };

    for id in PlayerId::LOOP {
        let perspective = Perspective::for_player(&state, id);
        bots.get(id)
            .notify_game_end(id == outcome.winner, &perspective);
    }

    Ok(outcome)
}

/// Rolls a game state forward by at most `n` tricks, used for bounded
/// lookahead. The bots are bound to the state's current leader and follower
/// roles; leadership changes are tracked across tricks. Returns the outcome
/// if the game ends within the horizon. No end-of-game notifications are
/// sent.
pub fn play_at_most_n_tricks(
    state: &mut GameState,
    leader_bot: &mut dyn Bot,
    follower_bot: &mut dyn Bot,
    n: usize,
) -> Result<Option<GameOutcome>, EngineError> {
    let mut bots = if state.leader().id() == PlayerId::One {
        BotPair {
            one: leader_bot,
            two: follower_bot,
        }
    } else {
        BotPair {
            one: follower_bot,
            two: leader_bot,
        }
    };

    for _ in 0..n {
        play_trick(state, &mut bots)?;
        if let Some(outcome) = declare_winner(state) {
            return Ok(Some(outcome));
        }
    }

    Ok(None)
}

fn play_trick(state: &mut GameState, bots: &mut BotPair<'_>) -> Result<(), EngineError> {
    let leader_id = state.leader().id();
    let leader_move = {
        let perspective = Perspective::leader(state);
        bots.get(leader_id).choose_move(&perspective)
    };

    if !rules::is_legal_leader_move(state, &leader_move) {
        return Err(EngineError::IllegalLeaderMove {
            player: leader_id,
            attempted: leader_move,
        });
    }

    if let Move::TrumpExchange(jack) = leader_move {
        state.leader_mut().hand_mut().remove(jack);
        let old_trump = state.talon_mut().exchange(jack);
        let leader = state.leader_mut();
        leader.hand_mut().add(old_trump);
        leader.note_revealed(old_trump);

        let follower_id = state.follower().id();
        bots.get(follower_id).notify_trump_exchange(jack);
        return Ok(());
    }

    if let Move::Marriage { queen, king } = leader_move {
        let pending = if queen.suit == state.trump_suit() {
            40
        } else {
            20
        };
        let leader = state.leader_mut();
        leader.score_mut().add_pending(pending);
        // The queen is led; the king stays in hand but is now public.
        leader.note_revealed(king);
    }

    let Some(leader_card) = leader_move.played_card() else {
        return Err(EngineError::IllegalLeaderMove {
            player: leader_id,
            attempted: leader_move,
        });
    };

    let follower_id = state.follower().id();
    let follower_move = {
        let perspective = Perspective::follower(state, &leader_move);
        bots.get(follower_id).choose_move(&perspective)
    };

    if !rules::legal_follower_moves(state, leader_card).contains(&follower_move) {
        return Err(EngineError::IllegalFollowerMove {
            player: follower_id,
            attempted: follower_move,
        });
    }
    let Move::Regular(follower_card) = follower_move else {
        return Err(EngineError::IllegalFollowerMove {
            player: follower_id,
            attempted: follower_move,
        });
    };

    state.leader_mut().hand_mut().remove(leader_card);
    state.follower_mut().hand_mut().remove(follower_card);

    let leader_wins = rules::resolve_trick(leader_card, follower_card, state.trump_suit());
    let trick_points = leader_card.points() + follower_card.points();

    let winner = if leader_wins {
        state.leader_mut()
    } else {
        state.follower_mut()
    };
    winner.collect_trick(leader_card, follower_card);
    winner.score_mut().add_direct(trick_points);
    winner.score_mut().redeem_pending();

    // Winner draws first; in the last phase-one trick the loser picks up the
    // face-up trump.
    if !state.talon().is_empty() {
        let first = state.talon_mut().draw().expect("talon holds an even count");
        let second = state.talon_mut().draw().expect("talon holds an even count");
        if leader_wins {
            state.leader_mut().hand_mut().add(first);
            state.follower_mut().hand_mut().add(second);
        } else {
            state.follower_mut().hand_mut().add(first);
            state.leader_mut().hand_mut().add(second);
        }
    }

    if !leader_wins {
        state.swap_roles();
    }

    Ok(())
}

/// The winner is always the current leader: either they crossed 66 direct
/// points by winning the last trick, or they took the final trick of a
/// played-out game.
fn declare_winner(state: &GameState) -> Option<GameOutcome> {
    let leader = state.leader();
    let follower = state.follower();

    if leader.score().direct_points >= WINNING_POINTS {
        let follower_points = follower.score().direct_points;
        let game_points = if follower_points == 0 {
            3
        } else if follower_points < SCHNEIDER_POINTS {
            2
        } else {
            1
        };
        return Some(GameOutcome {
            winner: leader.id(),
            game_points,
            winner_score: leader.score(),
            loser_score: follower.score(),
        });
    }

    if state.all_cards_played() {
        return Some(GameOutcome {
            winner: leader.id(),
            game_points: 1,
            winner_score: leader.score(),
            loser_score: follower.score(),
        });
    }

    None
}
