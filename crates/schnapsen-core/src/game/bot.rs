use crate::model::card::Card;
use crate::model::moves::Move;

use super::perspective::Perspective;

/// The contract every playing agent implements. The engine asks for one move
/// per decision point and only validates it afterwards; an illegal move is a
/// fatal engine error, not the bot's problem to signal.
pub trait Bot {
    fn choose_move(&mut self, perspective: &Perspective<'_>) -> Move;

    /// Called on the non-exchanging player when the opponent swaps the
    /// trump jack for the face-up trump card.
    fn notify_trump_exchange(&mut self, _jack: Card) {}

    /// Called once per game after the winner is declared.
    fn notify_game_end(&mut self, _won: bool, _perspective: &Perspective<'_>) {}
}
