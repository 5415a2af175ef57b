use schnapsen_core::game::perspective::Perspective;
use schnapsen_core::game::state::GamePhase;
use schnapsen_core::model::deck::DECK_SIZE;
use schnapsen_core::model::rank::Rank;

/// Length of every decision feature vector. The classifier requires uniform
/// dimensionality, so changing this (or the extraction below) invalidates
/// every previously recorded replay log.
pub const FEATURE_DIM: usize = 16;

const MAX_HAND_SIZE: f64 = 5.0;
const MAX_TALON_SIZE: f64 = 10.0;
// Four aces and a ten is the most valuable hand the deck allows.
const MAX_HAND_POINTS: f64 = 54.0;

/// Derives the feature vector for one decision point. Pure in the
/// perspective: the same view always produces the same vector, which the
/// replay determinism guarantees depend on.
pub fn extract_features(perspective: &Perspective<'_>) -> Vec<f64> {
    let my_score = perspective.my_score();
    let opponent_score = perspective.opponent_score();
    let hand = perspective.hand();
    let trump = perspective.trump_suit();

    let mut features = Vec::with_capacity(FEATURE_DIM);
    features.push(f64::from(my_score.direct_points) / 66.0);
    features.push(f64::from(opponent_score.direct_points) / 66.0);
    features.push(f64::from(my_score.pending_points) / 40.0);
    features.push(f64::from(opponent_score.pending_points) / 40.0);
    features.push(perspective.talon_size() as f64 / MAX_TALON_SIZE);
    features.push(match perspective.phase() {
        GamePhase::One => 0.0,
        GamePhase::Two => 1.0,
    });
    features.push(if perspective.is_leader() { 1.0 } else { 0.0 });
    features.push(hand.len() as f64 / MAX_HAND_SIZE);

    let trump_held = hand.iter().filter(|card| card.suit == trump).count();
    features.push(trump_held as f64 / MAX_HAND_SIZE);

    let hand_points: u32 = hand.iter().map(|card| card.points()).sum();
    features.push(f64::from(hand_points) / MAX_HAND_POINTS);

    for rank in Rank::ORDERED {
        let held = hand.iter().filter(|card| card.rank == rank).count();
        features.push(held as f64 / 4.0);
    }

    features.push(perspective.seen_cards().len() as f64 / DECK_SIZE as f64);

    debug_assert_eq!(features.len(), FEATURE_DIM);
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use schnapsen_core::game::engine;

    #[test]
    fn vector_has_fixed_dimension() {
        let state = engine::deal(1);
        let perspective = Perspective::leader(&state);
        assert_eq!(extract_features(&perspective).len(), FEATURE_DIM);
    }

    #[test]
    fn extraction_is_deterministic() {
        let state = engine::deal(2);
        let perspective = Perspective::leader(&state);
        assert_eq!(extract_features(&perspective), extract_features(&perspective));
    }

    #[test]
    fn components_stay_normalized_at_the_start() {
        let state = engine::deal(3);
        let perspective = Perspective::leader(&state);
        let features = extract_features(&perspective);
        assert!(features.iter().all(|f| (0.0..=1.0).contains(f)));
        // Fresh deal: full talon, phase one, leading, full hand.
        assert_eq!(features[4], 1.0);
        assert_eq!(features[5], 0.0);
        assert_eq!(features[6], 1.0);
        assert_eq!(features[7], 1.0);
    }
}
