use core::fmt;

/// Card points collected by one player: points already banked plus points
/// pending from a declared marriage, which only materialize once the player
/// wins another trick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub direct_points: u32,
    pub pending_points: u32,
}

impl Score {
    pub const fn new(direct_points: u32, pending_points: u32) -> Self {
        Self {
            direct_points,
            pending_points,
        }
    }

    pub fn add_direct(&mut self, points: u32) {
        self.direct_points += points;
    }

    pub fn add_pending(&mut self, points: u32) {
        self.pending_points += points;
    }

    pub fn redeem_pending(&mut self) {
        self.direct_points += self.pending_points;
        self.pending_points = 0;
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}p", self.direct_points, self.pending_points)
    }
}

#[cfg(test)]
mod tests {
    use super::Score;

    #[test]
    fn redeem_moves_pending_into_direct() {
        let mut score = Score::new(30, 20);
        score.redeem_pending();
        assert_eq!(score, Score::new(50, 0));
    }

    #[test]
    fn add_accumulates_separately() {
        let mut score = Score::default();
        score.add_direct(13);
        score.add_pending(40);
        assert_eq!(score.direct_points, 13);
        assert_eq!(score.pending_points, 40);
    }
}
