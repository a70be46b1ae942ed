use std::{iter::Sum, ops};

/// A game result or a sum of game results. A single game scores `0.0` for a
/// loss, `0.5` for a draw and `1.0` for a win.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
pub struct Score(pub f64);

impl From<Score> for f64 {
    fn from(Score(score): Score) -> f64 {
        score
    }
}

impl Score {
    pub const LOSS: Score = Score(0.0);
    pub const DRAW: Score = Score(0.5);
    pub const WIN: Score = Score(1.0);

    /// The result of the same game from the other side of the board.
    pub fn opposite(self) -> Score {
        Score(1.0 - self.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl ops::Add<Score> for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score(self.0 + rhs.0)
    }
}

impl ops::AddAssign<Score> for Score {
    fn add_assign(&mut self, rhs: Score) {
        *self = *self + rhs;
    }
}

impl Sum for Score {
    fn sum<I: Iterator<Item = Score>>(iter: I) -> Score {
        iter.fold(Score::default(), |acc, score| acc + score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite() {
        assert_eq!(Score::WIN.opposite(), Score::LOSS);
        assert_eq!(Score::DRAW.opposite(), Score::DRAW);
    }

    #[test]
    fn test_sum() {
        let points: Score = [Score::WIN, Score::DRAW, Score::LOSS].into_iter().sum();
        assert_eq!(points, Score(1.5));
    }
}
