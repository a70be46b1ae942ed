use crate::{
    performance::raw_complete_performance_rating, rating::RatingScalar, tournament::Player,
    Error, Score,
};

/// Range of ratings achievable in a tournament. Standard and complete
/// performance ratings are clamped into it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RatingBounds {
    pub min: RatingScalar,
    pub max: RatingScalar,
}

impl RatingBounds {
    pub const UNBOUNDED: RatingBounds = RatingBounds {
        min: RatingScalar(f64::NEG_INFINITY),
        max: RatingScalar(f64::INFINITY),
    };

    #[must_use]
    pub fn clamp(&self, rating: RatingScalar) -> RatingScalar {
        rating.clamp(self.min, self.max)
    }

    pub fn contains(&self, rating: RatingScalar) -> bool {
        self.min <= rating && rating <= self.max
    }

    /// Derives the bounds from the structural extremes of a field.
    ///
    /// The number of games `n` played by the highest rated player is used as
    /// the round count. The upper bound is the complete performance rating
    /// of a perfect score against the `n` highest rated players; the lower
    /// bound is that of a shutout against the `n` lowest rated players. If
    /// the field has fewer than `n` players, all of them are used.
    ///
    /// Players without games are ignored. Fails with [`Error::EmptyField`] if
    /// no player has played a game.
    pub fn estimate(players: &[Player]) -> Result<RatingBounds, Error> {
        let mut field: Vec<&Player> = players.iter().filter(|p| p.has_games()).collect();

        let mut highest: Option<&Player> = None;
        for &player in &field {
            if highest.map_or(true, |h| player.rating > h.rating) {
                highest = Some(player);
            }
        }
        let rounds = highest.ok_or(Error::EmptyField)?.games.len().min(field.len());

        field.sort_by(|a, b| f64::from(b.rating).total_cmp(&f64::from(a.rating)));
        let strongest: Vec<RatingScalar> = field[..rounds].iter().map(|p| p.rating).collect();
        let weakest: Vec<RatingScalar> = field[field.len() - rounds..]
            .iter()
            .map(|p| p.rating)
            .collect();

        let max = raw_complete_performance_rating(&strongest, Score(rounds as f64))
            .ok_or(Error::EmptyField)?;
        let min = raw_complete_performance_rating(&weakest, Score::LOSS).ok_or(Error::EmptyField)?;

        log::debug!(
            "rating bounds from {} rounds: [{:.1}, {:.1}]",
            rounds,
            f64::from(min),
            f64::from(max)
        );

        Ok(RatingBounds { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::{Game, PlayerId};

    fn player(id: usize, rating: f64, num_games: usize) -> Player {
        Player {
            id: PlayerId(id),
            name: format!("player{id}"),
            rating: RatingScalar(rating),
            points: Score::default(),
            games: (0..num_games)
                .map(|_| Game {
                    opponent: PlayerId(0),
                    score: Score::LOSS,
                    opponent_rating: RatingScalar(rating),
                })
                .collect(),
        }
    }

    #[test]
    fn test_estimate() {
        let players = [
            player(1, 2000.0, 2),
            player(2, 1800.0, 2),
            player(3, 1900.0, 2),
            player(4, 1500.0, 0),
        ];
        let bounds = RatingBounds::estimate(&players).unwrap();

        // 1950 + 3/2 * 400 * log10(2.5 / 0.5)
        assert!((f64::from(bounds.max) - (1950.0 + 600.0 * 5f64.log10())).abs() < 1e-9);
        // 1850 - 3/2 * 400 * log10(2.5 / 0.5), ignoring the player without games
        assert!((f64::from(bounds.min) - (1850.0 - 600.0 * 5f64.log10())).abs() < 1e-9);
    }

    #[test]
    fn test_more_rounds_than_players() {
        let players = [player(1, 2000.0, 5), player(2, 1800.0, 5)];
        let bounds = RatingBounds::estimate(&players).unwrap();
        assert!(bounds.min.0.is_finite() && bounds.max.0.is_finite());
        assert!(bounds.min < bounds.max);
    }

    #[test]
    fn test_empty_field() {
        assert!(matches!(RatingBounds::estimate(&[]), Err(Error::EmptyField)));
        assert!(matches!(
            RatingBounds::estimate(&[player(1, 1500.0, 0)]),
            Err(Error::EmptyField)
        ));
    }

    #[test]
    fn test_clamp() {
        let bounds = RatingBounds {
            min: RatingScalar(1000.0),
            max: RatingScalar(2000.0),
        };
        assert_eq!(bounds.clamp(RatingScalar(500.0)), RatingScalar(1000.0));
        assert_eq!(bounds.clamp(RatingScalar(2500.0)), RatingScalar(2000.0));
        assert_eq!(bounds.clamp(RatingScalar(1500.0)), RatingScalar(1500.0));
        assert!(bounds.contains(RatingScalar(1000.0)));
        assert!(!bounds.contains(RatingScalar(2000.5)));
    }
}
