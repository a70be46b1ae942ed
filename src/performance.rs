//! Performance ratings: the rating a player would need for their expected
//! score against a set of opponents to match the score they actually made.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{
    bounds::RatingBounds,
    rating::{RatingDifference, RatingScalar},
    root::{self, Tolerance},
    Score,
};

/// Rating difference at which the stronger side is expected to score ten
/// times as much as the weaker side.
const LOGISTIC_SCALE: f64 = 400.0;

/// Bracket searched for a standard performance rating.
const TPR_BRACKET: (f64, f64) = (0.0, 4000.0);

/// Expected total score of a player rated `own` against `opponents`.
///
/// Strictly decreasing in `own` and in each opponent rating. Returns `None`
/// if there are no opponents.
pub fn expected_score(opponents: &[RatingScalar], own: RatingScalar) -> Option<Score> {
    if opponents.is_empty() {
        return None;
    }
    Some(Score(
        opponents
            .iter()
            .map(|&opponent| {
                let RatingDifference(diff) = opponent - own;
                1.0 / (1.0 + 10f64.powf(diff / LOGISTIC_SCALE))
            })
            .sum(),
    ))
}

/// Standard tournament performance rating (TPR): the rating `r` for which
/// `expected_score(opponents, r)` equals `score`.
///
/// Shutouts and perfect scores have no finite solution and are delegated to
/// [`complete_performance_rating()`]. Otherwise the root is searched in
/// `[0, 4000]`, rounded to one decimal place and clamped into `bounds`.
/// Returns `None` if there are no opponents or no root could be found.
pub fn tournament_performance_rating(
    opponents: &[RatingScalar],
    score: Score,
    bounds: &RatingBounds,
) -> Option<RatingScalar> {
    if is_boundary_score(opponents, score) {
        return complete_performance_rating(opponents, score, bounds);
    }
    unclamped_tournament_performance_rating(opponents, score)
        .ok()
        .map(|tpr| bounds.clamp(tpr.round_to_tenth()))
}

/// Root of the expected score equation, neither rounded nor clamped.
pub(crate) fn unclamped_tournament_performance_rating(
    opponents: &[RatingScalar],
    Score(score): Score,
) -> Result<RatingScalar, root::RootError> {
    if opponents.is_empty() {
        return Err(root::RootError::NoSignChange);
    }
    let (lo, hi) = TPR_BRACKET;
    root::brent(
        |r| {
            expected_score(opponents, RatingScalar(r))
                .map_or(f64::NAN, |Score(expected)| expected - score)
        },
        lo,
        hi,
        Tolerance::default(),
    )
    .map(RatingScalar)
}

/// Complete performance rating (CPR), a closed form that stays finite for
/// shutouts and perfect scores:
///
/// `avg − (k + 1) / k · 400 · log10((k + 0.5 − m) / (m + 0.5))`
///
/// clamped into `bounds`. Returns `None` if there are no opponents.
pub fn complete_performance_rating(
    opponents: &[RatingScalar],
    score: Score,
    bounds: &RatingBounds,
) -> Option<RatingScalar> {
    raw_complete_performance_rating(opponents, score).map(|cpr| bounds.clamp(cpr))
}

pub(crate) fn raw_complete_performance_rating(
    opponents: &[RatingScalar],
    Score(m): Score,
) -> Option<RatingScalar> {
    let average = RatingScalar::mean(opponents.iter().copied())?;
    let k = opponents.len() as f64;
    let log_odds = ((k + 0.5 - m) / (m + 0.5)).log10();
    Some(average - RatingDifference((k + 1.0) / k * LOGISTIC_SCALE * log_odds))
}

/// Linear performance rating (LPR): `avg + 800 · m / k − 400`, floored at
/// zero. Returns `None` if there are no opponents.
pub fn linear_performance_rating(
    opponents: &[RatingScalar],
    Score(m): Score,
) -> Option<RatingScalar> {
    let average = RatingScalar::mean(opponents.iter().copied())?;
    let k = opponents.len() as f64;
    let lpr = average + RatingDifference(2.0 * LOGISTIC_SCALE * (m / k) - LOGISTIC_SCALE);
    Some(lpr.max(RatingScalar(0.0)))
}

fn is_boundary_score(opponents: &[RatingScalar], Score(m): Score) -> bool {
    !opponents.is_empty() && (m == 0.0 || m == opponents.len() as f64)
}

/// Rating function applied to every player in a tournament.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PerformanceRatingType {
    /// [`tournament_performance_rating()`], falling back to
    /// [`complete_performance_rating()`] for boundary scores.
    #[default]
    Standard,
    /// [`linear_performance_rating()`].
    Linear,
}

impl PerformanceRatingType {
    pub fn performance_rating(
        self,
        opponents: &[RatingScalar],
        score: Score,
        bounds: &RatingBounds,
    ) -> Option<RatingScalar> {
        match self {
            PerformanceRatingType::Standard => {
                tournament_performance_rating(opponents, score, bounds)
            }
            PerformanceRatingType::Linear => linear_performance_rating(opponents, score),
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid performance rating type (expected standard or linear)")]
pub struct InvalidPerformanceRatingType;

impl FromStr for PerformanceRatingType {
    type Err = InvalidPerformanceRatingType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "standard" => PerformanceRatingType::Standard,
            "linear" => PerformanceRatingType::Linear,
            _ => return Err(InvalidPerformanceRatingType),
        })
    }
}

impl fmt::Display for PerformanceRatingType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            PerformanceRatingType::Standard => "standard",
            PerformanceRatingType::Linear => "linear",
        })
    }
}
