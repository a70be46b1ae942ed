use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Number representing playing strength on the Elo scale, such that the
/// difference between two ratings predicts an expected score. Higher is
/// better.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct RatingScalar(pub f64);

impl From<RatingScalar> for f64 {
    #[inline]
    fn from(RatingScalar(rating): RatingScalar) -> f64 {
        rating
    }
}

impl From<f64> for RatingScalar {
    #[inline]
    fn from(rating: f64) -> RatingScalar {
        RatingScalar(rating)
    }
}

impl RatingScalar {
    #[must_use]
    #[inline]
    pub fn clamp(self, min: RatingScalar, max: RatingScalar) -> RatingScalar {
        RatingScalar(f64::max(min.0, f64::min(max.0, self.0)))
    }

    #[must_use]
    #[inline]
    pub fn max(self, other: RatingScalar) -> RatingScalar {
        RatingScalar(f64::max(self.0, other.0))
    }

    /// Rounds to one decimal place, ties to even.
    #[must_use]
    #[inline]
    pub fn round_to_tenth(self) -> RatingScalar {
        RatingScalar((self.0 * 10.0).round_ties_even() / 10.0)
    }

    /// Nearest integer, ties to even. Used both for the convergence test and
    /// for reporting.
    #[inline]
    pub fn rounded(self) -> i64 {
        self.0.round_ties_even() as i64
    }

    /// Arithmetic mean, or `None` for an empty sequence.
    pub fn mean<I>(ratings: I) -> Option<RatingScalar>
    where
        I: IntoIterator<Item = RatingScalar>,
    {
        let (sum, n) = ratings
            .into_iter()
            .fold((0.0, 0usize), |(sum, n), RatingScalar(r)| (sum + r, n + 1));
        (n > 0).then(|| RatingScalar(sum / n as f64))
    }
}

impl Sub<RatingScalar> for RatingScalar {
    type Output = RatingDifference;

    #[inline]
    fn sub(self, rhs: RatingScalar) -> RatingDifference {
        RatingDifference(self.0 - rhs.0)
    }
}

impl Add<RatingDifference> for RatingScalar {
    type Output = RatingScalar;

    #[inline]
    fn add(self, RatingDifference(difference): RatingDifference) -> RatingScalar {
        RatingScalar(self.0 + difference)
    }
}

impl AddAssign<RatingDifference> for RatingScalar {
    #[inline]
    fn add_assign(&mut self, RatingDifference(difference): RatingDifference) {
        self.0 += difference;
    }
}

impl Sub<RatingDifference> for RatingScalar {
    type Output = RatingScalar;

    #[inline]
    fn sub(self, RatingDifference(difference): RatingDifference) -> RatingScalar {
        RatingScalar(self.0 - difference)
    }
}

/// A difference between two ratings.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
pub struct RatingDifference(pub f64);

impl From<RatingDifference> for f64 {
    #[inline]
    fn from(RatingDifference(difference): RatingDifference) -> f64 {
        difference
    }
}

impl From<f64> for RatingDifference {
    #[inline]
    fn from(difference: f64) -> RatingDifference {
        RatingDifference(difference)
    }
}

impl Mul<RatingDifference> for f64 {
    type Output = RatingDifference;

    #[inline]
    fn mul(self, RatingDifference(difference): RatingDifference) -> RatingDifference {
        RatingDifference(self * difference)
    }
}

impl Neg for RatingDifference {
    type Output = RatingDifference;

    #[inline]
    fn neg(self) -> RatingDifference {
        RatingDifference(-self.0)
    }
}
