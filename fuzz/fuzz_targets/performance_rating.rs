#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use ppr::{
    complete_performance_rating, linear_performance_rating, tournament_performance_rating,
    RatingBounds, RatingScalar, Score,
};

#[derive(Arbitrary)]
struct Encounters {
    opponents: Vec<f64>,
    half_points: u16,
    min: f64,
    max: f64,
}

impl Encounters {
    fn into_clamped(self) -> Option<(Vec<RatingScalar>, Score, RatingBounds)> {
        if self.opponents.is_empty()
            || self.opponents.iter().any(|r| r.is_nan())
            || self.min.is_nan()
            || self.max.is_nan()
        {
            return None;
        }
        let opponents: Vec<RatingScalar> = self
            .opponents
            .iter()
            .map(|&r| RatingScalar(r.clamp(0.0, 4000.0)))
            .collect();
        let half_points = usize::from(self.half_points) % (2 * opponents.len() + 1);
        let (min, max) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        let bounds = RatingBounds {
            min: RatingScalar(min.clamp(-10000.0, 10000.0)),
            max: RatingScalar(max.clamp(-10000.0, 10000.0)),
        };
        Some((opponents, Score(half_points as f64 / 2.0), bounds))
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(encounters) = Encounters::arbitrary(&mut u) else {
        return;
    };
    let Some((opponents, score, bounds)) = encounters.into_clamped() else {
        return;
    };

    if let Some(tpr) = tournament_performance_rating(&opponents, score, &bounds) {
        assert!(bounds.contains(tpr));
    }

    let cpr = complete_performance_rating(&opponents, score, &bounds).expect("opponents");
    assert!(bounds.contains(cpr));

    let lpr = linear_performance_rating(&opponents, score).expect("opponents");
    assert!(f64::from(lpr) >= 0.0);
});
