//! Iterative solver for performance rating equilibria.
//!
//! Every pass recomputes each player's performance rating against the
//! ratings their opponents had at the end of the previous pass. Passes read
//! from an immutable snapshot and collect into a fresh buffer, so the result
//! does not depend on the order in which players are visited.

use std::{fmt, str::FromStr};

use rayon::prelude::*;
use thiserror::Error;

use crate::{
    bounds::RatingBounds,
    performance::{tournament_performance_rating, PerformanceRatingType},
    rating::RatingScalar,
    tournament::{Player, PlayerId, Tournament},
    Error, Score,
};

/// Opponent ratings used for the very first pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum InitialRatings {
    /// Every opponent is assumed to be rated at the tournament average.
    #[default]
    AverageRating,
    /// Every opponent starts at their own pre-tournament rating.
    PreTournamentRating,
}

#[derive(Debug, Error)]
#[error("invalid initial ratings (expected average_rating or pre_tournament_rating)")]
pub struct InvalidInitialRatings;

impl FromStr for InitialRatings {
    type Err = InvalidInitialRatings;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "average_rating" => InitialRatings::AverageRating,
            "pre_tournament_rating" | "pre_tournament_ratings" => {
                InitialRatings::PreTournamentRating
            }
            _ => return Err(InvalidInitialRatings),
        })
    }
}

impl fmt::Display for InitialRatings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            InitialRatings::AverageRating => "average_rating",
            InitialRatings::PreTournamentRating => "pre_tournament_rating",
        })
    }
}

#[derive(Debug, Clone)]
pub struct EquilibriumSolverBuilder {
    performance_rating_type: PerformanceRatingType,
    max_iterations: usize,
    initial_ratings: InitialRatings,
}

impl Default for EquilibriumSolverBuilder {
    fn default() -> EquilibriumSolverBuilder {
        EquilibriumSolverBuilder::new()
    }
}

impl EquilibriumSolverBuilder {
    pub fn new() -> EquilibriumSolverBuilder {
        EquilibriumSolverBuilder {
            performance_rating_type: PerformanceRatingType::Standard,
            max_iterations: 1000,
            initial_ratings: InitialRatings::AverageRating,
        }
    }

    pub fn performance_rating_type(
        &mut self,
        performance_rating_type: PerformanceRatingType,
    ) -> &mut Self {
        self.performance_rating_type = performance_rating_type;
        self
    }

    pub fn max_iterations(&mut self, max_iterations: usize) -> &mut Self {
        assert!(max_iterations > 0);
        self.max_iterations = max_iterations;
        self
    }

    pub fn initial_ratings(&mut self, initial_ratings: InitialRatings) -> &mut Self {
        self.initial_ratings = initial_ratings;
        self
    }

    pub fn build(&self) -> EquilibriumSolver {
        EquilibriumSolver {
            performance_rating_type: self.performance_rating_type,
            max_iterations: self.max_iterations,
            initial_ratings: self.initial_ratings,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EquilibriumSolver {
    performance_rating_type: PerformanceRatingType,
    max_iterations: usize,
    initial_ratings: InitialRatings,
}

impl Default for EquilibriumSolver {
    fn default() -> EquilibriumSolver {
        EquilibriumSolver::new()
    }
}

/// How the solver stopped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Termination {
    /// The last pass did not change any rounded rating.
    Converged { iterations: usize },
    /// The iteration cap was hit. Ratings are those of the last pass and are
    /// not necessarily an equilibrium.
    MaxIterationsReached { iterations: usize },
}

impl Termination {
    pub fn is_converged(self) -> bool {
        matches!(self, Termination::Converged { .. })
    }

    pub fn iterations(self) -> usize {
        match self {
            Termination::Converged { iterations }
            | Termination::MaxIterationsReached { iterations } => iterations,
        }
    }
}

/// The last two rating estimates of a player. `None` marks an undefined
/// rating.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Estimate {
    pub previous: Option<RatingScalar>,
    pub current: Option<RatingScalar>,
}

impl Estimate {
    fn push(&mut self, rating: Option<RatingScalar>) {
        self.previous = self.current;
        self.current = rating;
    }

    /// Both estimates agree once rounded to the nearest integer, or both are
    /// undefined.
    pub fn is_settled(&self) -> bool {
        match (self.previous, self.current) {
            (Some(previous), Some(current)) => previous.rounded() == current.rounded(),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Per-player result of the solver.
#[derive(Debug, Clone)]
pub struct Rated {
    pub player: PlayerId,
    /// Performance rating against the opponents' pre-tournament ratings,
    /// computed once before iterating.
    pub tpr: Option<RatingScalar>,
    pub estimate: Estimate,
}

impl Rated {
    /// Final performance rating equilibrium value.
    pub fn ppr(&self) -> Option<RatingScalar> {
        self.estimate.current
    }
}

/// One row of the final report.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing<'a> {
    pub rank: usize,
    pub name: &'a str,
    pub rating: RatingScalar,
    pub points: Score,
    pub tpr: Option<i64>,
    pub ppr: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Equilibrium<'a> {
    tournament: &'a Tournament,
    bounds: RatingBounds,
    termination: Termination,
    rated: Vec<Rated>,
}

impl<'a> Equilibrium<'a> {
    pub fn tournament(&self) -> &'a Tournament {
        self.tournament
    }

    pub fn bounds(&self) -> RatingBounds {
        self.bounds
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Results for every player with at least one game, in player order.
    pub fn rated(&self) -> &[Rated] {
        &self.rated
    }

    pub fn get(&self, player: PlayerId) -> Option<&Rated> {
        self.rated.iter().find(|rated| rated.player == player)
    }

    pub fn ppr(&self, player: PlayerId) -> Option<RatingScalar> {
        self.get(player).and_then(Rated::ppr)
    }

    /// Rounded report rows for every player with at least one game, in
    /// player order. Undefined ratings stay undefined.
    pub fn standings(&self) -> Vec<Standing<'a>> {
        self.rated
            .iter()
            .filter_map(|rated| {
                let player = self.tournament.player(rated.player)?;
                Some(Standing {
                    rank: player.id.rank(),
                    name: &player.name,
                    rating: player.rating,
                    points: player.points,
                    tpr: rated.tpr.map(RatingScalar::rounded),
                    ppr: rated.ppr().map(RatingScalar::rounded),
                })
            })
            .collect()
    }
}

/// Current estimates indexed by player. Players without an estimate map to
/// `None`.
fn collect_snapshot(num_players: usize, rated: &[Rated]) -> Vec<Option<RatingScalar>> {
    let mut snapshot = vec![None; num_players];
    for r in rated {
        snapshot[r.player.0] = r.estimate.current;
    }
    snapshot
}

impl EquilibriumSolver {
    pub fn builder() -> EquilibriumSolverBuilder {
        EquilibriumSolverBuilder::default()
    }

    pub fn new() -> EquilibriumSolver {
        EquilibriumSolver::builder().build()
    }

    pub fn performance_rating_type(&self) -> PerformanceRatingType {
        self.performance_rating_type
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn initial_ratings(&self) -> InitialRatings {
        self.initial_ratings
    }

    /// Iterates until no rounded rating changes between two passes, or until
    /// `max_iterations` passes have been made.
    ///
    /// Players without games are excluded. Fails with [`Error::EmptyField`]
    /// if there are no players with games.
    pub fn solve<'a>(&self, tournament: &'a Tournament) -> Result<Equilibrium<'a>, Error> {
        let bounds = RatingBounds::estimate(tournament.players())?;
        let participants: Vec<&Player> = tournament
            .players()
            .iter()
            .filter(|player| player.has_games())
            .collect();

        let pre_tournament: Vec<Option<RatingScalar>> = tournament
            .players()
            .iter()
            .map(|player| Some(player.rating))
            .collect();

        let mut rated: Vec<Rated> = participants
            .par_iter()
            .map(|player| Rated {
                player: player.id,
                tpr: tournament_performance_rating(
                    &opponent_ratings(tournament, &pre_tournament, player),
                    player.points,
                    &bounds,
                ),
                estimate: Estimate::default(),
            })
            .collect();

        let mut snapshot = match self.initial_ratings {
            InitialRatings::PreTournamentRating => pre_tournament,
            InitialRatings::AverageRating => {
                vec![Some(tournament.average_rating()); tournament.players().len()]
            }
        };

        let mut iteration = 1;
        let termination = loop {
            let ratings = self.pass(tournament, &participants, &snapshot, &bounds);

            let mut unsettled = 0;
            for (r, rating) in rated.iter_mut().zip(ratings) {
                r.estimate.push(rating);
                if iteration < 3 || !r.estimate.is_settled() {
                    unsettled += 1;
                }
            }
            log::debug!("pass {iteration}: {unsettled} unsettled players");

            if unsettled == 0 {
                log::info!("converged after {iteration} iterations");
                break Termination::Converged {
                    iterations: iteration,
                };
            }
            if iteration >= self.max_iterations {
                log::warn!("maximum iterations reached ({iteration})");
                break Termination::MaxIterationsReached {
                    iterations: iteration,
                };
            }

            iteration += 1;
            snapshot = collect_snapshot(tournament.players().len(), &rated);
        };

        Ok(Equilibrium {
            tournament,
            bounds,
            termination,
            rated,
        })
    }

    /// Runs one more pass against the final ratings of `equilibrium`,
    /// returning the new rating of every rated player in the same order as
    /// [`Equilibrium::rated()`]. At a fixed point the rounded ratings are
    /// reproduced.
    pub fn next_pass(&self, equilibrium: &Equilibrium<'_>) -> Vec<Option<RatingScalar>> {
        let tournament = equilibrium.tournament;
        let participants: Vec<&Player> = equilibrium
            .rated
            .iter()
            .filter_map(|rated| tournament.player(rated.player))
            .collect();
        self.pass(
            tournament,
            &participants,
            &collect_snapshot(tournament.players().len(), &equilibrium.rated),
            &equilibrium.bounds,
        )
    }

    fn pass(
        &self,
        tournament: &Tournament,
        participants: &[&Player],
        snapshot: &[Option<RatingScalar>],
        bounds: &RatingBounds,
    ) -> Vec<Option<RatingScalar>> {
        participants
            .par_iter()
            .map(|player| {
                self.performance_rating_type.performance_rating(
                    &opponent_ratings(tournament, snapshot, player),
                    player.points,
                    bounds,
                )
            })
            .collect()
    }
}

/// Ratings of the opponents of `player` according to `snapshot`. Undefined
/// entries fall back to the opponent's pre-tournament rating, and to the
/// tournament average for opponents that are not known at all.
fn opponent_ratings(
    tournament: &Tournament,
    snapshot: &[Option<RatingScalar>],
    player: &Player,
) -> Vec<RatingScalar> {
    player
        .opponents()
        .map(|opponent| {
            snapshot
                .get(opponent.0)
                .copied()
                .flatten()
                .or_else(|| tournament.player(opponent).map(|p| p.rating))
                .unwrap_or_else(|| tournament.average_rating())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::GameRecord;

    fn tournament(games: &[(&str, f64, &str, f64, Score)]) -> Tournament {
        let mut builder = Tournament::builder();
        for &(white, white_rating, black, black_rating, white_score) in games {
            builder.record(GameRecord {
                white,
                black,
                white_rating: Some(white_rating),
                black_rating: Some(black_rating),
                white_score: Some(white_score),
            });
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_estimate_settled() {
        let mut estimate = Estimate::default();
        assert!(estimate.is_settled());
        estimate.push(Some(RatingScalar(1500.4)));
        assert!(!estimate.is_settled());
        estimate.push(Some(RatingScalar(1499.6)));
        assert!(estimate.is_settled());
        estimate.push(Some(RatingScalar(1498.4)));
        assert!(!estimate.is_settled());
        estimate.push(None);
        assert!(!estimate.is_settled());
        estimate.push(None);
        assert!(estimate.is_settled());
    }

    #[test]
    fn test_first_two_passes_never_converge() {
        let tournament = tournament(&[
            ("a", 1500.0, "b", 1500.0, Score::DRAW),
            ("b", 1500.0, "a", 1500.0, Score::DRAW),
        ]);
        let equilibrium = EquilibriumSolver::new().solve(&tournament).unwrap();
        assert_eq!(
            equilibrium.termination(),
            Termination::Converged { iterations: 3 }
        );
        for rated in equilibrium.rated() {
            assert_eq!(rated.ppr(), Some(RatingScalar(1500.0)));
            assert_eq!(rated.tpr, Some(RatingScalar(1500.0)));
        }
    }

    #[test]
    fn test_iteration_cap() {
        let tournament = tournament(&[
            ("a", 2000.0, "b", 1800.0, Score::WIN),
            ("a", 2000.0, "c", 1900.0, Score::WIN),
            ("b", 1800.0, "c", 1900.0, Score::DRAW),
        ]);
        let equilibrium = EquilibriumSolver::builder()
            .max_iterations(2)
            .build()
            .solve(&tournament)
            .unwrap();
        assert_eq!(
            equilibrium.termination(),
            Termination::MaxIterationsReached { iterations: 2 }
        );
        assert!(equilibrium.rated().iter().all(|rated| rated.ppr().is_some()));
    }

    #[test]
    fn test_players_without_games_are_excluded() {
        let mut builder = Tournament::builder();
        builder.register("spectator", Some(2500.0));
        builder.record(GameRecord {
            white: "a",
            black: "b",
            white_rating: Some(1600.0),
            black_rating: Some(1400.0),
            white_score: Some(Score::DRAW),
        });
        let tournament = builder.build().unwrap();
        let equilibrium = EquilibriumSolver::new().solve(&tournament).unwrap();

        assert!(equilibrium.get(PlayerId(0)).is_none());
        let names: Vec<&str> = equilibrium.standings().iter().map(|s| s.name).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_empty_field() {
        let mut builder = Tournament::builder();
        builder.average_rating_override(Some(1500.0));
        builder.register("alone", None);
        let tournament = builder.build().unwrap();
        assert!(matches!(
            EquilibriumSolver::new().solve(&tournament),
            Err(Error::EmptyField)
        ));
    }

    #[test]
    fn test_linear_two_player_draws() {
        let tournament = tournament(&[
            ("a", 1700.0, "b", 1500.0, Score::DRAW),
            ("b", 1500.0, "a", 1700.0, Score::DRAW),
        ]);
        let equilibrium = EquilibriumSolver::builder()
            .performance_rating_type(PerformanceRatingType::Linear)
            .initial_ratings(InitialRatings::PreTournamentRating)
            .build()
            .solve(&tournament)
            .unwrap();

        // Each pass swaps the two ratings, so the pair never settles.
        assert_eq!(
            equilibrium.termination(),
            Termination::MaxIterationsReached { iterations: 1000 }
        );
        let pprs: Vec<_> = equilibrium.rated().iter().map(Rated::ppr).collect();
        assert_eq!(pprs, [Some(RatingScalar(1700.0)), Some(RatingScalar(1500.0))]);
    }

    #[test]
    fn test_undefined_ratings_propagate() {
        // Even a rating of 4000 expects almost nothing against this field, so
        // no standard performance rating exists for non-boundary scores.
        let tournament = tournament(&[
            ("a", 6000.0, "b", 6000.0, Score::WIN),
            ("c", 6000.0, "a", 6000.0, Score::WIN),
            ("b", 6000.0, "c", 6000.0, Score::DRAW),
        ]);
        let equilibrium = EquilibriumSolver::new().solve(&tournament).unwrap();

        assert_eq!(
            equilibrium.termination(),
            Termination::Converged { iterations: 3 }
        );
        for rated in equilibrium.rated() {
            assert_eq!(rated.estimate, Estimate::default());
        }
        for standing in equilibrium.standings() {
            assert_eq!(standing.tpr, None);
            assert_eq!(standing.ppr, None);
        }
    }

    #[test]
    fn test_undefined_estimate_falls_back_to_pre_tournament_rating() {
        let tournament = tournament(&[
            ("x", 1500.0, "h1", 6000.0, Score::DRAW),
            ("x", 1500.0, "h2", 6000.0, Score::DRAW),
        ]);
        assert_eq!(tournament.average_rating(), RatingScalar(3750.0));

        let solver = EquilibriumSolver::builder()
            .initial_ratings(InitialRatings::PreTournamentRating)
            .max_iterations(1)
            .build();
        let equilibrium = solver.solve(&tournament).unwrap();
        assert_eq!(
            equilibrium.termination(),
            Termination::MaxIterationsReached { iterations: 1 }
        );

        let pprs: Vec<_> = equilibrium.rated().iter().map(Rated::ppr).collect();
        assert_eq!(
            pprs,
            [None, Some(RatingScalar(1500.0)), Some(RatingScalar(1500.0))]
        );
        let standings = equilibrium.standings();
        assert_eq!((standings[0].tpr, standings[0].ppr), (None, None));
        assert_eq!(standings[1].tpr, Some(1500));

        // The opponents of x see its pre-tournament 1500, not the 3750
        // average and not zero.
        assert_eq!(
            solver.next_pass(&equilibrium),
            [
                Some(RatingScalar(1500.0)),
                Some(RatingScalar(1500.0)),
                Some(RatingScalar(1500.0))
            ]
        );
    }

    #[test]
    fn test_parse_initial_ratings() {
        assert_eq!(
            "average_rating".parse::<InitialRatings>().unwrap(),
            InitialRatings::AverageRating
        );
        assert_eq!(
            "pre_tournament_rating".parse::<InitialRatings>().unwrap(),
            InitialRatings::PreTournamentRating
        );
        assert_eq!(
            "pre_tournament_ratings".parse::<InitialRatings>().unwrap(),
            InitialRatings::PreTournamentRating
        );
        assert!("flat".parse::<InitialRatings>().is_err());
    }

    #[test]
    #[should_panic]
    fn test_zero_max_iterations() {
        EquilibriumSolver::builder().max_iterations(0);
    }
}
