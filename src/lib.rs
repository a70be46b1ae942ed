//! Perfect performance ratings (PPR).
//!
//! A performance rating equilibrium assigns every player of a tournament a
//! rating such that, given their actual score against their actual
//! opponents rated at *their* equilibrium ratings, each player's performance
//! rating equals their own rating. A player's value in that equilibrium is
//! their PPR.
//!
//! # Example
//!
//! ```
//! use ppr::{EquilibriumSolver, GameRecord, Score, Tournament};
//!
//! let mut builder = Tournament::builder();
//! for (white, white_rating, black, black_rating, white_score) in [
//!     ("alice", 2000.0, "bob", 1800.0, Score::WIN),
//!     ("alice", 2000.0, "carol", 1900.0, Score::WIN),
//!     ("bob", 1800.0, "carol", 1900.0, Score::DRAW),
//! ] {
//!     builder.record(GameRecord {
//!         white,
//!         black,
//!         white_rating: Some(white_rating),
//!         black_rating: Some(black_rating),
//!         white_score: Some(white_score),
//!     });
//! }
//! let tournament = builder.build()?;
//!
//! let equilibrium = EquilibriumSolver::new().solve(&tournament)?;
//! assert!(equilibrium.termination().is_converged());
//!
//! for standing in equilibrium.standings() {
//!     println!("{} {:?} {:?}", standing.name, standing.tpr, standing.ppr);
//! }
//! # Ok::<_, ppr::Error>(())
//! ```

mod bounds;
mod error;
mod performance;
mod rating;
pub mod root;
mod score;
mod solver;
mod tournament;

pub use bounds::RatingBounds;
pub use error::Error;
pub use performance::{
    complete_performance_rating, expected_score, linear_performance_rating,
    tournament_performance_rating, InvalidPerformanceRatingType, PerformanceRatingType,
};
pub use rating::{RatingDifference, RatingScalar};
pub use score::Score;
pub use solver::{
    Equilibrium, EquilibriumSolver, EquilibriumSolverBuilder, Estimate, InitialRatings,
    InvalidInitialRatings, Rated, Standing, Termination,
};
pub use tournament::{Game, GameRecord, Player, PlayerId, Tournament, TournamentBuilder};
