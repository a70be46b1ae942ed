use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no valid ratings found to compute the tournament average rating")]
    NoValidRatings,
    #[error("no player has played a game")]
    EmptyField,
}
