use std::{fmt, str::FromStr};

use ppr::{GameRecord, Score};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use thiserror::Error;

/// One row of the games CSV, as written by `pgn_to_games` and read by
/// `solve_equilibrium`.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RawGame {
    pub white: String,
    pub black: String,
    #[serde_as(as = "DisplayFromStr")]
    pub result: PgnResult,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub white_elo: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub black_elo: Option<f64>,
}

impl RawGame {
    pub fn record(&self) -> GameRecord<'_> {
        GameRecord {
            white: &self.white,
            black: &self.black,
            white_rating: self.white_elo,
            black_rating: self.black_elo,
            white_score: self.result.white_score(),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PgnResult {
    Unknown,
    WhiteWins,
    BlackWins,
    Draw,
}

#[derive(Debug, Error)]
#[error("invalid game result")]
pub struct InvalidPgnResult;

impl FromStr for PgnResult {
    type Err = InvalidPgnResult;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "1-0" => PgnResult::WhiteWins,
            "0-1" => PgnResult::BlackWins,
            "1/2-1/2" | "½-½" => PgnResult::Draw,
            "*" => PgnResult::Unknown,
            _ => return Err(InvalidPgnResult),
        })
    }
}

impl fmt::Display for PgnResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            PgnResult::WhiteWins => "1-0",
            PgnResult::BlackWins => "0-1",
            PgnResult::Draw => "1/2-1/2",
            PgnResult::Unknown => "*",
        })
    }
}

impl PgnResult {
    pub fn white_score(self) -> Option<Score> {
        Some(match self {
            PgnResult::WhiteWins => Score::WIN,
            PgnResult::BlackWins => Score::LOSS,
            PgnResult::Draw => Score::DRAW,
            PgnResult::Unknown => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result() {
        assert_eq!("1-0".parse::<PgnResult>().unwrap(), PgnResult::WhiteWins);
        assert_eq!("½-½".parse::<PgnResult>().unwrap(), PgnResult::Draw);
        assert_eq!(PgnResult::Draw.white_score(), Some(Score::DRAW));
        assert_eq!(PgnResult::Unknown.white_score(), None);
        assert!("2-0".parse::<PgnResult>().is_err());
    }

    #[test]
    fn test_deserialize() {
        let data = "\
white,black,result,white_elo,black_elo
Alice,Bob,1-0,2000,
\"Carol, C.\",Alice,1/2-1/2,?,2000
";
        let games: Vec<RawGame> = csv::Reader::from_reader(data.as_bytes())
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].white_elo, Some(2000.0));
        assert_eq!(games[0].black_elo, None);
        assert_eq!(games[1].white, "Carol, C.");
        assert_eq!(games[1].white_elo, None);

        let record = games[1].record();
        assert_eq!(record.white_score, Some(Score::DRAW));
        assert_eq!(record.black_rating, Some(2000.0));
    }
}
