//! Minimal PGN header scanner. Only the tags needed for performance ratings
//! are read; movetext is skipped.

use std::io::{self, BufRead};

use crate::game::{PgnResult, RawGame};

const END_TAG: &str = "\"]";

fn strip_prefix_suffix<'a>(s: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    s.strip_prefix(prefix)?.strip_suffix(suffix)
}

fn parse_elo(v: &str) -> Option<f64> {
    v.trim().parse::<i64>().ok().map(|elo| elo as f64)
}

#[derive(Default)]
struct Headers {
    seen: bool,
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
    white_elo: Option<f64>,
    black_elo: Option<f64>,
}

impl Headers {
    fn take(&mut self) -> Option<RawGame> {
        let headers = std::mem::take(self);
        if !headers.seen {
            return None;
        }
        // Games without a recognisable result are kept as unknown so their
        // ratings still count towards the tournament average.
        let result = headers
            .result
            .and_then(|result| result.parse().ok())
            .unwrap_or(PgnResult::Unknown);
        Some(RawGame {
            white: headers.white.unwrap_or_else(|| "Unknown".to_owned()),
            black: headers.black.unwrap_or_else(|| "Unknown".to_owned()),
            result,
            white_elo: headers.white_elo,
            black_elo: headers.black_elo,
        })
    }
}

/// Reads PGN from `reader` and calls `f` with the headers of every game.
pub fn scan_games<R, F, E>(mut reader: R, mut f: F) -> Result<(), E>
where
    R: BufRead,
    F: FnMut(RawGame) -> Result<(), E>,
    E: From<io::Error>,
{
    let mut headers = Headers::default();
    let mut in_movetext = false;

    let mut line = String::new();
    while reader.read_line(&mut line)? != 0 {
        let trimmed = line.trim_end_matches(['\n', '\r']);

        if trimmed.starts_with('[') {
            if in_movetext {
                if let Some(game) = headers.take() {
                    f(game)?;
                }
                in_movetext = false;
            }
            headers.seen = true;
            let tag = trimmed.trim_end();
            if let Some(v) = strip_prefix_suffix(tag, "[White \"", END_TAG) {
                headers.white = Some(v.to_owned());
            } else if let Some(v) = strip_prefix_suffix(tag, "[Black \"", END_TAG) {
                headers.black = Some(v.to_owned());
            } else if let Some(v) = strip_prefix_suffix(tag, "[Result \"", END_TAG) {
                headers.result = Some(v.to_owned());
            } else if let Some(v) = strip_prefix_suffix(tag, "[WhiteElo \"", END_TAG) {
                headers.white_elo = parse_elo(v);
            } else if let Some(v) = strip_prefix_suffix(tag, "[BlackElo \"", END_TAG) {
                headers.black_elo = parse_elo(v);
            }
        } else if !trimmed.trim().is_empty() && headers.seen {
            in_movetext = true;
        }

        line.clear();
    }

    if let Some(game) = headers.take() {
        f(game)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(pgn: &str) -> Vec<RawGame> {
        let mut games = Vec::new();
        scan_games::<_, _, io::Error>(pgn.as_bytes(), |game| {
            games.push(game);
            Ok(())
        })
        .unwrap();
        games
    }

    #[test]
    fn test_scan_games() {
        let games = scan(
            "[Event \"Club\"]\n\
             [White \"Alice\"]\n\
             [Black \"Bob\"]\n\
             [Result \"1-0\"]\n\
             [WhiteElo \"2000\"]\n\
             [BlackElo \"-\"]\n\
             \n\
             1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0\n\
             \n\
             [White \"Bob\"]\n\
             [Black \"Carol\"]\n\
             [Result \"1/2-1/2\"]\n\
             [WhiteElo \"1800\"]\n\
             [BlackElo \"1900\"]\n\
             \n\
             1. d4 d5 1/2-1/2",
        );

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].white, "Alice");
        assert_eq!(games[0].result, PgnResult::WhiteWins);
        assert_eq!(games[0].white_elo, Some(2000.0));
        assert_eq!(games[0].black_elo, None);
        assert_eq!(games[1].black, "Carol");
        assert_eq!(games[1].result, PgnResult::Draw);
        assert_eq!(games[1].black_elo, Some(1900.0));
    }

    #[test]
    fn test_missing_tags() {
        let games = scan("[Result \"*\"]\r\n\r\n*\r\n");
        assert_eq!(
            games,
            [RawGame {
                white: "Unknown".to_owned(),
                black: "Unknown".to_owned(),
                result: PgnResult::Unknown,
                white_elo: None,
                black_elo: None,
            }]
        );
    }

    #[test]
    fn test_headers_without_movetext() {
        let games = scan("[White \"A\"]\n[Black \"B\"]\n[Result \"0-1\"]\n");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].result, PgnResult::BlackWins);
    }
}
