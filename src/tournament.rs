use rustc_hash::FxHashMap;

use crate::{rating::RatingScalar, Error, Score};

/// Index of a player in first-seen order. The display rank is
/// [`PlayerId::rank()`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PlayerId(pub usize);

impl PlayerId {
    pub fn rank(self) -> usize {
        self.0 + 1
    }
}

#[derive(Default)]
struct PlayerIds {
    inner: FxHashMap<Box<str>, PlayerId>,
}

impl PlayerIds {
    fn get_or_insert(&mut self, name: &str) -> (PlayerId, bool) {
        if let Some(&id) = self.inner.get(name) {
            return (id, false);
        }
        let id = PlayerId(self.inner.len());
        self.inner.insert(name.into(), id);
        (id, true)
    }
}

/// One game from the point of view of one player.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub opponent: PlayerId,
    pub score: Score,
    /// The opponent's rating as recorded for this game, average filled.
    pub opponent_rating: RatingScalar,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Pre-tournament rating, average filled.
    pub rating: RatingScalar,
    /// Sum of all game scores.
    pub points: Score,
    /// Games in the order they were encountered.
    pub games: Vec<Game>,
}

impl Player {
    pub fn has_games(&self) -> bool {
        !self.games.is_empty()
    }

    pub fn opponents(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.games.iter().map(|game| game.opponent)
    }
}

/// A raw game as supplied by an ingestion adapter. Ratings that are missing
/// or not positive are treated as unknown.
#[derive(Debug, Copy, Clone)]
pub struct GameRecord<'a> {
    pub white: &'a str,
    pub black: &'a str,
    pub white_rating: Option<f64>,
    pub black_rating: Option<f64>,
    /// `None` if the game has no decided result.
    pub white_score: Option<Score>,
}

struct PendingGame {
    opponent: PlayerId,
    score: Score,
    opponent_rating: Option<f64>,
}

struct PendingPlayer {
    name: String,
    rating: Option<f64>,
    games: Vec<PendingGame>,
}

fn valid_rating(rating: Option<f64>) -> Option<f64> {
    rating.filter(|r| r.is_finite() && *r > 0.0)
}

/// Collects game records into a [`Tournament`].
#[derive(Default)]
pub struct TournamentBuilder {
    ids: PlayerIds,
    players: Vec<PendingPlayer>,
    rating_sum: f64,
    rating_count: u64,
    average_rating_override: Option<f64>,
}

impl TournamentBuilder {
    pub fn new() -> TournamentBuilder {
        TournamentBuilder::default()
    }

    /// Use a fixed tournament average rating instead of the mean of all
    /// recorded ratings. The override takes precedence even if valid
    /// ratings exist.
    pub fn average_rating_override(&mut self, average_rating: Option<f64>) -> &mut Self {
        assert!(average_rating.map_or(true, |r| !r.is_nan()));
        self.average_rating_override = average_rating;
        self
    }

    /// Registers a player, possibly without any games. The rating is only
    /// taken when the player is first seen; later ratings are ignored.
    pub fn register(&mut self, name: &str, rating: Option<f64>) -> PlayerId {
        let (id, inserted) = self.player_id(name);
        if inserted {
            self.players[id.0].rating = valid_rating(rating);
        }
        id
    }

    /// Records a game. Ratings of every record contribute to the tournament
    /// average, but only games with a decided result create players and
    /// games.
    pub fn record(&mut self, record: GameRecord<'_>) -> &mut Self {
        let white_rating = valid_rating(record.white_rating);
        let black_rating = valid_rating(record.black_rating);
        for rating in [white_rating, black_rating].into_iter().flatten() {
            self.rating_sum += rating;
            self.rating_count += 1;
        }

        let Some(white_score) = record.white_score else {
            return self;
        };

        let white = self.register(record.white, white_rating);
        let black = self.register(record.black, black_rating);

        self.players[white.0].games.push(PendingGame {
            opponent: black,
            score: white_score,
            opponent_rating: black_rating,
        });
        self.players[black.0].games.push(PendingGame {
            opponent: white,
            score: white_score.opposite(),
            opponent_rating: white_rating,
        });
        self
    }

    fn player_id(&mut self, name: &str) -> (PlayerId, bool) {
        let (id, inserted) = self.ids.get_or_insert(name);
        if inserted {
            self.players.push(PendingPlayer {
                name: name.to_owned(),
                rating: None,
                games: Vec::new(),
            });
        }
        (id, inserted)
    }

    /// Resolves the tournament average rating and fills in every missing
    /// rating with it.
    pub fn build(self) -> Result<Tournament, Error> {
        let average_rating = match self.average_rating_override {
            Some(average_rating) => average_rating,
            None if self.rating_count > 0 => self.rating_sum / self.rating_count as f64,
            None => return Err(Error::NoValidRatings),
        };
        log::info!("tournament average rating: {}", average_rating.round());

        let fill = |rating: Option<f64>| RatingScalar(rating.unwrap_or(average_rating));

        let players = self
            .players
            .into_iter()
            .enumerate()
            .map(|(i, pending)| Player {
                id: PlayerId(i),
                name: pending.name,
                rating: fill(pending.rating),
                points: pending.games.iter().map(|game| game.score).sum(),
                games: pending
                    .games
                    .into_iter()
                    .map(|game| Game {
                        opponent: game.opponent,
                        score: game.score,
                        opponent_rating: fill(game.opponent_rating),
                    })
                    .collect(),
            })
            .collect();

        Ok(Tournament {
            players,
            average_rating: RatingScalar(average_rating),
        })
    }
}

/// Immutable structural data of a tournament: players, their games and the
/// tournament average rating.
#[derive(Debug, Clone)]
pub struct Tournament {
    players: Vec<Player>,
    average_rating: RatingScalar,
}

impl Tournament {
    pub fn builder() -> TournamentBuilder {
        TournamentBuilder::new()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, PlayerId(id): PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn average_rating(&self) -> RatingScalar {
        self.average_rating
    }
}
