pub mod game;
pub mod pgn;
