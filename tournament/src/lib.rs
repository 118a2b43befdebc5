pub mod runner;
pub mod tournament;
pub mod database;

pub use runner::{play_game, run_game, GameResult, PlayerResult, DRAW};
pub use tournament::{run_tournament, TournamentConfig, TournamentReport};
pub use database::Database;
