pub mod error;
pub mod log;
pub mod rules;
pub mod types;
pub mod map;
pub mod navigation;
pub mod cards;
pub mod reinforcement;
pub mod orders;
pub mod command;
pub mod setup;
pub mod engine;

mod tests;

pub use error::EngineError;
pub use log::{LogEntry, LogTag};
pub use map::{Continent, ContinentId, Country, CountryId, MapGraph};
pub use orders::{Order, Rejection};
pub use rules::Rules;
pub use types::*;
