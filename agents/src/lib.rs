pub mod agent;
pub mod random;
pub mod aggressive;
pub mod benevolent;
pub mod cheater;
pub mod human;

pub use agent::{build, Strategy};
pub use random::RandomStrategy;
pub use aggressive::AggressiveStrategy;
pub use benevolent::BenevolentStrategy;
pub use cheater::CheaterStrategy;
pub use human::{CommandSource, HumanStrategy, ScriptedSource, StdinSource};
