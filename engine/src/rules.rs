// ═══════════════════════════════════════════════════════════════════════
// Rules — tunable game constants, loadable from JSON.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};
use std::{fs, io, path::{Path, PathBuf}};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Round after which the game ends in a draw.
    pub max_rounds: u32,
    /// Orders (accepted or rejected) a player may issue per round.
    pub max_orders_per_round: u32,
    /// Percent chance-equivalent for each attacking army to kill a defender.
    pub attack_kill_pct: u32,
    /// Percent chance-equivalent for each defending army to kill an attacker.
    pub defend_kill_pct: u32,
    pub min_reinforcements: u32,
    pub countries_per_reinforcement: u32,
    pub starting_armies_per_country: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            max_rounds: 100,
            max_orders_per_round: 12,
            attack_kill_pct: 60,
            defend_kill_pct: 70,
            min_reinforcements: 3,
            countries_per_reinforcement: 3,
            starting_armies_per_country: 0,
        }
    }
}

impl Rules {
    pub fn from_json_str(json: &str) -> Result<Self, RulesError> {
        let rules: Rules = serde_json::from_str(json)?;
        rules.check()?;
        Ok(rules)
    }

    pub fn from_file(path: &Path) -> Result<Self, RulesError> {
        let contents = fs::read_to_string(path).map_err(|source| RulesError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Rules::from_json_str(&contents)
    }

    fn check(&self) -> Result<(), RulesError> {
        if self.countries_per_reinforcement == 0 {
            return Err(RulesError::Invalid("countries_per_reinforcement must be at least 1".into()));
        }
        if self.max_orders_per_round == 0 {
            return Err(RulesError::Invalid("max_orders_per_round must be at least 1".into()));
        }
        if self.attack_kill_pct > 100 || self.defend_kill_pct > 100 {
            return Err(RulesError::Invalid("kill percentages must be within 0..=100".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read rules from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid rules: {0}")]
    Invalid(String),
}
