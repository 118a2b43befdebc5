// ═══════════════════════════════════════════════════════════════════════
// Tournament — every map × game pairing for one strategy lineup, played
// in parallel. Each game owns its state; nothing is shared across threads.
// ═══════════════════════════════════════════════════════════════════════

use crate::runner::{play_game, GameResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use warzone_engine::map::BUILTIN_MAPS;
use warzone_engine::types::StrategyKind;
use warzone_engine::Rules;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub maps: Vec<String>,
    pub strategies: Vec<StrategyKind>,
    pub games_per_map: u32,
    pub max_rounds: u32,
    pub base_seed: u64,
}

impl TournamentConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.maps.len()) {
            return Err(format!("a tournament takes 1 to 5 maps, got {}", self.maps.len()));
        }
        if let Some(bad) = self.maps.iter().find(|m| !BUILTIN_MAPS.contains(&m.as_str())) {
            return Err(format!("unknown map '{}' (available: {})", bad, BUILTIN_MAPS.join(", ")));
        }
        if !(2..=4).contains(&self.strategies.len()) {
            return Err(format!("a tournament takes 2 to 4 strategies, got {}", self.strategies.len()));
        }
        if let Some(bad) = self.strategies.iter().find(|k| !StrategyKind::COMPUTER.contains(*k)) {
            return Err(format!("{} cannot play in a tournament", bad));
        }
        if !(1..=5).contains(&self.games_per_map) {
            return Err(format!("games per map must be 1 to 5, got {}", self.games_per_map));
        }
        if !(10..=50).contains(&self.max_rounds) {
            return Err(format!("max rounds must be 10 to 50, got {}", self.max_rounds));
        }
        Ok(())
    }

    /// Load a lineup from JSON, e.g. `{"maps": ["tiny"], "strategies":
    /// ["Aggressive", "Cheater"], "games_per_map": 2, "max_rounds": 30,
    /// "base_seed": 1}`.
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let config: TournamentConfig = serde_json::from_str(json).map_err(|e| format!("bad tournament config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn seed_for(&self, map_index: usize, game: u32) -> u64 {
        self.base_seed
            .wrapping_add(map_index as u64 * 10_007)
            .wrapping_add(game as u64 * 1_000)
    }
}

/// Outcome of one map × game cell. Errors are kept so one broken game
/// doesn't sink the whole tournament.
#[derive(Debug, Clone)]
pub struct Cell {
    pub map: String,
    pub game: u32,
    pub outcome: Result<GameResult, String>,
}

#[derive(Debug, Clone)]
pub struct TournamentReport {
    pub config: TournamentConfig,
    pub cells: Vec<Cell>,
}

pub fn run_tournament(config: &TournamentConfig) -> Result<TournamentReport, String> {
    config.validate()?;
    let rules = Rules { max_rounds: config.max_rounds, ..Rules::default() };

    let jobs: Vec<(usize, &String, u32)> = config
        .maps
        .iter()
        .enumerate()
        .flat_map(|(i, map)| (0..config.games_per_map).map(move |g| (i, map, g)))
        .collect();

    tracing::info!(target: "warzone::tournament", games = jobs.len(), "tournament started");

    // Results come back in job order regardless of scheduling.
    let cells: Vec<Cell> = jobs
        .into_par_iter()
        .map(|(i, map, game)| Cell {
            map: map.clone(),
            game,
            outcome: play_game(map, &config.strategies, &rules, config.seed_for(i, game)),
        })
        .collect();

    for cell in &cells {
        if let Err(e) = &cell.outcome {
            tracing::warn!(target: "warzone::tournament", map = %cell.map, game = cell.game + 1, error = %e, "game failed");
        }
    }

    Ok(TournamentReport { config: config.clone(), cells })
}

impl TournamentReport {
    pub fn results(&self) -> impl Iterator<Item = &GameResult> {
        self.cells.iter().filter_map(|c| c.outcome.as_ref().ok())
    }

    pub fn errors(&self) -> usize {
        self.cells.iter().filter(|c| c.outcome.is_err()).count()
    }

    /// Win counts per strategy, plus draws, in lineup order.
    pub fn tally(&self) -> Vec<(String, u32)> {
        let mut rows: Vec<(String, u32)> = Vec::new();
        for kind in &self.config.strategies {
            if !rows.iter().any(|(name, _)| *name == kind.to_string()) {
                rows.push((kind.to_string(), 0));
            }
        }
        rows.push((crate::runner::DRAW.to_string(), 0));
        for result in self.results() {
            let label = result.winner_label();
            if let Some(row) = rows.iter_mut().find(|(name, _)| *name == label) {
                row.1 += 1;
            }
        }
        rows
    }

    /// Map × game grid of winners.
    pub fn table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "M: {}\nP: {}\nG: {}\nD: {}\n\n",
            self.config.maps.join(", "),
            self.config.strategies.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(", "),
            self.config.games_per_map,
            self.config.max_rounds
        ));
        out.push_str(&format!("{:<10}", ""));
        for g in 0..self.config.games_per_map {
            out.push_str(&format!("{:<12}", format!("Game {}", g + 1)));
        }
        out.push('\n');
        for map in &self.config.maps {
            out.push_str(&format!("{:<10}", map));
            for cell in self.cells.iter().filter(|c| &c.map == map) {
                let label = match &cell.outcome {
                    Ok(r) => r.winner_label(),
                    Err(_) => "Error".to_string(),
                };
                out.push_str(&format!("{:<12}", label));
            }
            out.push('\n');
        }
        out
    }
}
