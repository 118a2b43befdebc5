// ═══════════════════════════════════════════════════════════════════════
// Game Runner — runs a complete headless game with strategies
// ═══════════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use warzone_agents::Strategy;
use warzone_engine::engine;
use warzone_engine::map::builtin;
use warzone_engine::setup::create_initial_state;
use warzone_engine::types::*;
use warzone_engine::Rules;

/// Label stored for games that end without a winner.
pub const DRAW: &str = "Draw";

/// Result of a completed game.
#[derive(Debug, Clone)]
pub struct GameResult {
    pub map: String,
    pub seed: u64,
    /// Winning player's name, `None` for a draw.
    pub winner: Option<String>,
    pub rounds_played: u32,
    pub player_results: Vec<PlayerResult>,
}

#[derive(Debug, Clone)]
pub struct PlayerResult {
    pub player: String,
    pub strategy: StrategyKind,
    pub final_countries: usize,
    pub final_armies: u32,
    pub final_cards: usize,
    pub eliminated: bool,
}

impl GameResult {
    /// Strategy of the winner, or "Draw".
    pub fn winner_label(&self) -> String {
        self.winner_strategy().map_or_else(|| DRAW.to_string(), |k| k.to_string())
    }

    pub fn winner_strategy(&self) -> Option<StrategyKind> {
        let name = self.winner.as_deref()?;
        self.player_results.iter().find(|p| p.player == name).map(|p| p.strategy)
    }
}

/// Run a game that has already left Startup, asking each pending player's
/// strategy until the game ends.
pub fn run_game(
    state: &mut GameState,
    strategies: &mut HashMap<String, Box<dyn Strategy>>,
    max_decisions: usize, // safety limit to prevent infinite loops
) -> Result<GameResult, String> {
    let mut decision_count = 0;

    loop {
        engine::advance(state);

        if state.is_over() {
            return Ok(build_result(state));
        }

        let Some(pending) = state.pending.clone() else {
            return Err(format!("Game stuck: phase={}, round={}", state.phase, state.round));
        };
        let player = pending.player();
        let Some(strategy) = strategies.get_mut(player) else {
            return Err(format!("No strategy for player {}", player));
        };
        let action = strategy.next_order(state);
        engine::apply_action(state, action);

        decision_count += 1;
        if decision_count > max_decisions {
            return Err(format!(
                "Game exceeded {} decisions without finishing (round {})",
                max_decisions, state.round
            ));
        }
    }
}

/// Player names for a lineup: `Aggressive-1`, `Random-2`, ...
pub fn lineup_names(lineup: &[StrategyKind]) -> Vec<(String, StrategyKind)> {
    lineup
        .iter()
        .enumerate()
        .map(|(i, &kind)| (format!("{}-{}", kind, i + 1), kind))
        .collect()
}

/// Set up a builtin map with one computer player per lineup entry and play
/// it to the end.
pub fn play_game(map_name: &str, lineup: &[StrategyKind], rules: &Rules, seed: u64) -> Result<GameResult, String> {
    let map = builtin(map_name).map_err(|e| e.to_string())?;
    let players = lineup_names(lineup);
    let mut state = create_initial_state(map, &players, rules.clone(), seed).map_err(|e| e.to_string())?;

    let mut strategies: HashMap<String, Box<dyn Strategy>> = HashMap::new();
    for (i, (name, kind)) in players.iter().enumerate() {
        let strategy = warzone_agents::build(*kind, name, seed.wrapping_add(i as u64 + 1))?;
        strategies.insert(name.clone(), strategy);
    }

    let max_decisions = (rules.max_rounds as usize + 1) * players.len() * (rules.max_orders_per_round as usize + 1);
    let result = run_game(&mut state, &mut strategies, max_decisions)?;
    tracing::info!(
        target: "warzone::tournament",
        map = map_name,
        seed,
        winner = %result.winner_label(),
        rounds = result.rounds_played,
        "game finished"
    );
    Ok(result)
}

fn build_result(state: &GameState) -> GameResult {
    let player_results = state
        .players
        .iter()
        .filter(|p| !p.is_neutral())
        .map(|p| PlayerResult {
            player: p.name.clone(),
            strategy: p.strategy,
            final_countries: p.countries.len(),
            final_armies: p
                .countries
                .iter()
                .filter_map(|&c| state.map.country(c))
                .map(|c| c.armies)
                .sum(),
            final_cards: p.cards.len(),
            eliminated: p.eliminated,
        })
        .collect();

    GameResult {
        map: state.map.name.clone(),
        seed: state.seed,
        winner: state.winner.clone(),
        rounds_played: state.round,
        player_results,
    }
}
