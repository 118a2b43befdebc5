// ═══════════════════════════════════════════════════════════════════════
// Reinforcements and continent control
// ═══════════════════════════════════════════════════════════════════════

use crate::map::ContinentId;
use crate::types::*;
use std::collections::BTreeSet;

/// Continents fully owned by `player`, derived from the map.
pub fn owned_continents(state: &GameState, player: &str) -> BTreeSet<ContinentId> {
    state
        .map
        .continents()
        .iter()
        .filter(|cont| {
            let members = state.map.continent_members(cont.id);
            !members.is_empty()
                && members
                    .iter()
                    .all(|&m| state.map.country(m).is_some_and(|c| c.is_owned_by(player)))
        })
        .map(|cont| cont.id)
        .collect()
}

/// Refresh `player.continents`. Idempotent.
pub fn recompute_continents(state: &mut GameState, player: &str) {
    let owned = owned_continents(state, player);
    if let Some(p) = state.player_mut(player) {
        p.continents = owned;
    }
}

/// `max(min, floor(owned / per)) + sum of owned continent bonuses`.
pub fn reinforcements(state: &GameState, player: &str) -> u32 {
    let Some(p) = state.player(player) else { return 0 };
    let rules = &state.rules;
    let base = (p.countries.len() as u32 / rules.countries_per_reinforcement).max(rules.min_reinforcements);
    let bonus: u32 = owned_continents(state, player)
        .iter()
        .filter_map(|&id| state.map.continent(id))
        .map(|c| c.bonus)
        .sum();
    base + bonus
}
