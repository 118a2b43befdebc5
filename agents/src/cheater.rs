// ═══════════════════════════════════════════════════════════════════════
// Cheater Strategy — skips the order queue entirely.
//
// Answers every request with `Action::Cheat`; the engine then takes every
// enemy country bordering the cheater and doubles its border armies. The
// engine marks the player done afterwards, so this runs once per round.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Strategy;
use warzone_engine::engine::Action;
use warzone_engine::types::*;

pub struct CheaterStrategy {
    player: String,
}

impl CheaterStrategy {
    pub fn new(player: &str) -> Self {
        CheaterStrategy { player: player.to_string() }
    }
}

impl Strategy for CheaterStrategy {
    fn name(&self) -> &str {
        "Cheater"
    }

    fn player(&self) -> &str {
        &self.player
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Cheater
    }

    fn next_order(&mut self, state: &GameState) -> Action {
        if state.is_active(&self.player) {
            Action::Cheat
        } else {
            Action::Done
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::*;

    #[test]
    fn test_cheats_while_active() {
        let state = rigged(
            &[("A", "X", 1), ("B", "X", 1), ("C", "X", 1), ("D", "Y", 1), ("E", "Y", 1), ("F", "Y", 1)],
            (3, 0),
        );
        assert_eq!(CheaterStrategy::new("X").next_order(&state), Action::Cheat);
        assert_eq!(CheaterStrategy::new("Nobody").next_order(&state), Action::Done);
    }
}
