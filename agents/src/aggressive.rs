// ═══════════════════════════════════════════════════════════════════════
// Aggressive Strategy — stack everything on one country and attack.
//
//   - deploys the whole pool onto its strongest front-line country
//   - plays Bomb on the toughest neighbor in its way and Airlift to pull
//     rear armies forward; rarely anything else
//   - advances from the strongest front-line country into the weakest
//     attackable neighbor with every army it has
//   - interior stacks march one step toward the front
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{self, Strategy};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use warzone_engine::engine::Action;
use warzone_engine::navigation;
use warzone_engine::types::*;
use warzone_engine::{CountryId, Order};

const FAVOURED_CARD_CHANCE: f64 = 0.9;
const OTHER_CARD_CHANCE: f64 = 0.1;

pub struct AggressiveStrategy {
    player: String,
    rng: ChaCha8Rng,
}

impl AggressiveStrategy {
    pub fn new(player: &str, seed: u64) -> Self {
        AggressiveStrategy { player: player.to_string(), rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Strongest owned country that borders something attackable, falling
    /// back to the strongest overall. Ties go to the lowest id.
    fn strongest(state: &GameState, me: &Player) -> Option<(CountryId, u32)> {
        let held = agent::holdings(state, me);
        let best = |cands: &mut dyn Iterator<Item = (CountryId, u32)>| {
            cands.fold(None, |best: Option<(CountryId, u32)>, (c, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((c, n)),
            })
        };
        best(&mut held.iter().copied().filter(|&(c, _)| !agent::attackable(state, me, c).is_empty()))
            .or_else(|| best(&mut held.iter().copied()))
    }

    fn card_order(&mut self, state: &GameState, me: &Player, front: CountryId) -> Option<Order> {
        for &card in &me.cards {
            let chance = match card {
                Card::Bomb | Card::Airlift => FAVOURED_CARD_CHANCE,
                Card::Blockade | Card::Negotiate => OTHER_CARD_CHANCE,
            };
            if !self.rng.gen_bool(chance) {
                continue;
            }
            let order = match card {
                Card::Bomb => agent::attackable(state, me, front)
                    .into_iter()
                    .max_by_key(|&n| (agent::armies_on(state, n), std::cmp::Reverse(n)))
                    .map(|target| Order::Bomb { target }),
                Card::Airlift => agent::holdings(state, me)
                    .into_iter()
                    .filter(|&(c, n)| c != front && n > 0 && !navigation::is_border(state, c, &me.name))
                    .max_by_key(|&(c, n)| (n, std::cmp::Reverse(c)))
                    .map(|(source, armies)| Order::Airlift { source, target: front, armies }),
                Card::Negotiate => state
                    .active_players()
                    .into_iter()
                    .find(|p| *p != me.name)
                    .map(|player| Order::Negotiate { player }),
                // Never hands land to Neutral
                Card::Blockade => None,
            };
            if order.is_some() {
                return order;
            }
        }
        None
    }

    /// One step toward the front for the biggest interior stack.
    fn regroup(state: &GameState, me: &Player) -> Option<Order> {
        if agent::already_queued(me, |o| matches!(o, Order::Advance { .. })) {
            return None;
        }
        let distances = navigation::frontier_distances(state, &me.name);
        let (source, armies) = agent::holdings(state, me)
            .into_iter()
            .filter(|&(c, n)| n > 0 && distances.get(&c).is_some_and(|&d| d > 0))
            .max_by_key(|&(c, n)| (n, std::cmp::Reverse(c)))?;
        let here = distances[&source];
        let target = navigation::friendly_neighbors(state, source, &me.name)
            .into_iter()
            .find(|n| distances.get(n).is_some_and(|&d| d < here))?;
        Some(Order::Advance { source, target, armies })
    }
}

impl Strategy for AggressiveStrategy {
    fn name(&self) -> &str {
        "Aggressive"
    }

    fn player(&self) -> &str {
        &self.player
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Aggressive
    }

    fn next_order(&mut self, state: &GameState) -> Action {
        let Some(me) = state.player(&self.player) else { return Action::Done };
        let Some((front, armies)) = Self::strongest(state, me) else { return Action::Done };

        if let Some(deploy) = agent::deploy_all(me, front) {
            return deploy;
        }

        if let Some(order) = self.card_order(state, me, front) {
            return Action::Issue(order);
        }

        if armies > 0 {
            let weakest = agent::attackable(state, me, front)
                .into_iter()
                .min_by_key(|&n| (agent::armies_on(state, n), n));
            if let Some(target) = weakest {
                return Action::Issue(Order::Advance { source: front, target, armies });
            }
        }

        match Self::regroup(state, me) {
            Some(order) => Action::Issue(order),
            None => Action::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::*;

    #[test]
    fn test_deploys_everything_to_the_front() {
        let state = rigged(
            &[("A", "X", 9), ("B", "X", 1), ("C", "X", 2), ("D", "Y", 1), ("E", "Y", 1), ("F", "Y", 1)],
            (5, 0),
        );
        let c = id(&state, "C");
        // A is bigger but only C borders the enemy
        assert_eq!(
            AggressiveStrategy::new("X", 1).next_order(&state),
            Action::Issue(Order::Deploy { target: c, armies: 5 })
        );
    }

    #[test]
    fn test_attacks_weakest_neighbor_with_everything() {
        let mut state = rigged(
            &[("A", "X", 1), ("B", "X", 1), ("C", "X", 2), ("D", "Y", 1), ("E", "Y", 1), ("F", "Y", 1)],
            (5, 0),
        );
        let (c, d) = (id(&state, "C"), id(&state, "D"));
        state.player_mut("X").unwrap().orders.push_back(Order::Deploy { target: c, armies: 5 });
        assert_eq!(
            AggressiveStrategy::new("X", 1).next_order(&state),
            Action::Issue(Order::Advance { source: c, target: d, armies: 7 })
        );
    }

    #[test]
    fn test_done_once_committed() {
        let mut state = rigged(
            &[("A", "X", 0), ("B", "X", 0), ("C", "X", 2), ("D", "Y", 1), ("E", "Y", 1), ("F", "Y", 1)],
            (0, 0),
        );
        let (c, d) = (id(&state, "C"), id(&state, "D"));
        state.player_mut("X").unwrap().orders.push_back(Order::Advance { source: c, target: d, armies: 2 });
        assert_eq!(AggressiveStrategy::new("X", 1).next_order(&state), Action::Done);
    }

    #[test]
    fn test_regroups_interior_stack() {
        let state = rigged(
            &[("A", "X", 6), ("B", "X", 0), ("C", "X", 0), ("D", "X", 0), ("E", "Y", 1), ("F", "Y", 1)],
            (0, 0),
        );
        let (a, c) = (id(&state, "A"), id(&state, "C"));
        // D is the only front; A's stack moves to C, one step closer
        assert_eq!(
            AggressiveStrategy::new("X", 1).next_order(&state),
            Action::Issue(Order::Advance { source: a, target: c, armies: 6 })
        );
    }
}
