// ═══════════════════════════════════════════════════════════════════════
// Random Strategy — random orders that are usually legal.
// Serves as baseline and for testing game engine stability.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{self, Strategy};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use warzone_engine::engine::Action;
use warzone_engine::types::*;
use warzone_engine::{CountryId, Order};

/// Chance of stopping instead of issuing another movement order.
const STOP_CHANCE: f64 = 0.3;
const CARD_CHANCE: f64 = 0.5;

pub struct RandomStrategy {
    player: String,
    rng: ChaCha8Rng,
}

impl RandomStrategy {
    pub fn new(player: &str, seed: u64) -> Self {
        RandomStrategy { player: player.to_string(), rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    fn card_order(&mut self, state: &GameState, me: &Player, owned: &[CountryId]) -> Option<Order> {
        let card = *me.cards.choose(&mut self.rng)?;
        let home = *owned.choose(&mut self.rng)?;
        match card {
            Card::Bomb => {
                let enemies: Vec<CountryId> =
                    owned.iter().flat_map(|&c| agent::attackable(state, me, c)).collect();
                enemies.choose(&mut self.rng).map(|&target| Order::Bomb { target })
            }
            Card::Blockade => (owned.len() > 1).then_some(Order::Blockade { target: home }),
            Card::Airlift => {
                let target = *owned.choose(&mut self.rng)?;
                let armies = agent::projected_armies(state, me, home);
                (target != home && armies > 0).then(|| Order::Airlift {
                    source: home,
                    target,
                    armies: self.rng.gen_range(1..=armies),
                })
            }
            Card::Negotiate => {
                let others: Vec<String> =
                    state.active_players().into_iter().filter(|p| *p != self.player).collect();
                others.choose(&mut self.rng).map(|p| Order::Negotiate { player: p.clone() })
            }
        }
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &str {
        "Random"
    }

    fn player(&self) -> &str {
        &self.player
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Random
    }

    fn next_order(&mut self, state: &GameState) -> Action {
        let Some(me) = state.player(&self.player) else { return Action::Done };
        let owned: Vec<CountryId> = me.countries.iter().copied().collect();
        let Some(&home) = owned.choose(&mut self.rng) else { return Action::Done };

        let pool = me.undeployed();
        if pool > 0 {
            let armies = self.rng.gen_range(1..=pool);
            return Action::Issue(Order::Deploy { target: home, armies });
        }

        if !me.cards.is_empty() && self.rng.gen_bool(CARD_CHANCE) {
            if let Some(order) = self.card_order(state, me, &owned) {
                return Action::Issue(order);
            }
        }

        if self.rng.gen_bool(STOP_CHANCE) {
            return Action::Done;
        }

        let movable: Vec<(CountryId, u32)> =
            agent::holdings(state, me).into_iter().filter(|&(_, armies)| armies > 0).collect();
        let Some(&(source, armies)) = movable.choose(&mut self.rng) else { return Action::Done };
        let neighbors: Vec<CountryId> =
            state.map.country(source).map_or_else(Vec::new, |c| c.neighbors.iter().copied().collect());
        match neighbors.choose(&mut self.rng) {
            Some(&target) => Action::Issue(Order::Advance {
                source,
                target,
                armies: self.rng.gen_range(1..=armies),
            }),
            None => Action::Done,
        }
    }
}
