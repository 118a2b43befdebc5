// ═══════════════════════════════════════════════════════════════════════
// Benevolent Strategy — protect the weakest countries, never attack.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{self, Strategy};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use warzone_engine::engine::Action;
use warzone_engine::navigation;
use warzone_engine::types::*;
use warzone_engine::{CountryId, Order};

const CARD_CHANCE: f64 = 0.6;

pub struct BenevolentStrategy {
    player: String,
    rng: ChaCha8Rng,
}

impl BenevolentStrategy {
    pub fn new(player: &str, seed: u64) -> Self {
        BenevolentStrategy { player: player.to_string(), rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    fn weakest(held: &[(CountryId, u32)]) -> Option<(CountryId, u32)> {
        held.iter().copied().min_by_key(|&(c, n)| (n, c))
    }

    fn strongest(held: &[(CountryId, u32)]) -> Option<(CountryId, u32)> {
        held.iter().copied().max_by_key(|&(c, n)| (n, std::cmp::Reverse(c)))
    }

    fn card_order(&mut self, state: &GameState, me: &Player, held: &[(CountryId, u32)]) -> Option<Order> {
        if !self.rng.gen_bool(CARD_CHANCE) {
            return None;
        }
        if me.has_card(Card::Airlift) {
            let (target, low) = Self::weakest(held)?;
            let (source, high) = Self::strongest(held)?;
            let armies = (high - low) / 2;
            if source != target && armies > 0 {
                return Some(Order::Airlift { source, target, armies });
            }
        }
        if me.has_card(Card::Negotiate) {
            let others: Vec<String> = state.active_players().into_iter().filter(|p| *p != me.name).collect();
            if let Some(player) = others.choose(&mut self.rng) {
                return Some(Order::Negotiate { player: player.clone() });
            }
        }
        None
    }

    /// Shift half the difference from the strongest country to its weakest
    /// friendly neighbor. One such move per round.
    fn reinforce_neighbor(state: &GameState, me: &Player, held: &[(CountryId, u32)]) -> Option<Order> {
        if agent::already_queued(me, |o| matches!(o, Order::Advance { .. })) {
            return None;
        }
        let (source, high) = Self::strongest(held)?;
        let (target, low) = navigation::friendly_neighbors(state, source, &me.name)
            .into_iter()
            .map(|n| (n, agent::projected_armies(state, me, n)))
            .min_by_key(|&(c, n)| (n, c))?;
        let armies = high.saturating_sub(low) / 2;
        (armies > 0).then_some(Order::Advance { source, target, armies })
    }
}

impl Strategy for BenevolentStrategy {
    fn name(&self) -> &str {
        "Benevolent"
    }

    fn player(&self) -> &str {
        &self.player
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Benevolent
    }

    fn next_order(&mut self, state: &GameState) -> Action {
        let Some(me) = state.player(&self.player) else { return Action::Done };
        let held = agent::holdings(state, me);
        let Some((weakest, _)) = Self::weakest(&held) else { return Action::Done };

        if let Some(deploy) = agent::deploy_all(me, weakest) {
            return deploy;
        }

        if let Some(order) = self.card_order(state, me, &held) {
            return Action::Issue(order);
        }

        match Self::reinforce_neighbor(state, me, &held) {
            Some(order) => Action::Issue(order),
            None => Action::Done,
        }
    }
}
