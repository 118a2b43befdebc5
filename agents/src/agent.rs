// ═══════════════════════════════════════════════════════════════════════
// Strategy Trait — interface every player behaviour implements
//
// The engine names the player it is waiting on; the driver looks up that
// player's strategy and calls `next_order`. A strategy is asked repeatedly
// during one IssueOrder phase and answers with one `Action` each time:
//
//   1. deploy while pool armies are not yet promised to a queued Deploy
//   2. otherwise maybe play a card, biased per strategy
//   3. otherwise advance with what is left, or say `Done`
//
// Strategies read the state but never mutate it; everything they plan is
// visible to them through their own queued orders.
// ═══════════════════════════════════════════════════════════════════════

use crate::{AggressiveStrategy, BenevolentStrategy, CheaterStrategy, RandomStrategy};
use warzone_engine::engine::Action;
use warzone_engine::navigation;
use warzone_engine::types::*;
use warzone_engine::{CountryId, Order};

pub trait Strategy: Send {
    /// Human-readable name for this strategy (e.g. "Aggressive").
    fn name(&self) -> &str;

    /// The player this strategy is playing.
    fn player(&self) -> &str;

    fn kind(&self) -> StrategyKind;

    /// Decide the next step of this player's IssueOrder phase.
    fn next_order(&mut self, state: &GameState) -> Action;
}

/// Build a computer strategy. Human players need a command source and are
/// built with `HumanStrategy::new` instead.
pub fn build(kind: StrategyKind, player: &str, seed: u64) -> Result<Box<dyn Strategy>, String> {
    Ok(match kind {
        StrategyKind::Random => Box::new(RandomStrategy::new(player, seed)),
        StrategyKind::Aggressive => Box::new(AggressiveStrategy::new(player, seed)),
        StrategyKind::Benevolent => Box::new(BenevolentStrategy::new(player, seed)),
        StrategyKind::Cheater => Box::new(CheaterStrategy::new(player)),
        StrategyKind::Human | StrategyKind::Neutral => {
            return Err(format!("{} is not a computer strategy", kind));
        }
    })
}

// ── Shared planning helpers ────────────────────────────────────────────

/// Armies `country` will hold once `me`'s queued orders run, assuming
/// every one of them succeeds. Armies sent off to attack count as gone.
pub fn projected_armies(state: &GameState, me: &Player, country: CountryId) -> u32 {
    let Some(c) = state.map.country(country) else { return 0 };
    let mut armies = c.armies as i64;
    for order in &me.orders {
        match *order {
            Order::Deploy { target, armies: n } if target == country => armies += n as i64,
            Order::Advance { source, target, armies: n } | Order::Airlift { source, target, armies: n } => {
                if source == country {
                    armies -= n as i64;
                }
                if target == country && c.is_owned_by(&me.name) {
                    armies += n as i64;
                }
            }
            _ => {}
        }
    }
    armies.max(0) as u32
}

/// Owned countries with their projected armies, in id order.
pub fn holdings(state: &GameState, me: &Player) -> Vec<(CountryId, u32)> {
    me.countries.iter().map(|&c| (c, projected_armies(state, me, c))).collect()
}

/// Enemy neighbors of `country` that `me` may attack this round.
pub fn attackable(state: &GameState, me: &Player, country: CountryId) -> Vec<CountryId> {
    navigation::enemy_neighbors(state, country, &me.name)
        .into_iter()
        .filter(|&n| {
            state
                .map
                .country(n)
                .and_then(|c| c.owner.as_deref())
                .map_or(true, |owner| !me.has_truce_with(owner))
        })
        .collect()
}

/// Step 1 of every strategy: put the unpromised pool on `target`.
pub fn deploy_all(me: &Player, target: CountryId) -> Option<Action> {
    let armies = me.undeployed();
    (armies > 0).then(|| Action::Issue(Order::Deploy { target, armies }))
}

/// True once this round's queue already holds an order of the same kind.
pub fn already_queued(me: &Player, pred: impl Fn(&Order) -> bool) -> bool {
    me.orders.iter().any(pred)
}

pub fn armies_on(state: &GameState, country: CountryId) -> u32 {
    state.map.country(country).map_or(0, |c| c.armies)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_projected_armies_follow_queue() {
        let mut state = rigged(
            &[("A", "X", 2), ("B", "X", 2), ("C", "X", 4), ("D", "Y", 3), ("E", "Y", 1), ("F", "Y", 1)],
            (5, 0),
        );
        let (a, c, d) = (id(&state, "A"), id(&state, "C"), id(&state, "D"));
        let me = state.player_mut("X").unwrap();
        me.orders.push_back(Order::Deploy { target: c, armies: 5 });
        me.orders.push_back(Order::Advance { source: c, target: d, armies: 6 });
        me.orders.push_back(Order::Advance { source: a, target: c, armies: 1 });
        let me = state.player("X").unwrap().clone();
        assert_eq!(projected_armies(&state, &me, c), 4);
        assert_eq!(projected_armies(&state, &me, a), 1);
        // Armies sent into enemy land are not counted there
        assert_eq!(projected_armies(&state, &me, d), 3);
        assert_eq!(me.undeployed(), 0);
        assert!(deploy_all(&me, a).is_none());
    }

    #[test]
    fn test_attackable_skips_truce() {
        let mut state = rigged(
            &[("A", "X", 1), ("B", "X", 1), ("C", "X", 1), ("D", "Y", 1), ("E", "Y", 1), ("F", "Y", 1)],
            (0, 0),
        );
        let (c, d) = (id(&state, "C"), id(&state, "D"));
        assert_eq!(attackable(&state, state.player("X").unwrap(), c), vec![d]);
        state.player_mut("X").unwrap().truces.insert("Y".into());
        assert!(attackable(&state, state.player("X").unwrap(), c).is_empty());
    }

    #[test]
    fn test_build_rejects_non_computer_kinds() {
        assert!(build(StrategyKind::Human, "H", 1).is_err());
        assert!(build(StrategyKind::Neutral, "N", 1).is_err());
        for kind in StrategyKind::COMPUTER {
            let s = build(kind, "P", 1).unwrap();
            assert_eq!(s.kind(), kind);
            assert_eq!(s.player(), "P");
        }
    }
}
