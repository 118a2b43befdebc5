// ═══════════════════════════════════════════════════════════════════════
// Orders — the six order kinds, their validation and their effects.
//
// Every order is validated against the state at execution time, not at
// issue time: by then ownership and army counts may have changed. A failed
// validation is a no-op that still produces an `error` log line.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards;
use crate::log::{LogEntry, LogTag};
use crate::map::{Country, CountryId, MapGraph};
use crate::reinforcement;
use crate::rules::Rules;
use crate::types::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Deploy { target: CountryId, armies: u32 },
    Advance { source: CountryId, target: CountryId, armies: u32 },
    Bomb { target: CountryId },
    Blockade { target: CountryId },
    Airlift { source: CountryId, target: CountryId, armies: u32 },
    Negotiate { player: String },
}

/// Why an order was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("country {0} does not exist")]
    UnknownCountry(String),
    #[error("player '{0}' does not exist")]
    UnknownPlayer(String),
    #[error("{player} does not own {country}")]
    NotOwner { player: String, country: String },
    #[error("{0} is not held by an enemy")]
    NotEnemy(String),
    #[error("{from} and {to} are not adjacent")]
    NotAdjacent { from: String, to: String },
    #[error("{requested} armies requested but only {available} available")]
    InsufficientArmies { requested: u32, available: u32 },
    #[error("an order must involve at least one army")]
    ZeroArmies,
    #[error("source and target are the same country")]
    SameCountry,
    #[error("a truce with {0} is in effect")]
    Truce(String),
    #[error("'{0}' is not an active opponent")]
    NotActiveOpponent(String),
    #[error("no {0} card in hand")]
    MissingCard(Card),
    #[error("{0} has been eliminated")]
    Eliminated(String),
}

impl Order {
    /// Order text in the command grammar, e.g. `advance A B 3`.
    pub fn describe(&self, map: &MapGraph) -> String {
        match self {
            Order::Deploy { target, armies } => format!("deploy {} {}", map.country_name(*target), armies),
            Order::Advance { source, target, armies } => format!(
                "advance {} {} {}",
                map.country_name(*source),
                map.country_name(*target),
                armies
            ),
            Order::Bomb { target } => format!("bomb {}", map.country_name(*target)),
            Order::Blockade { target } => format!("blockade {}", map.country_name(*target)),
            Order::Airlift { source, target, armies } => format!(
                "airlift {} {} {}",
                map.country_name(*source),
                map.country_name(*target),
                armies
            ),
            Order::Negotiate { player } => format!("negotiate {}", player),
        }
    }

    /// Countries this order references.
    pub fn countries(&self) -> Vec<CountryId> {
        match self {
            Order::Deploy { target, .. } | Order::Bomb { target } | Order::Blockade { target } => vec![*target],
            Order::Advance { source, target, .. } | Order::Airlift { source, target, .. } => vec![*source, *target],
            Order::Negotiate { .. } => Vec::new(),
        }
    }

    pub fn is_offensive(&self) -> bool {
        matches!(self, Order::Advance { .. } | Order::Bomb { .. })
    }

    pub fn validate(&self, issuer: &str, state: &GameState) -> Result<(), Rejection> {
        let player = state
            .player(issuer)
            .ok_or_else(|| Rejection::UnknownPlayer(issuer.to_string()))?;
        if player.eliminated {
            return Err(Rejection::Eliminated(issuer.to_string()));
        }

        match self {
            Order::Deploy { target, armies } => {
                owned_by(state, issuer, *target)?;
                at_least_one(*armies)?;
                if *armies > player.reinforcements {
                    return Err(Rejection::InsufficientArmies {
                        requested: *armies,
                        available: player.reinforcements,
                    });
                }
                Ok(())
            }

            Order::Advance { source, target, armies } => {
                let from = owned_by(state, issuer, *source)?;
                let to = existing(state, *target)?;
                at_least_one(*armies)?;
                if !from.neighbors.contains(target) {
                    return Err(Rejection::NotAdjacent { from: from.name.clone(), to: to.name.clone() });
                }
                enough_armies(from, *armies)?;
                if !to.is_owned_by(issuer) {
                    no_truce(player, to)?;
                }
                Ok(())
            }

            Order::Bomb { target } => {
                let to = existing(state, *target)?;
                match &to.owner {
                    Some(owner) if owner != issuer => no_truce(player, to),
                    _ => Err(Rejection::NotEnemy(to.name.clone())),
                }
            }

            Order::Blockade { target } => owned_by(state, issuer, *target).map(|_| ()),

            Order::Airlift { source, target, armies } => {
                let from = owned_by(state, issuer, *source)?;
                owned_by(state, issuer, *target)?;
                if source == target {
                    return Err(Rejection::SameCountry);
                }
                at_least_one(*armies)?;
                enough_armies(from, *armies)
            }

            Order::Negotiate { player: other } => {
                if state.player(other).is_none() {
                    return Err(Rejection::UnknownPlayer(other.clone()));
                }
                if other == issuer || !state.is_active(other) {
                    return Err(Rejection::NotActiveOpponent(other.clone()));
                }
                Ok(())
            }
        }
    }

    /// Validate and apply. Always yields exactly one log entry.
    pub fn execute(&self, issuer: &str, state: &mut GameState) -> LogEntry {
        let round = state.round;
        let text = self.describe(&state.map);

        if let Err(why) = self.validate(issuer, state) {
            tracing::debug!(target: "warzone::orders", %issuer, order = %text, %why, "order failed validation");
            return LogEntry::new(LogTag::Error, round, format!("{}: '{}' failed: {}", issuer, text, why));
        }

        let effect = match self {
            Order::Deploy { target, armies } => {
                if let Some(p) = state.player_mut(issuer) {
                    p.reinforcements -= armies;
                }
                add_armies(state, *target, *armies);
                format!("{} now has {} armies", state.map.country_name(*target), armies_on(state, *target))
            }
            Order::Advance { source, target, armies } => advance(state, issuer, *source, *target, *armies),
            Order::Bomb { target } => {
                let before = armies_on(state, *target);
                if let Some(c) = state.map.country_mut(*target) {
                    c.armies /= 2;
                }
                format!("{} bombed from {} to {} armies", state.map.country_name(*target), before, before / 2)
            }
            Order::Blockade { target } => blockade(state, *target),
            Order::Airlift { source, target, armies } => {
                move_armies(state, *source, *target, *armies);
                format!("airlifted {} armies", armies)
            }
            Order::Negotiate { player } => {
                if let Some(p) = state.player_mut(issuer) {
                    p.truces.insert(player.clone());
                }
                if let Some(p) = state.player_mut(player) {
                    p.truces.insert(issuer.to_string());
                }
                format!("truce between {} and {} until next round", issuer, player)
            }
        };

        tracing::debug!(target: "warzone::orders", %issuer, order = %text, %effect, "order executed");
        LogEntry::new(LogTag::Order, round, format!("{}: {} -- {}", issuer, text, effect))
    }
}

// ── Validation helpers ─────────────────────────────────────────────────

fn existing(state: &GameState, id: CountryId) -> Result<&Country, Rejection> {
    state
        .map
        .country(id)
        .ok_or_else(|| Rejection::UnknownCountry(format!("#{}", id.0)))
}

fn owned_by<'a>(state: &'a GameState, player: &str, id: CountryId) -> Result<&'a Country, Rejection> {
    let c = existing(state, id)?;
    if c.is_owned_by(player) {
        Ok(c)
    } else {
        Err(Rejection::NotOwner { player: player.to_string(), country: c.name.clone() })
    }
}

fn at_least_one(armies: u32) -> Result<(), Rejection> {
    if armies == 0 {
        Err(Rejection::ZeroArmies)
    } else {
        Ok(())
    }
}

fn enough_armies(from: &Country, requested: u32) -> Result<(), Rejection> {
    if requested > from.armies {
        Err(Rejection::InsufficientArmies { requested, available: from.armies })
    } else {
        Ok(())
    }
}

fn no_truce(player: &Player, target: &Country) -> Result<(), Rejection> {
    match &target.owner {
        Some(owner) if player.has_truce_with(owner) => Err(Rejection::Truce(owner.clone())),
        _ => Ok(()),
    }
}

// ── Effects ────────────────────────────────────────────────────────────

fn armies_on(state: &GameState, id: CountryId) -> u32 {
    state.map.country(id).map_or(0, |c| c.armies)
}

fn add_armies(state: &mut GameState, id: CountryId, armies: u32) {
    if let Some(c) = state.map.country_mut(id) {
        c.armies = c.armies.saturating_add(armies);
    }
}

fn move_armies(state: &mut GameState, source: CountryId, target: CountryId, armies: u32) {
    if let Some(c) = state.map.country_mut(source) {
        c.armies -= armies;
    }
    add_armies(state, target, armies);
}

/// Deterministic battle: returns `(attacker_losses, defender_losses)`.
/// Each side kills `round(armies * kill_pct / 100)` of the other, capped at
/// what the other side brought.
pub fn resolve_combat(attackers: u32, defenders: u32, rules: &Rules) -> (u32, u32) {
    let kills = |armies: u32, pct: u32| ((armies as u64 * pct as u64 + 50) / 100) as u32;
    let defender_losses = kills(attackers, rules.attack_kill_pct).min(defenders);
    let attacker_losses = kills(defenders, rules.defend_kill_pct).min(attackers);
    (attacker_losses, defender_losses)
}

fn advance(state: &mut GameState, issuer: &str, source: CountryId, target: CountryId, armies: u32) -> String {
    let defender = state.map.country(target).and_then(|c| c.owner.clone());
    if defender.as_deref() == Some(issuer) {
        move_armies(state, source, target, armies);
        return format!("moved {} armies", armies);
    }

    let defenders = armies_on(state, target);
    let (attacker_losses, defender_losses) = resolve_combat(armies, defenders, &state.rules);
    let survivors = armies - attacker_losses;
    let remaining = defenders - defender_losses;
    let target_name = state.map.country_name(target);

    if let Some(c) = state.map.country_mut(source) {
        c.armies -= armies;
    }

    if remaining > 0 {
        if let Some(c) = state.map.country_mut(target) {
            c.armies = remaining;
        }
        add_armies(state, source, survivors);
        return format!(
            "battle {}v{} at {}: repelled, {} defenders remain, {} attackers fall back",
            armies, defenders, target_name, remaining, survivors
        );
    }

    if let Some(c) = state.map.country_mut(target) {
        c.armies = survivors;
    }
    let eliminated = transfer_country(state, target, issuer);
    let mut text = format!(
        "battle {}v{} at {}: conquered from {} with {} armies",
        armies,
        defenders,
        target_name,
        defender.as_deref().unwrap_or("nobody"),
        survivors
    );
    if let Some(card) = cards::award_conquest_card(state, issuer) {
        text.push_str(&format!("; drew a {} card", card));
    }
    if let Some(loser) = eliminated {
        text.push_str(&format!("; {} has been eliminated", loser));
    }
    text
}

fn blockade(state: &mut GameState, target: CountryId) -> String {
    if let Some(c) = state.map.country_mut(target) {
        c.armies = c.armies.saturating_mul(3);
    }
    ensure_neutral(state);
    let eliminated = transfer_country(state, target, NEUTRAL);
    let mut text = format!(
        "{} blockaded with {} armies and handed to {}",
        state.map.country_name(target),
        armies_on(state, target),
        NEUTRAL
    );
    if let Some(loser) = eliminated {
        text.push_str(&format!("; {} has been eliminated", loser));
    }
    text
}

/// Create the Neutral sink player on first use.
pub fn ensure_neutral(state: &mut GameState) {
    if state.neutral().is_none() {
        tracing::debug!(target: "warzone::orders", "creating neutral player");
        state.players.push(Player::new(NEUTRAL, StrategyKind::Neutral));
    }
}

/// Move ownership of `country` to `new_owner`, keeping both players'
/// country and continent sets in sync. Returns the previous owner if this
/// transfer eliminated them.
pub fn transfer_country(state: &mut GameState, country: CountryId, new_owner: &str) -> Option<String> {
    let old_owner = state.map.country_mut(country).and_then(|c| c.owner.replace(new_owner.to_string()));

    if let Some(p) = state.player_mut(new_owner) {
        p.countries.insert(country);
    }
    reinforcement::recompute_continents(state, new_owner);

    let old = old_owner?;
    if old == new_owner {
        return None;
    }
    let now_empty = match state.player_mut(&old) {
        Some(p) => {
            p.countries.remove(&country);
            p.countries.is_empty() && !p.is_neutral() && !p.eliminated
        }
        None => false,
    };
    reinforcement::recompute_continents(state, &old);

    if now_empty {
        eliminate(state, &old);
        Some(old)
    } else {
        None
    }
}

/// Knock a player out: cards, pool, queued orders and truces are discarded.
pub fn eliminate(state: &mut GameState, name: &str) {
    if let Some(p) = state.player_mut(name) {
        p.eliminated = true;
        p.cards.clear();
        p.reinforcements = 0;
        p.orders.clear();
        p.truces.clear();
        p.done = true;
    }
    for p in &mut state.players {
        p.truces.remove(name);
    }
    tracing::info!(target: "warzone::orders", player = %name, round = state.round, "player eliminated");
}
