// ═══════════════════════════════════════════════════════════════════════
// Game Engine — the phase controller.
//
// Architecture:
//   The engine is a pure state machine. It never does I/O or calls
//   strategies. It sets `state.pending` to name the player whose order is
//   wanted, and the driver asks that player's strategy and feeds the answer
//   back via `apply_action()`.
//
// Flow:
//   1. Startup commands (or `setup::create_initial_state`) deal the map
//      and open round 1
//   2. Driver calls `advance()`; the engine polls active players
//      round-robin until every one of them is done issuing
//   3. Queued orders drain round-robin, one per player per cycle
//   4. Win / draw is checked, the next round starts, back to 2
// ═══════════════════════════════════════════════════════════════════════

use crate::cards;
use crate::command::Command;
use crate::error::EngineError;
use crate::log::LogTag;
use crate::map::CountryId;
use crate::navigation;
use crate::orders::{self, Order, Rejection};
use crate::reinforcement;
use crate::setup;
use crate::types::*;
use std::collections::{BTreeSet, VecDeque};

/// A strategy's answer to `PendingDecision::IssueOrder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Queue an order for this round's execution phase.
    Issue(Order),
    /// Run the cheater effect immediately. Ends the player's issuing.
    Cheat,
    /// Finished issuing for this round.
    Done,
}

/// Push the game forward until a player decision is needed (sets
/// `state.pending`), the game ends, or the game is still in Startup.
pub fn advance(state: &mut GameState) {
    loop {
        if state.pending.is_some() || state.is_over() {
            return;
        }

        match state.phase {
            Phase::Startup | Phase::End => return,

            Phase::IssueOrder => match next_issuer(state) {
                Some(player) => {
                    state.pending = Some(PendingDecision::IssueOrder { player });
                    return;
                }
                None => {
                    state.phase = Phase::OrderExecution;
                    state.record(LogTag::Phase, format!("round {}: OrderExecution", state.round));
                }
            },

            Phase::OrderExecution => {
                execute_orders(state);
                if !check_end(state) {
                    begin_round(state);
                }
            }
        }
    }
}

/// Next active player, round-robin from `issue_index`, who still wants to
/// issue. Players who hit the per-round cap are marked done on the way.
fn next_issuer(state: &mut GameState) -> Option<String> {
    let n = state.players.len();
    let cap = state.rules.max_orders_per_round;
    for step in 0..n {
        let i = (state.issue_index + step) % n;
        let p = &mut state.players[i];
        if !p.is_active() || p.done {
            continue;
        }
        if p.orders_issued >= cap {
            p.done = true;
            continue;
        }
        let name = p.name.clone();
        state.issue_index = (i + 1) % n;
        return Some(name);
    }
    None
}

/// Resolve the pending decision with `action`.
pub fn apply_action(state: &mut GameState, action: Action) {
    let Some(pending) = state.pending.take() else {
        tracing::warn!(target: "warzone::engine", ?action, "action submitted with nothing pending");
        return;
    };
    let player = pending.player().to_string();

    match action {
        Action::Issue(order) => {
            // Rejections are already logged; the round carries on.
            let _ = issue_order(state, &player, order);
        }
        Action::Cheat => apply_cheat(state, &player),
        Action::Done => {
            if let Some(p) = state.player_mut(&player) {
                p.done = true;
            }
            state.record(LogTag::Command, format!("{}: commit", player));
        }
    }
}

/// Queue `order` for `player` after the issue-time checks. Card orders use
/// up their card here. Every attempt, accepted or not, counts toward the
/// per-round cap.
pub fn issue_order(state: &mut GameState, player: &str, order: Order) -> Result<(), Rejection> {
    let checked = check_issue(state, player, &order);
    let text = order.describe(&state.map);
    let cap = state.rules.max_orders_per_round;

    if let Some(p) = state.player_mut(player) {
        p.orders_issued += 1;
        if p.orders_issued >= cap {
            p.done = true;
        }
    }

    match checked {
        Ok(()) => {
            if let Some(p) = state.player_mut(player) {
                if let Some(card) = cards::card_for(&order) {
                    p.take_card(card);
                }
                p.orders.push_back(order);
            }
            state.record(LogTag::Order, format!("{} issued: {}", player, text));
            Ok(())
        }
        Err(why) => {
            tracing::debug!(target: "warzone::orders", %player, order = %text, %why, "issue rejected");
            state.record(LogTag::Error, format!("{}: cannot issue '{}': {}", player, text, why));
            Err(why)
        }
    }
}

fn check_issue(state: &GameState, player: &str, order: &Order) -> Result<(), Rejection> {
    let p = state
        .player(player)
        .ok_or_else(|| Rejection::UnknownPlayer(player.to_string()))?;
    if !p.is_active() {
        return Err(Rejection::Eliminated(player.to_string()));
    }
    for id in order.countries() {
        if state.map.country(id).is_none() {
            return Err(Rejection::UnknownCountry(format!("#{}", id.0)));
        }
    }
    if let Some(card) = cards::card_for(order) {
        if !p.has_card(card) {
            return Err(Rejection::MissingCard(card));
        }
    }

    match order {
        Order::Deploy { target, armies } => {
            if *armies == 0 {
                return Err(Rejection::ZeroArmies);
            }
            if !state.map.country(*target).is_some_and(|c| c.is_owned_by(player)) {
                return Err(Rejection::NotOwner {
                    player: player.to_string(),
                    country: state.map.country_name(*target),
                });
            }
            let available = p.undeployed();
            if *armies > available {
                return Err(Rejection::InsufficientArmies { requested: *armies, available });
            }
            Ok(())
        }
        Order::Negotiate { player: other } if state.player(other).is_none() => {
            Err(Rejection::UnknownPlayer(other.clone()))
        }
        _ => Ok(()),
    }
}

/// The cheater effect, applied at once and outside the order queue: take
/// every enemy country bordering the cheater (armies stay where they are),
/// then double armies on each cheater country that still borders an enemy.
/// Truces are ignored and no card is drawn.
pub fn apply_cheat(state: &mut GameState, player: &str) {
    if !state.is_active(player) {
        return;
    }

    let owned: Vec<CountryId> = state.player(player).map_or_else(Vec::new, |p| p.countries.iter().copied().collect());
    let targets: BTreeSet<CountryId> = owned
        .iter()
        .flat_map(|&c| navigation::enemy_neighbors(state, c, player))
        .collect();

    for &target in &targets {
        let from = state.map.country(target).and_then(|c| c.owner.clone());
        let eliminated = orders::transfer_country(state, target, player);
        state.record(
            LogTag::Effect,
            format!(
                "{} cheats: takes {} from {}",
                player,
                state.map.country_name(target),
                from.as_deref().unwrap_or("nobody")
            ),
        );
        if let Some(loser) = eliminated {
            state.record(LogTag::Effect, format!("{} has been eliminated", loser));
        }
    }

    let owned: Vec<CountryId> = state.player(player).map_or_else(Vec::new, |p| p.countries.iter().copied().collect());
    let borders: Vec<CountryId> = owned.into_iter().filter(|&c| navigation::is_border(state, c, player)).collect();
    for &c in &borders {
        if let Some(country) = state.map.country_mut(c) {
            country.armies = country.armies.saturating_mul(2);
        }
    }

    tracing::debug!(
        target: "warzone::engine",
        %player,
        conquered = targets.len(),
        doubled = borders.len(),
        "cheat applied"
    );
    state.record(
        LogTag::Effect,
        format!("{} cheats: doubles armies on {} border countries", player, borders.len()),
    );
    if let Some(p) = state.player_mut(player) {
        p.done = true;
    }
}

/// Open the next round's IssueOrder phase: truces expire, per-round flags
/// reset and every active player's pool is set to this round's
/// reinforcements. Armies left undeployed last round are forfeited.
pub fn begin_round(state: &mut GameState) {
    state.round += 1;
    state.phase = Phase::IssueOrder;
    state.issue_index = 0;
    state.pending = None;

    for p in &mut state.players {
        p.truces.clear();
        p.conquered_this_round = false;
        p.orders_issued = 0;
        p.done = !p.is_active();
    }

    for name in state.active_players() {
        let bonus = reinforcement::reinforcements(state, &name);
        reinforcement::recompute_continents(state, &name);
        if let Some(p) = state.player_mut(&name) {
            p.reinforcements = bonus;
        }
        state.record(LogTag::Effect, format!("{} receives {} reinforcements", name, bonus));
    }

    tracing::info!(target: "warzone::engine", round = state.round, "round started");
    state.record(LogTag::Phase, format!("round {}: IssueOrder", state.round));
}

/// Drain every queue round-robin, one order per player per cycle.
fn execute_orders(state: &mut GameState) {
    loop {
        let mut drained = false;
        for i in 0..state.players.len() {
            let Some(order) = state.players[i].orders.pop_front() else { continue };
            drained = true;
            let name = state.players[i].name.clone();
            let entry = order.execute(&name, state);
            state.push_log(entry);
        }
        if !drained {
            break;
        }
    }
}

/// Decide whether the game is over. A player wins once their countries plus
/// Neutral's cover the whole map; reaching `max_rounds` or running out of
/// competing players is a draw.
fn check_end(state: &mut GameState) -> bool {
    let total = state.map.country_count();
    let neutral_held = state.neutral().map_or(0, |n| n.countries.len());

    let winner = state
        .players
        .iter()
        .find(|p| p.is_active() && p.countries.len() + neutral_held == total)
        .map(|p| p.name.clone());

    let text = if let Some(name) = &winner {
        format!("{} wins after {} rounds", name, state.round)
    } else if state.active_players().is_empty() {
        format!("draw after {} rounds: no players remain", state.round)
    } else if state.round >= state.rules.max_rounds {
        format!("draw: round limit of {} reached", state.rules.max_rounds)
    } else {
        return false;
    };

    state.phase = Phase::End;
    state.pending = None;
    state.winner = winner;
    tracing::info!(target: "warzone::engine", round = state.round, winner = ?state.winner, "game over");
    state.record(LogTag::End, text);
    true
}

/// Parse and run one text command from `issuer`. Startup commands edit the
/// map and roster; order commands answer the pending decision and must come
/// from the pending player. Errors are logged and leave the state untouched.
pub fn submit_command(state: &mut GameState, issuer: &str, text: &str) -> Result<(), EngineError> {
    let result = run_command(state, issuer, text);
    if let Err(e) = &result {
        tracing::debug!(target: "warzone::engine", %issuer, command = %text, error = %e, "command rejected");
        state.record(LogTag::Error, format!("{}: '{}': {}", issuer, text.trim(), e));
    }
    result
}

fn run_command(state: &mut GameState, issuer: &str, text: &str) -> Result<(), EngineError> {
    let command = Command::parse(text)?;
    if !command.allowed_in(state.phase) {
        return Err(EngineError::InvalidForPhase { command: command.name().to_string(), phase: state.phase });
    }

    match &command {
        Command::Order(_) | Command::Commit => {
            if state.pending.as_ref().map(|p| p.player()) != Some(issuer) {
                return Err(EngineError::NotPending(issuer.to_string()));
            }
            let action = match &command {
                Command::Order(order) => {
                    let order = order.resolve(&state.map)?;
                    state.record(LogTag::Command, format!("{}: {}", issuer, text.trim()));
                    Action::Issue(order)
                }
                _ => Action::Done,
            };
            apply_action(state, action);
            Ok(())
        }
        _ => {
            state.record(LogTag::Command, format!("{}: {}", issuer, text.trim()));
            setup::apply_startup_command(state, &command)
        }
    }
}

/// Poll every active player round-robin until all are done issuing, then
/// return this round's orders in the sequence they will execute. The state
/// is left ready for `advance()` to run the execution phase.
pub fn produce_orders_for_round<F>(state: &mut GameState, mut decide: F) -> Vec<(String, Order)>
where
    F: FnMut(&GameState, &str) -> Action,
{
    if state.phase != Phase::IssueOrder {
        return Vec::new();
    }
    loop {
        if state.pending.is_none() {
            match next_issuer(state) {
                Some(player) => state.pending = Some(PendingDecision::IssueOrder { player }),
                None => break,
            }
        }
        let Some(player) = state.pending.as_ref().map(|p| p.player().to_string()) else { break };
        let action = decide(state, &player);
        apply_action(state, action);
    }
    execution_sequence(state)
}

/// Queued orders in round-robin drain order.
pub fn execution_sequence(state: &GameState) -> Vec<(String, Order)> {
    let mut queues: Vec<(String, VecDeque<Order>)> =
        state.players.iter().map(|p| (p.name.clone(), p.orders.clone())).collect();
    let mut sequence = Vec::new();
    loop {
        let mut drained = false;
        for (name, queue) in &mut queues {
            if let Some(order) = queue.pop_front() {
                sequence.push((name.clone(), order));
                drained = true;
            }
        }
        if !drained {
            return sequence;
        }
    }
}
