// ═══════════════════════════════════════════════════════════════════════
// Core types — cards, phases, players and the game state
// ═══════════════════════════════════════════════════════════════════════

use crate::log::{LogEntry, LogTag};
use crate::map::{ContinentId, CountryId, MapGraph};
use crate::orders::Order;
use crate::rules::Rules;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Name of the sink player that receives blockaded territory.
pub const NEUTRAL: &str = "Neutral";

// ── Enums ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum Card {
    Bomb,
    Blockade,
    Airlift,
    Negotiate,
}

impl Card {
    pub const ALL: [Card; 4] = [Card::Bomb, Card::Blockade, Card::Airlift, Card::Negotiate];
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Card::Bomb => write!(f, "bomb"),
            Card::Blockade => write!(f, "blockade"),
            Card::Airlift => write!(f, "airlift"),
            Card::Negotiate => write!(f, "negotiate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Startup,
    IssueOrder,
    OrderExecution,
    End,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Startup => write!(f, "Startup"),
            Phase::IssueOrder => write!(f, "IssueOrder"),
            Phase::OrderExecution => write!(f, "OrderExecution"),
            Phase::End => write!(f, "End"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    Human,
    Random,
    Aggressive,
    Benevolent,
    Cheater,
    /// Only ever used by the Neutral sink player.
    Neutral,
}

impl StrategyKind {
    /// Strategies a tournament may field (everything but Human and Neutral).
    pub const COMPUTER: [StrategyKind; 4] = [
        StrategyKind::Random,
        StrategyKind::Aggressive,
        StrategyKind::Benevolent,
        StrategyKind::Cheater,
    ];
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Human => write!(f, "Human"),
            StrategyKind::Random => write!(f, "Random"),
            StrategyKind::Aggressive => write!(f, "Aggressive"),
            StrategyKind::Benevolent => write!(f, "Benevolent"),
            StrategyKind::Cheater => write!(f, "Cheater"),
            StrategyKind::Neutral => write!(f, "Neutral"),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(StrategyKind::Human),
            "random" => Ok(StrategyKind::Random),
            "aggressive" => Ok(StrategyKind::Aggressive),
            "benevolent" => Ok(StrategyKind::Benevolent),
            "cheater" => Ok(StrategyKind::Cheater),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

// ── Pending decision ───────────────────────────────────────────────────

/// What the engine is waiting on. The driver asks the named player's
/// strategy and feeds the answer back through `engine::apply_action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingDecision {
    IssueOrder { player: String },
}

impl PendingDecision {
    pub fn player(&self) -> &str {
        match self {
            PendingDecision::IssueOrder { player } => player,
        }
    }
}

// ── Player ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub strategy: StrategyKind,
    pub countries: BTreeSet<CountryId>,
    /// Derived: continents whose every member is in `countries`.
    pub continents: BTreeSet<ContinentId>,
    /// Unallocated army pool.
    pub reinforcements: u32,
    pub cards: Vec<Card>,
    pub truces: BTreeSet<String>,
    pub orders: VecDeque<Order>,
    pub eliminated: bool,
    pub conquered_this_round: bool,
    pub orders_issued: u32,
    /// Finished issuing orders for the current round.
    pub done: bool,
}

impl Player {
    pub fn new(name: impl Into<String>, strategy: StrategyKind) -> Self {
        Player {
            name: name.into(),
            strategy,
            countries: BTreeSet::new(),
            continents: BTreeSet::new(),
            reinforcements: 0,
            cards: Vec::new(),
            truces: BTreeSet::new(),
            orders: VecDeque::new(),
            eliminated: false,
            conquered_this_round: false,
            orders_issued: 0,
            done: false,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.strategy == StrategyKind::Neutral
    }

    /// Competing and still in the game.
    pub fn is_active(&self) -> bool {
        !self.eliminated && !self.is_neutral()
    }

    pub fn has_card(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// Remove one copy of `card`. Returns false if none was held.
    pub fn take_card(&mut self, card: Card) -> bool {
        match self.cards.iter().position(|&c| c == card) {
            Some(pos) => {
                self.cards.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn has_truce_with(&self, other: &str) -> bool {
        self.truces.contains(other)
    }

    /// Armies already committed by queued Deploy orders.
    pub fn queued_deploys(&self) -> u32 {
        self.orders
            .iter()
            .map(|o| match o {
                Order::Deploy { armies, .. } => *armies,
                _ => 0,
            })
            .sum()
    }

    /// Pool armies not yet promised to a queued Deploy.
    pub fn undeployed(&self) -> u32 {
        self.reinforcements.saturating_sub(self.queued_deploys())
    }
}

// ── Game State ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub round: u32,
    pub phase: Phase,
    pub map: MapGraph,
    /// Turn order. The Neutral player, once created, is appended last.
    pub players: Vec<Player>,
    /// Round-robin pointer for order issuing.
    pub issue_index: usize,
    pub pending: Option<PendingDecision>,
    pub winner: Option<String>,
    pub rules: Rules,
    pub log: Vec<LogEntry>,

    // Deterministic RNG
    pub seed: u64,
    pub rng_counter: u64,
}

impl GameState {
    /// A fresh game in the Startup phase with no players yet.
    pub fn new(map: MapGraph, rules: Rules, seed: u64) -> Self {
        GameState {
            round: 0,
            phase: Phase::Startup,
            map,
            players: Vec::new(),
            issue_index: 0,
            pending: None,
            winner: None,
            rules,
            log: Vec::new(),
            seed,
            rng_counter: 0,
        }
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.name == name)
    }

    pub fn neutral(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_neutral())
    }

    /// Names of competing, non-eliminated players in turn order.
    pub fn active_players(&self) -> Vec<String> {
        self.players.iter().filter(|p| p.is_active()).map(|p| p.name.clone()).collect()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.player(name).is_some_and(|p| p.is_active())
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::End
    }

    /// Fresh RNG derived from the game seed; every call yields a new stream.
    pub fn rng(&mut self) -> ChaCha8Rng {
        self.rng_counter += 1;
        ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(self.rng_counter.wrapping_mul(999_961)))
    }

    /// Append to the game log and mirror to tracing.
    pub fn record(&mut self, tag: LogTag, text: impl Into<String>) {
        let entry = LogEntry::new(tag, self.round, text);
        entry.emit();
        self.log.push(entry);
    }

    pub fn push_log(&mut self, entry: LogEntry) {
        entry.emit();
        self.log.push(entry);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
