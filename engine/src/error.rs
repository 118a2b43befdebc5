// ═══════════════════════════════════════════════════════════════════════
// Engine errors — everything the core can refuse to do.
//
// Order validation failures are NOT errors: they become `Rejection`s and
// an `error` log line while the round carries on. These variants cover
// malformed input, phase violations and invalid maps.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::Phase;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The map failed connectivity or consistency checks.
    #[error("map is invalid: {0}")]
    MapInvalid(String),

    #[error("'{command}' is invalid for the {phase} phase")]
    InvalidForPhase { command: String, phase: Phase },

    /// Malformed command text, rejected before any order is built.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    #[error("unknown country '{0}'")]
    UnknownCountry(String),

    #[error("unknown continent '{0}'")]
    UnknownContinent(String),

    #[error("unknown player '{0}'")]
    UnknownPlayer(String),

    #[error("name '{0}' is already in use")]
    DuplicateName(String),

    #[error("at least 2 players are required, got {0}")]
    NotEnoughPlayers(usize),

    #[error("it is not {0}'s turn to issue orders")]
    NotPending(String),
}
