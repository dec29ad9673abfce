// ═══════════════════════════════════════════════════════════════════════
// Failure taxonomy for `Engine::process_action`
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{Phase, PlayerId};
use thiserror::Error;

/// Everything `process_action` can return instead of a new state.
/// Rejections leave the state untouched; `GameOver` follows the committed
/// winning `EndTurn` and every call after it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A rule precondition was violated. The caller may resubmit.
    #[error("invalid action: {0}")]
    InvalidAction(#[from] Rejection),

    /// The action names an unknown player or territory.
    #[error("not found: {0}")]
    NotFound(#[from] Missing),

    /// Terminal signal: an objective has been completed.
    #[error("game over: {winner} has won")]
    GameOver { winner: PlayerId },
}

/// The exact precondition an action failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("troop count must be positive")]
    NonPositiveTroops,

    #[error("{player} has {available} bonus troops, needs {requested}")]
    InsufficientBonus {
        player: PlayerId,
        available: u32,
        requested: u32,
    },

    #[error("{player} does not own '{territory}'")]
    NotOwner { player: PlayerId, territory: String },

    #[error("'{from}' is not adjacent to '{to}'")]
    NotAdjacent { from: String, to: String },

    #[error("'{territory}' has {available} troops, cannot commit {requested}")]
    InsufficientTroops {
        territory: String,
        available: u32,
        requested: u32,
    },

    #[error("'{0}' already belongs to the attacker")]
    OwnTerritory(String),

    #[error("'{territory}' is not owned by {claimed}")]
    DefenderMismatch { territory: String, claimed: PlayerId },

    #[error("a trade needs exactly 3 distinct cards, got {0}")]
    WrongCardCount(usize),

    #[error("{player} does not hold the card for '{territory}'")]
    CardNotHeld { player: PlayerId, territory: String },

    #[error("cards do not form a valid set")]
    InvalidTris,

    #[error("action not allowed during {0:?} phase")]
    WrongPhase(Phase),

    #[error("it is {current}'s turn, not {player}'s")]
    NotYourTurn { player: PlayerId, current: PlayerId },

    #[error("{0} has been eliminated")]
    PlayerEliminated(PlayerId),
}

/// What an action referenced that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Missing {
    #[error("player {0}")]
    Player(PlayerId),

    #[error("territory '{0}'")]
    Territory(String),

    #[error("continent '{0}'")]
    Continent(String),
}

impl EngineError {
    /// Rejections and lookups never touch the state; only game over ends play.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineError::GameOver { .. })
    }
}
