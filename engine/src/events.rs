// ═══════════════════════════════════════════════════════════════════════
// Game events — what happened during an accepted action
//
// The engine records these alongside each new state. They carry exactly
// the data a transport layer needs for its notifications (battle dice,
// trade bonuses, turn changes, the winner); encoding them is the
// caller's business.
// ═══════════════════════════════════════════════════════════════════════

use crate::combat::BattleReport;
use crate::types::{Phase, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TroopsPlaced {
        player: PlayerId,
        territory: String,
        troops: u32,
    },
    TroopsMoved {
        player: PlayerId,
        from: String,
        to: String,
        troops: u32,
    },
    Battle {
        attacker: PlayerId,
        defender: PlayerId,
        from: String,
        to: String,
        report: BattleReport,
    },
    TerritoryConquered {
        player: PlayerId,
        territory: String,
        from: PlayerId,
        troops_moved: u32,
    },
    PlayerEliminated {
        player: PlayerId,
        by: PlayerId,
        cards_taken: usize,
    },
    CardsTraded {
        player: PlayerId,
        cards: Vec<String>,
        bonus: u32,
        territory_bonuses: Vec<(String, u32)>,
    },
    CardDrawn {
        player: PlayerId,
    },
    PhaseChanged {
        phase: Phase,
    },
    TurnStarted {
        player: PlayerId,
        turn_number: u32,
        bonus_troops: u32,
    },
    GameOver {
        winner: PlayerId,
    },
}
