// ═══════════════════════════════════════════════════════════════════════
// Visibility / Information Model
//
// Information in a conquest game splits into:
//   PUBLIC  — visible to all players at all times
//   PRIVATE — known only to the owning player
//   HIDDEN  — unknown to all players (deck order)
//
// This module produces a "player view" of the game state that only
// contains information that player is legally allowed to know.
// Agents MUST only receive PlayerView, never the raw GameState.
// ═══════════════════════════════════════════════════════════════════════

use crate::bonus;
use crate::config::RuleSet;
use crate::error::Missing;
use crate::map::{Board, Territory};
use crate::objective::Objective;
use crate::types::*;
use serde::{Deserialize, Serialize};

// ── What is PUBLIC ─────────────────────────────────────────────────────
//
// • Board: owner and troop count of every territory, continents, borders
// • Every player's name, color, bonus troops and territory count
// • How many cards each player holds (not which)
// • Eliminations, turn order, phase, turn number
// • Trades completed so far, hence the value of the next trade
// • Cards left in the deck
//
// ── What is PRIVATE (per player) ───────────────────────────────────────
//
// • Your own territory cards
// • Your own objective
//
// ── What is HIDDEN (unknown to everyone) ───────────────────────────────
//
// • Order of the territory deck
// • Other players' objectives
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    // ── Public info ────────────────────────────────────────
    pub viewer: PlayerId,
    pub phase: Phase,
    pub turn_number: u32,
    pub current_player: PlayerId,
    pub turn_order: Vec<PlayerId>,
    pub board: Board,
    pub players: Vec<PublicPlayerInfo>,
    pub deck_remaining: usize,
    pub trades_completed: u32,
    /// Base troops the next tris would be worth.
    pub next_trade_value: u32,
    pub winner: Option<PlayerId>,

    // ── Private info (only for the viewer) ─────────────────
    pub my_cards: Vec<TerritoryCard>,
    pub my_objective: Objective,
    pub my_bonus_troops: u32,
}

/// Public information about a player (visible to all players).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
    pub kind: PlayerKind,
    pub bonus_troops: u32,
    pub cards_held: usize,
    pub territories: usize,
    pub eliminated: bool,
}

impl PlayerView {
    pub fn is_my_turn(&self) -> bool {
        self.current_player == self.viewer && self.winner.is_none()
    }

    pub fn my_territories(&self) -> impl Iterator<Item = &Territory> {
        self.board.territories_owned_by(self.viewer)
    }

    pub fn info(&self, id: PlayerId) -> Option<&PublicPlayerInfo> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// Build the PlayerView for `viewer`.
pub fn player_view(state: &GameState, rules: &RuleSet, viewer: PlayerId) -> Result<PlayerView, Missing> {
    let me = state.player(viewer).ok_or(Missing::Player(viewer))?;

    let players = state
        .players
        .iter()
        .map(|p| PublicPlayerInfo {
            id: p.id(),
            name: p.player.name.clone(),
            color: p.player.color,
            kind: p.player.kind,
            bonus_troops: p.bonus_troops,
            cards_held: p.cards.len(),
            territories: state.territory_count(p.id()),
            eliminated: p.is_eliminated(),
        })
        .collect();

    Ok(PlayerView {
        viewer,
        phase: state.phase(),
        turn_number: state.turn.turn_number,
        current_player: state.current_player(),
        turn_order: state.turn.order.clone(),
        board: state.board.clone(),
        players,
        deck_remaining: state.deck.len(),
        trades_completed: state.trades_completed,
        next_trade_value: bonus::trade_value(rules, state.trades_completed),
        winner: state.winner,
        my_cards: me.cards.clone(),
        my_objective: me.objective.clone(),
        my_bonus_troops: me.bonus_troops,
    })
}
