// ═══════════════════════════════════════════════════════════════════════
// Core types — players, cards, turn bookkeeping and the game snapshot
// ═══════════════════════════════════════════════════════════════════════

use crate::map::Board;
use crate::objective::Objective;
use serde::{Deserialize, Serialize};

// ── Identity ───────────────────────────────────────────────────────────

/// Compact, copyable player identifier. Stable for the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerKind {
    Human,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Black,
    Purple,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Black,
        Color::Purple,
    ];
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Red => write!(f, "Red"),
            Color::Blue => write!(f, "Blue"),
            Color::Green => write!(f, "Green"),
            Color::Yellow => write!(f, "Yellow"),
            Color::Black => write!(f, "Black"),
            Color::Purple => write!(f, "Purple"),
        }
    }
}

/// Immutable identity of a seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
    pub kind: PlayerKind,
}

// ── Territory cards ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Infantry,
    Cavalry,
    Artillery,
}

impl Symbol {
    pub const ALL: [Symbol; 3] = [Symbol::Infantry, Symbol::Cavalry, Symbol::Artillery];
}

/// A territory card. The territory name doubles as the card identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerritoryCard {
    pub territory: String,
    pub symbol: Symbol,
}

// ── Per-player state ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub player: Player,
    /// Troops waiting to be placed with `PlaceTroops`.
    pub bonus_troops: u32,
    /// Held territory cards (PRIVATE).
    pub cards: Vec<TerritoryCard>,
    /// Secret win condition (PRIVATE).
    pub objective: Objective,
    /// Set once the player has lost their last territory.
    pub eliminated_by: Option<PlayerId>,
}

impl PlayerState {
    pub fn new(player: Player, bonus_troops: u32, objective: Objective) -> Self {
        PlayerState {
            player,
            bonus_troops,
            cards: Vec::new(),
            objective,
            eliminated_by: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.player.id
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated_by.is_some()
    }

    pub fn card(&self, territory: &str) -> Option<&TerritoryCard> {
        self.cards.iter().find(|c| c.territory == territory)
    }
}

// ── Turn bookkeeping ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Initial troop placement. Only `PlaceTroops` and `EndTurn` are legal.
    Setup,
    /// Regular play: reinforcement, attacks and fortification.
    Main,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnManager {
    pub order: Vec<PlayerId>,
    pub current: usize,
    pub phase: Phase,
    /// Counts main-phase turns, starting at 1 once setup completes.
    pub turn_number: u32,
}

impl TurnManager {
    pub fn new(order: Vec<PlayerId>) -> Self {
        TurnManager {
            order,
            current: 0,
            phase: Phase::Setup,
            turn_number: 0,
        }
    }

    pub fn current_player(&self) -> PlayerId {
        self.order[self.current]
    }

    /// Move to the next seat for which `skip` returns false. Wraps around.
    /// If every seat is skipped the index stays where it was.
    pub fn advance(&mut self, skip: impl Fn(PlayerId) -> bool) {
        let n = self.order.len();
        for step in 1..=n {
            let idx = (self.current + step) % n;
            if !skip(self.order[idx]) {
                self.current = idx;
                return;
            }
        }
    }
}

// ── Game State ─────────────────────────────────────────────────────────

/// Full snapshot of a game. Replaced wholesale by the engine after every
/// accepted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    /// Ordered per-player records. Order matches `turn.order` at setup.
    pub players: Vec<PlayerState>,
    pub turn: TurnManager,
    /// Territory card supply; the last element is the top of the deck.
    pub deck: Vec<TerritoryCard>,
    /// Number of card sets traded so far by anyone.
    pub trades_completed: u32,
    /// Winner (if game over).
    pub winner: Option<PlayerId>,
}

impl GameState {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id() == id)
    }

    pub fn phase(&self) -> Phase {
        self.turn.phase
    }

    pub fn current_player(&self) -> PlayerId {
        self.turn.current_player()
    }

    /// Players still holding at least one territory.
    pub fn active_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.iter().filter(|p| !p.is_eliminated())
    }

    pub fn territory_count(&self, id: PlayerId) -> usize {
        self.board.territories_owned_by(id).count()
    }
}
