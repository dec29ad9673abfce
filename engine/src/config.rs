// ═══════════════════════════════════════════════════════════════════════
// Game configuration — seats, seed and rule variants
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{Color, PlayerKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("player count must be 2-6, got {0}")]
    PlayerCount(usize),

    #[error("color {0} is used by more than one player")]
    DuplicateColor(Color),

    #[error("trade bonus table must not be empty")]
    EmptyTradeTable,

    #[error("trade bonus table must be non-decreasing")]
    DecreasingTradeTable,

    #[error("board: {0}")]
    Board(#[from] crate::map::BoardError),

    #[error("board lookup failed: {0}")]
    Lookup(#[from] crate::error::Missing),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub color: Color,
    pub kind: PlayerKind,
}

/// Tunable rules. Defaults follow the classic table-top game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Troops granted by the 1st, 2nd, ... card trade of the game.
    pub trade_bonus_table: Vec<u32>,
    /// Added per trade once the table is exhausted.
    pub trade_bonus_step: u32,
    /// Extra troops placed on each traded card's territory the trader owns.
    pub territory_trade_bonus: u32,
    /// Reject actions issued by anyone but the current player.
    pub enforce_turn_order: bool,
    /// Replaces the per-player-count initial army table.
    pub initial_troops: Option<u32>,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            trade_bonus_table: vec![4, 6, 8, 10, 12, 15],
            trade_bonus_step: 5,
            territory_trade_bonus: 2,
            enforce_turn_order: false,
            initial_troops: None,
        }
    }
}

impl RuleSet {
    /// Armies each player starts with, before any are placed.
    pub fn initial_troops(&self, player_count: usize) -> u32 {
        if let Some(n) = self.initial_troops {
            return n;
        }
        match player_count {
            2 => 40,
            3 => 35,
            4 => 30,
            5 => 25,
            _ => 20,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trade_bonus_table.is_empty() {
            return Err(ConfigError::EmptyTradeTable);
        }
        if self.trade_bonus_table.windows(2).any(|w| w[1] < w[0]) {
            return Err(ConfigError::DecreasingTradeTable);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub players: Vec<PlayerConfig>,
    pub seed: u64,
    #[serde(default)]
    pub rules: RuleSet,
}

impl GameConfig {
    /// `count` bot seats named after their color.
    pub fn with_players(count: usize, seed: u64) -> Self {
        let players = Color::ALL
            .iter()
            .take(count)
            .map(|&color| PlayerConfig {
                name: color.to_string(),
                color,
                kind: PlayerKind::Bot,
            })
            .collect();
        GameConfig {
            players,
            seed,
            rules: RuleSet::default(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
            return Err(ConfigError::PlayerCount(n));
        }
        for (i, p) in self.players.iter().enumerate() {
            if self.players[..i].iter().any(|q| q.color == p.color) {
                return Err(ConfigError::DuplicateColor(p.color));
            }
        }
        self.rules.validate()
    }
}
