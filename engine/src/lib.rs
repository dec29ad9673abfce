pub mod types;
pub mod map;
pub mod error;
pub mod config;
pub mod cards;
pub mod objective;
pub mod bonus;
pub mod combat;
pub mod setup;
pub mod events;
pub mod engine;
pub mod visibility;

mod tests;

pub use types::*;
pub use error::{EngineError, Missing, Rejection};
pub use config::{ConfigError, GameConfig, PlayerConfig, RuleSet};
pub use combat::{DiceRoller, ScriptedDice, SeededDice};
pub use engine::{Engine, GameAction};
pub use events::GameEvent;
pub use objective::Objective;
pub use visibility::{player_view, PlayerView};
