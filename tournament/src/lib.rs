pub mod runner;
pub mod database;

pub use runner::{make_agents, run_game, run_many, AgentKind, GameResult, PlayerResult, RunError};
pub use database::{Database, DbError, LeaderboardEntry};
