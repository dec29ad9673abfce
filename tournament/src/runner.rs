// ═══════════════════════════════════════════════════════════════════════
// Game Runner — runs a complete headless game with agents
// ═══════════════════════════════════════════════════════════════════════

use conquest_agents::{Agent, GreedyAgent, RandomAgent};
use conquest_engine::config::{ConfigError, GameConfig};
use conquest_engine::engine::{Engine, GameAction};
use conquest_engine::error::EngineError;
use conquest_engine::types::*;
use conquest_engine::visibility::player_view;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid game configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("expected {expected} agents, got {got}")]
    AgentCount { expected: usize, got: usize },

    #[error("agent in seat {seat} plays as {claimed}")]
    SeatMismatch { seat: PlayerId, claimed: PlayerId },

    #[error("game exceeded {0} actions without finishing")]
    ActionLimit(usize),

    #[error("engine refused a forced end of turn: {0}")]
    Stuck(EngineError),

    #[error("unknown agent kind '{0}' (expected random or greedy)")]
    UnknownAgent(String),
}

/// Result of a completed game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResult {
    pub seed: u64,
    pub winner: PlayerId,
    pub winner_agent: String,
    pub turns: u32,
    pub actions: usize,
    /// Agent actions the engine refused.
    pub rejected_actions: usize,
    pub player_results: Vec<PlayerResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResult {
    pub player: PlayerId,
    pub agent_name: String,
    pub territories: usize,
    pub troops: u32,
    pub cards: usize,
    pub eliminated_by: Option<PlayerId>,
    pub objective: String,
}

// ── Agent selection ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    Random,
    Greedy,
}

impl AgentKind {
    pub fn build(self, player: PlayerId, seed: u64) -> Box<dyn Agent> {
        match self {
            AgentKind::Random => Box::new(RandomAgent::new(player, seed)),
            AgentKind::Greedy => Box::new(GreedyAgent::new(player)),
        }
    }
}

impl FromStr for AgentKind {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(AgentKind::Random),
            "greedy" => Ok(AgentKind::Greedy),
            _ => Err(RunError::UnknownAgent(s.to_string())),
        }
    }
}

/// One agent per seat, cycling through `kinds`.
pub fn make_agents(kinds: &[AgentKind], players: usize, seed: u64) -> Vec<Box<dyn Agent>> {
    (0..players)
        .map(|i| {
            let kind = kinds.get(i % kinds.len().max(1)).copied().unwrap_or(AgentKind::Random);
            kind.build(PlayerId(i as u8), seed.wrapping_add(i as u64))
        })
        .collect()
}

// ── Driving a game ─────────────────────────────────────────────────────

/// Run a complete game with the given agents. `agents[i]` plays seat i.
/// A rejected agent action is counted and answered by ending that
/// agent's turn, so a confused agent cannot stall the game.
pub fn run_game(
    agents: &mut [Box<dyn Agent>],
    config: &GameConfig,
    max_actions: usize, // safety limit to prevent infinite loops
) -> Result<GameResult, RunError> {
    let mut engine = Engine::new(config)?;

    let expected = engine.game_state().players.len();
    if agents.len() != expected {
        return Err(RunError::AgentCount { expected, got: agents.len() });
    }
    for (i, agent) in agents.iter().enumerate() {
        let seat = PlayerId(i as u8);
        if agent.player() != seat {
            return Err(RunError::SeatMismatch { seat, claimed: agent.player() });
        }
    }

    let mut actions = 0;
    let mut rejected = 0;
    while actions < max_actions {
        let current = engine.game_state().current_player();
        let view = player_view(engine.game_state(), engine.rules(), current)
            .map_err(|e| RunError::Stuck(e.into()))?;
        let agent = &mut agents[current.0 as usize];
        let action = agent.decide(&view);
        actions += 1;

        let outcome = match engine.process_action(action) {
            Err(e) if !e.is_terminal() => {
                rejected += 1;
                warn!(agent = agent.name(), player = %current, error = %e, "action rejected, ending turn");
                engine.process_action(GameAction::EndTurn)
            }
            other => other,
        };

        match outcome {
            Ok(_) => {}
            Err(EngineError::GameOver { winner }) => {
                let result = build_result(&engine, agents, config.seed, winner, actions, rejected);
                info!(
                    seed = config.seed,
                    winner = %winner,
                    agent = %result.winner_agent,
                    turns = result.turns,
                    "game finished"
                );
                return Ok(result);
            }
            Err(e) => return Err(RunError::Stuck(e)),
        }
    }

    debug!(seed = config.seed, turn = engine.game_state().turn.turn_number, "action limit reached");
    Err(RunError::ActionLimit(max_actions))
}

fn build_result(
    engine: &Engine,
    agents: &[Box<dyn Agent>],
    seed: u64,
    winner: PlayerId,
    actions: usize,
    rejected_actions: usize,
) -> GameResult {
    let state = engine.game_state();
    let agent_name = |id: PlayerId| {
        agents
            .get(id.0 as usize)
            .map(|a| a.name().to_string())
            .unwrap_or_default()
    };

    let player_results = state
        .players
        .iter()
        .map(|p| PlayerResult {
            player: p.id(),
            agent_name: agent_name(p.id()),
            territories: state.territory_count(p.id()),
            troops: state.board.territories_owned_by(p.id()).map(|t| t.troops).sum(),
            cards: p.cards.len(),
            eliminated_by: p.eliminated_by,
            objective: p.objective.to_string(),
        })
        .collect();

    GameResult {
        seed,
        winner,
        winner_agent: agent_name(winner),
        turns: state.turn.turn_number,
        actions,
        rejected_actions,
        player_results,
    }
}

/// Play one game per seed in parallel. Seats are filled from `kinds`;
/// each game reuses `config` with its seed replaced.
pub fn run_many(
    config: &GameConfig,
    seeds: &[u64],
    kinds: &[AgentKind],
    max_actions: usize,
) -> Vec<(u64, Result<GameResult, RunError>)> {
    seeds
        .par_iter()
        .map(|&seed| {
            let config = GameConfig { seed, ..config.clone() };
            let mut agents = make_agents(kinds, config.players.len(), seed);
            (seed, run_game(&mut agents, &config, max_actions))
        })
        .collect()
}
