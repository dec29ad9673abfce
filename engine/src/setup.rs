// ═══════════════════════════════════════════════════════════════════════
// Game setup — creates the initial GameState for N players
// ═══════════════════════════════════════════════════════════════════════

use crate::cards;
use crate::config::{ConfigError, GameConfig};
use crate::map::{self, Board};
use crate::objective::{deal_objectives, objective_deck};
use crate::types::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Initial state on the classic world map.
pub fn create_initial_state(config: &GameConfig) -> Result<GameState, ConfigError> {
    create_initial_state_on(config, map::world_board())
}

/// Create the initial state on `board`.
///
/// Territories are shuffled and dealt round-robin with one troop each;
/// every player's remaining initial armies become bonus troops to place
/// during the setup phase. The seed controls the deal, the objective
/// cards and the territory deck order.
pub fn create_initial_state_on(config: &GameConfig, board: Board) -> Result<GameState, ConfigError> {
    config.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let seats: Vec<PlayerId> = (0..config.players.len()).map(|i| PlayerId(i as u8)).collect();

    // Deal territories
    let mut names: Vec<String> = board.territory_names().map(str::to_string).collect();
    names.shuffle(&mut rng);
    let updates: Vec<map::Territory> = names
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            let mut t = board.territory(name).ok()?.clone();
            t.owner = Some(seats[i % seats.len()]);
            t.troops = 1;
            Some(t)
        })
        .collect();
    let board = board.with_territories(updates)?;

    // Objectives
    let objectives = deal_objectives(objective_deck(&board, &seats), &seats, &board, &mut rng);

    let initial = config.rules.initial_troops(seats.len());
    let players: Vec<PlayerState> = config
        .players
        .iter()
        .zip(seats.iter())
        .zip(objectives)
        .map(|((pc, &id), objective)| {
            let owned = board.territories_owned_by(id).count() as u32;
            let player = Player {
                id,
                name: pc.name.clone(),
                color: pc.color,
                kind: pc.kind,
            };
            PlayerState::new(player, initial.saturating_sub(owned), objective)
        })
        .collect();

    let mut deck = cards::territory_deck(&board);
    deck.shuffle(&mut rng);

    debug!(
        players = players.len(),
        territories = board.len(),
        seed = config.seed,
        "created initial state"
    );

    Ok(GameState {
        board,
        players,
        turn: TurnManager::new(seats),
        deck,
        trades_completed: 0,
        winner: None,
    })
}
