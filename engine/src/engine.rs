// ═══════════════════════════════════════════════════════════════════════
// Game Engine — the action processor
//
// Architecture:
//   The engine owns the single authoritative GameState. Every call to
//   `process_action` works on a private copy; only if the action passes
//   every precondition is the copy swapped in. Rejected actions leave
//   the authoritative state untouched.
//
// Flow:
//   1. Caller submits one GameAction
//   2. Engine validates phase / ownership / adjacency / troop counts
//   3. Combat and bonus math are delegated to `combat` and `bonus`
//   4. New state is committed and returned, or a classified error is
//      raised (EndTurn may raise GameOver once an objective is met)
// ═══════════════════════════════════════════════════════════════════════

use crate::bonus;
use crate::cards::is_tris;
use crate::combat::{self, DiceRoller, SeededDice};
use crate::config::{ConfigError, GameConfig, RuleSet};
use crate::error::{EngineError, Missing, Rejection};
use crate::events::GameEvent;
use crate::map::{self, Board, Territory};
use crate::setup;
use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Everything a player can ask the engine to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Spend bonus troops on an owned territory.
    PlaceTroops {
        player: PlayerId,
        troops: u32,
        territory: String,
    },

    /// Move troops between two adjacent owned territories.
    Reinforce {
        player: PlayerId,
        from: String,
        to: String,
        troops: u32,
    },

    /// Attack `to` (owned by `defender`) from `from`, committing `troops`.
    Attack {
        player: PlayerId,
        defender: PlayerId,
        from: String,
        to: String,
        troops: u32,
    },

    /// Trade three territory cards, identified by territory name.
    TradeCards { player: PlayerId, cards: Vec<String> },

    /// End the current player's turn.
    EndTurn,
}

impl GameAction {
    /// The issuing player, if the action names one.
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            GameAction::PlaceTroops { player, .. }
            | GameAction::Reinforce { player, .. }
            | GameAction::Attack { player, .. }
            | GameAction::TradeCards { player, .. } => Some(*player),
            GameAction::EndTurn => None,
        }
    }
}

/// Seed offset so dice do not replay the setup shuffle stream.
const DICE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// The action processor. Owns the authoritative state plus the
/// per-turn scratch flag, which is never part of the snapshot.
#[derive(Debug)]
pub struct Engine<D = SeededDice> {
    state: GameState,
    rules: RuleSet,
    dice: D,
    territory_conquered_this_turn: bool,
    events: Vec<GameEvent>,
}

impl Engine<SeededDice> {
    /// New game on the classic world map.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Self::with_board(config, map::world_board())
    }

    /// New game on a custom board.
    pub fn with_board(config: &GameConfig, board: Board) -> Result<Self, ConfigError> {
        let state = setup::create_initial_state_on(config, board)?;
        let dice = SeededDice::new(config.seed ^ DICE_STREAM);
        Ok(Engine::from_state(state, config.rules.clone(), dice))
    }
}

impl<D: DiceRoller> Engine<D> {
    pub fn from_state(state: GameState, rules: RuleSet, dice: D) -> Self {
        Engine {
            state,
            rules,
            dice,
            territory_conquered_this_turn: false,
            events: Vec::new(),
        }
    }

    /// Read-only view of the authoritative snapshot.
    pub fn game_state(&self) -> &GameState {
        &self.state
    }

    /// Replace the authoritative snapshot wholesale. Meant for recovery,
    /// replays and tests; the scratch flag starts fresh.
    pub fn set_game_state(&mut self, state: GameState) {
        self.state = state;
        self.territory_conquered_this_turn = false;
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.state.winner
    }

    pub fn territory_conquered_this_turn(&self) -> bool {
        self.territory_conquered_this_turn
    }

    /// Events recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Validate and apply one action.
    pub fn process_action(&mut self, action: GameAction) -> Result<GameState, EngineError> {
        if let Some(winner) = self.state.winner {
            return Err(EngineError::GameOver { winner });
        }

        if self.rules.enforce_turn_order {
            let current = self.state.current_player();
            if let Some(player) = action.player().filter(|&p| p != current) {
                return Err(Rejection::NotYourTurn { player, current }.into());
            }
        }

        let mut tx = Transition {
            state: self.state.clone(),
            rules: &self.rules,
            conquered: self.territory_conquered_this_turn,
            events: Vec::new(),
        };

        let result = match action {
            GameAction::PlaceTroops { player, troops, territory } => {
                tx.place_troops(player, troops, &territory)
            }
            GameAction::Reinforce { player, from, to, troops } => {
                tx.reinforce(player, &from, &to, troops)
            }
            GameAction::Attack { player, defender, from, to, troops } => {
                tx.attack(&mut self.dice, player, defender, &from, &to, troops)
            }
            GameAction::TradeCards { player, cards } => tx.trade_cards(player, &cards),
            GameAction::EndTurn => tx.end_turn(),
        };
        if let Err(e) = result {
            debug!(error = %e, "action rejected");
            return Err(e);
        }

        let Transition { state, conquered, events, .. } = tx;
        self.state = state;
        self.territory_conquered_this_turn = conquered;
        self.events.extend(events);

        match self.state.winner {
            Some(winner) => Err(EngineError::GameOver { winner }),
            None => Ok(self.state.clone()),
        }
    }
}

// ── Transition ─────────────────────────────────────────────────────────
// A working copy of the state for one action. Dropped on rejection.

struct Transition<'r> {
    state: GameState,
    rules: &'r RuleSet,
    conquered: bool,
    events: Vec<GameEvent>,
}

impl Transition<'_> {
    fn require_phase(&self, phase: Phase) -> Result<(), EngineError> {
        if self.state.phase() == phase {
            Ok(())
        } else {
            Err(Rejection::WrongPhase(self.state.phase()).into())
        }
    }

    /// The acting player's record; eliminated players cannot act.
    fn actor(&self, player: PlayerId) -> Result<&PlayerState, EngineError> {
        let ps = self.state.player(player).ok_or(Missing::Player(player))?;
        if ps.is_eliminated() {
            return Err(Rejection::PlayerEliminated(player).into());
        }
        Ok(ps)
    }

    fn actor_mut(&mut self, player: PlayerId) -> Result<&mut PlayerState, EngineError> {
        Ok(self
            .state
            .player_mut(player)
            .ok_or(Missing::Player(player))?)
    }

    fn owned_territory(&self, player: PlayerId, name: &str) -> Result<Territory, EngineError> {
        let t = self.state.board.territory(name)?;
        if !t.is_owned_by(player) {
            return Err(Rejection::NotOwner {
                player,
                territory: name.to_string(),
            }
            .into());
        }
        Ok(t.clone())
    }

    fn require_adjacent(&self, from: &Territory, to: &Territory) -> Result<(), EngineError> {
        if from.borders(&to.name) {
            Ok(())
        } else {
            Err(Rejection::NotAdjacent {
                from: from.name.clone(),
                to: to.name.clone(),
            }
            .into())
        }
    }

    // ── PlaceTroops ────────────────────────────────────────────────────

    fn place_troops(&mut self, player: PlayerId, troops: u32, territory: &str) -> Result<(), EngineError> {
        let available = self.actor(player)?.bonus_troops;
        if troops == 0 {
            return Err(Rejection::NonPositiveTroops.into());
        }
        let mut target = self.owned_territory(player, territory)?;
        if available < troops {
            return Err(Rejection::InsufficientBonus {
                player,
                available,
                requested: troops,
            }
            .into());
        }

        target.troops += troops;
        self.state.board = self.state.board.with_territories([target])?;
        self.actor_mut(player)?.bonus_troops -= troops;

        debug!(%player, territory, troops, "troops placed");
        self.events.push(GameEvent::TroopsPlaced {
            player,
            territory: territory.to_string(),
            troops,
        });
        Ok(())
    }

    // ── Reinforce ──────────────────────────────────────────────────────

    fn reinforce(&mut self, player: PlayerId, from: &str, to: &str, troops: u32) -> Result<(), EngineError> {
        self.require_phase(Phase::Main)?;
        self.actor(player)?;
        if troops == 0 {
            return Err(Rejection::NonPositiveTroops.into());
        }
        let mut source = self.owned_territory(player, from)?;
        let mut dest = self.owned_territory(player, to)?;
        self.require_adjacent(&source, &dest)?;
        if source.troops <= troops {
            return Err(Rejection::InsufficientTroops {
                territory: source.name,
                available: source.troops,
                requested: troops,
            }
            .into());
        }

        source.troops -= troops;
        dest.troops += troops;
        self.state.board = self.state.board.with_territories([source, dest])?;

        debug!(%player, from, to, troops, "troops moved");
        self.events.push(GameEvent::TroopsMoved {
            player,
            from: from.to_string(),
            to: to.to_string(),
            troops,
        });
        Ok(())
    }

    // ── Attack ─────────────────────────────────────────────────────────

    fn attack(
        &mut self,
        dice: &mut impl DiceRoller,
        player: PlayerId,
        defender: PlayerId,
        from: &str,
        to: &str,
        troops: u32,
    ) -> Result<(), EngineError> {
        self.require_phase(Phase::Main)?;
        self.actor(player)?;
        self.state.player(defender).ok_or(Missing::Player(defender))?;
        if troops == 0 {
            return Err(Rejection::NonPositiveTroops.into());
        }
        let mut source = self.owned_territory(player, from)?;
        let mut target = self.state.board.territory(to)?.clone();
        if target.is_owned_by(player) {
            return Err(Rejection::OwnTerritory(target.name).into());
        }
        if !target.is_owned_by(defender) {
            return Err(Rejection::DefenderMismatch {
                territory: target.name,
                claimed: defender,
            }
            .into());
        }
        self.require_adjacent(&source, &target)?;
        if troops >= source.troops {
            return Err(Rejection::InsufficientTroops {
                territory: source.name,
                available: source.troops,
                requested: troops,
            }
            .into());
        }

        let report = combat::resolve_battle(dice, troops, target.troops);
        source.troops -= report.attacker_losses;
        target.troops -= report.defender_losses;
        debug!(
            attacker = %player, %defender, from, to,
            attacker_dice = ?report.attacker_dice,
            defender_dice = ?report.defender_dice,
            "battle"
        );

        let conquered = report.conquered;
        let survivors = troops - report.attacker_losses;
        self.events.push(GameEvent::Battle {
            attacker: player,
            defender,
            from: from.to_string(),
            to: to.to_string(),
            report,
        });

        if conquered {
            // Surviving committed troops move in; the source keeps the rest.
            source.troops -= survivors;
            target.owner = Some(player);
            target.troops = survivors;
            // Only the current player's conquests earn the end-of-turn card.
            if player == self.state.current_player() {
                self.conquered = true;
            }
            info!(%player, territory = to, from = %defender, troops = survivors, "territory conquered");
            self.events.push(GameEvent::TerritoryConquered {
                player,
                territory: to.to_string(),
                from: defender,
                troops_moved: survivors,
            });
        }
        self.state.board = self.state.board.with_territories([source, target])?;

        if conquered && self.state.territory_count(defender) == 0 {
            self.eliminate(defender, player)?;
        }
        Ok(())
    }

    /// `loser` holds no territory any more: record it and hand their cards
    /// to `winner`.
    fn eliminate(&mut self, loser: PlayerId, winner: PlayerId) -> Result<(), EngineError> {
        let loser_state = self.actor_mut(loser)?;
        loser_state.eliminated_by = Some(winner);
        loser_state.bonus_troops = 0;
        let cards = std::mem::take(&mut loser_state.cards);
        let cards_taken = cards.len();
        self.actor_mut(winner)?.cards.extend(cards);

        info!(player = %loser, by = %winner, cards_taken, "player eliminated");
        self.events.push(GameEvent::PlayerEliminated {
            player: loser,
            by: winner,
            cards_taken,
        });
        Ok(())
    }

    // ── TradeCards ─────────────────────────────────────────────────────

    fn trade_cards(&mut self, player: PlayerId, names: &[String]) -> Result<(), EngineError> {
        self.require_phase(Phase::Main)?;
        let actor = self.actor(player)?;

        let mut distinct: Vec<&String> = names.iter().collect();
        distinct.sort();
        distinct.dedup();
        if names.len() != 3 || distinct.len() != 3 {
            return Err(Rejection::WrongCardCount(distinct.len()).into());
        }

        let mut traded = Vec::with_capacity(3);
        for name in names {
            let card = actor.card(name).ok_or_else(|| Rejection::CardNotHeld {
                player,
                territory: name.clone(),
            })?;
            traded.push(card.clone());
        }
        if !is_tris([traded[0].symbol, traded[1].symbol, traded[2].symbol]) {
            return Err(Rejection::InvalidTris.into());
        }

        let bonus = bonus::card_trade_bonus(self.rules, &traded, self.state.trades_completed);
        let extras = bonus::territory_trade_bonuses(self.rules, &self.state.board, player, &traded);

        let actor = self.actor_mut(player)?;
        actor.cards.retain(|c| !names.contains(&c.territory));
        actor.bonus_troops = actor.bonus_troops.saturating_add(bonus);
        self.state.trades_completed += 1;
        // Traded cards go back under the deck.
        for card in traded {
            self.state.deck.insert(0, card);
        }

        let mut updates = Vec::with_capacity(extras.len());
        for (name, extra) in &extras {
            let mut t = self.state.board.territory(name)?.clone();
            t.troops = t.troops.saturating_add(*extra);
            updates.push(t);
        }
        self.state.board = self.state.board.with_territories(updates)?;

        info!(%player, bonus, trade = self.state.trades_completed, "cards traded");
        self.events.push(GameEvent::CardsTraded {
            player,
            cards: names.to_vec(),
            bonus,
            territory_bonuses: extras,
        });
        Ok(())
    }

    // ── EndTurn ────────────────────────────────────────────────────────

    fn end_turn(&mut self) -> Result<(), EngineError> {
        let acting = self.state.current_player();

        match self.state.phase() {
            Phase::Setup => {
                self.advance_seat();
                let all_placed = self.state.players.iter().all(|p| p.bonus_troops == 0);
                if self.state.board.all_owned() && all_placed {
                    self.state.turn.phase = Phase::Main;
                    self.state.turn.current = 0;
                    if self.seat_is_out(self.state.current_player()) {
                        self.advance_seat();
                    }
                    info!("setup complete");
                    self.events.push(GameEvent::PhaseChanged { phase: Phase::Main });
                    self.start_turn()?;
                }
            }
            Phase::Main => {
                if self.conquered {
                    self.draw_card(acting)?;
                }
                self.advance_seat();
                self.start_turn()?;
            }
        }
        self.conquered = false;

        if self.state.phase() == Phase::Main {
            self.check_objectives(acting);
        }
        Ok(())
    }

    fn seat_is_out(&self, id: PlayerId) -> bool {
        self.state.player(id).map_or(true, PlayerState::is_eliminated)
    }

    fn advance_seat(&mut self) {
        let players = &self.state.players;
        self.state.turn.advance(|id| {
            players
                .iter()
                .find(|p| p.id() == id)
                .map_or(true, PlayerState::is_eliminated)
        });
    }

    fn draw_card(&mut self, player: PlayerId) -> Result<(), EngineError> {
        let Some(card) = self.state.deck.pop() else {
            debug!(%player, "territory deck exhausted, no card drawn");
            return Ok(());
        };
        self.actor_mut(player)?.cards.push(card);
        self.events.push(GameEvent::CardDrawn { player });
        Ok(())
    }

    /// Assign the incoming player's reinforcement from what they hold now.
    fn start_turn(&mut self) -> Result<(), EngineError> {
        let next = self.state.current_player();
        let troops = bonus::turn_bonus(&self.state.board, next);
        self.actor_mut(next)?.bonus_troops = troops;
        self.state.turn.turn_number += 1;

        debug!(player = %next, turn = self.state.turn.turn_number, bonus = troops, "turn started");
        self.events.push(GameEvent::TurnStarted {
            player: next,
            turn_number: self.state.turn.turn_number,
            bonus_troops: troops,
        });
        Ok(())
    }

    /// Evaluate every remaining objective, the acting player first, then
    /// the rest in seating order.
    fn check_objectives(&mut self, acting: PlayerId) {
        let order = &self.state.turn.order;
        let start = order.iter().position(|&p| p == acting).unwrap_or(0);
        let winner = (0..order.len())
            .map(|i| order[(start + i) % order.len()])
            .filter_map(|id| self.state.player(id))
            .filter(|p| !p.is_eliminated())
            .find(|p| p.objective.is_satisfied(&self.state, p.id()))
            .map(PlayerState::id);

        if let Some(winner) = winner {
            self.state.winner = Some(winner);
            info!(%winner, "objective completed, game over");
            self.events.push(GameEvent::GameOver { winner });
        }
    }
}
