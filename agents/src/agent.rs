// ═══════════════════════════════════════════════════════════════════════
// Agent Trait — interface that all AI agents must implement
//
// KEY DESIGN PRINCIPLE:
//   Agents receive a `PlayerView` (not raw GameState), which only
//   contains information the player is legally allowed to see.
//   This enforces information hiding at the type level.
//
//   The agent never gets to see:
//     - Opponents' territory cards
//     - Opponents' objectives
//     - Deck ordering
// ═══════════════════════════════════════════════════════════════════════

use conquest_engine::cards::find_tris;
use conquest_engine::engine::GameAction;
use conquest_engine::map::Territory;
use conquest_engine::types::*;
use conquest_engine::visibility::PlayerView;

/// A candidate attack, as seen from the attacker's side of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackPlan {
    pub from: String,
    pub to: String,
    pub defender: PlayerId,
    /// Troops to commit; always leaves one behind.
    pub troops: u32,
    pub from_troops: u32,
    pub to_troops: u32,
}

/// A candidate troop movement between two owned territories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub from: String,
    pub to: String,
    pub troops: u32,
}

/// Trait that all AI agents must implement.
/// The agent receives a PlayerView and must return a GameAction.
pub trait Agent: Send + Sync {
    /// Human-readable name for this agent (e.g., "Random", "Greedy").
    fn name(&self) -> &str;

    /// The seat this agent is playing.
    fn player(&self) -> PlayerId;

    /// Make a decision based on the current player view.
    /// Dispatches to the specific methods in turn order:
    /// trade, place, attack, move, end.
    fn decide(&mut self, view: &PlayerView) -> GameAction {
        let player = self.player();

        if view.phase == Phase::Main {
            if let Some(cards) = self.trade_cards(view) {
                return GameAction::TradeCards { player, cards };
            }
        }

        if view.my_bonus_troops > 0 {
            if let Some((territory, troops)) = self.place_troops(view) {
                return GameAction::PlaceTroops { player, troops, territory };
            }
        }

        if view.phase == Phase::Setup {
            return GameAction::EndTurn;
        }

        if let Some(plan) = self.choose_attack(view) {
            return GameAction::Attack {
                player,
                defender: plan.defender,
                from: plan.from,
                to: plan.to,
                troops: plan.troops,
            };
        }

        if let Some(plan) = self.choose_move(view) {
            return GameAction::Reinforce {
                player,
                from: plan.from,
                to: plan.to,
                troops: plan.troops,
            };
        }

        GameAction::EndTurn
    }

    // ── Individual decision methods ────────────────────────────────────
    // Agents override these to implement their strategy.

    /// Cards to trade, if any. Defaults to the first tris in hand.
    fn trade_cards(&mut self, view: &PlayerView) -> Option<Vec<String>> {
        find_tris(&view.my_cards).map(|set| set.iter().map(|c| c.territory.clone()).collect())
    }

    /// Where to put bonus troops and how many. None = hold them.
    fn place_troops(&mut self, view: &PlayerView) -> Option<(String, u32)>;

    /// Next attack this turn. None = stop attacking.
    fn choose_attack(&mut self, view: &PlayerView) -> Option<AttackPlan>;

    /// Next troop movement this turn. None = done moving.
    fn choose_move(&mut self, view: &PlayerView) -> Option<MovePlan>;
}

// ── Shared board reading ───────────────────────────────────────────────

/// Every attack the viewer could legally launch right now, committing as
/// many dice as possible.
pub fn attack_options(view: &PlayerView) -> Vec<AttackPlan> {
    let me = view.viewer;
    let mut plans = Vec::new();
    for from in view.my_territories().filter(|t| t.troops >= 2) {
        for name in &from.neighbors {
            let Ok(target) = view.board.territory(name) else {
                continue;
            };
            let Some(defender) = target.owner.filter(|&o| o != me) else {
                continue;
            };
            plans.push(AttackPlan {
                from: from.name.clone(),
                to: target.name.clone(),
                defender,
                troops: (from.troops - 1).min(3),
                from_troops: from.troops,
                to_troops: target.troops,
            });
        }
    }
    plans
}

/// Whether `t` touches a territory the viewer does not own.
pub fn is_border(view: &PlayerView, t: &Territory) -> bool {
    t.neighbors.iter().any(|n| {
        view.board
            .territory(n)
            .is_ok_and(|nt| nt.owner != Some(view.viewer))
    })
}

/// Owned territories with at least one foreign neighbor.
pub fn border_territories(view: &PlayerView) -> Vec<&Territory> {
    view.my_territories().filter(|t| is_border(view, t)).collect()
}

/// Tracks how many times something was done during the current turn.
/// Resets itself when the view shows a new turn number.
#[derive(Debug, Clone, Default)]
pub struct TurnBudget {
    turn: u32,
    used: u32,
}

impl TurnBudget {
    /// Record one use if fewer than `limit` happened this turn.
    pub fn spend(&mut self, view: &PlayerView, limit: u32) -> bool {
        if self.turn != view.turn_number {
            self.turn = view.turn_number;
            self.used = 0;
        }
        if self.used >= limit {
            return false;
        }
        self.used += 1;
        true
    }
}
