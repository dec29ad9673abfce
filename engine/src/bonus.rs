// ═══════════════════════════════════════════════════════════════════════
// Bonus calculator — turn reinforcements and card trade values
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::is_tris;
use crate::config::RuleSet;
use crate::map::Board;
use crate::types::*;

/// Base reinforcement for holding `territory_count` territories.
pub fn reinforcement(territory_count: usize) -> u32 {
    (territory_count as u32 / 3).max(3)
}

/// Sum of bonuses of every continent `player` holds entirely.
pub fn continent_bonus(board: &Board, player: PlayerId) -> u32 {
    board.continents_owned_by(player).map(|c| c.bonus).sum()
}

/// Troops granted at the start of `player`'s turn.
pub fn turn_bonus(board: &Board, player: PlayerId) -> u32 {
    reinforcement(board.territories_owned_by(player).count()) + continent_bonus(board, player)
}

/// Value of the trade made after `trades_completed` earlier trades.
/// Follows the table, then grows by `trade_bonus_step` per trade,
/// saturating at `u32::MAX`.
pub fn trade_value(rules: &RuleSet, trades_completed: u32) -> u32 {
    let table = &rules.trade_bonus_table;
    let idx = trades_completed as usize;
    match table.get(idx) {
        Some(&v) => v,
        None => {
            let last = table.last().copied().unwrap_or(0);
            let beyond = u32::try_from(idx + 1 - table.len()).unwrap_or(u32::MAX);
            last.saturating_add(beyond.saturating_mul(rules.trade_bonus_step))
        }
    }
}

/// Base trade bonus for `cards`: 0 unless they form a tris.
pub fn card_trade_bonus(rules: &RuleSet, cards: &[TerritoryCard], trades_completed: u32) -> u32 {
    match cards {
        [a, b, c] if is_tris([a.symbol, b.symbol, c.symbol]) => {
            trade_value(rules, trades_completed)
        }
        _ => 0,
    }
}

/// Extra troops placed directly on traded cards' territories that the
/// trader owns.
pub fn territory_trade_bonuses(
    rules: &RuleSet,
    board: &Board,
    player: PlayerId,
    cards: &[TerritoryCard],
) -> Vec<(String, u32)> {
    if rules.territory_trade_bonus == 0 {
        return Vec::new();
    }
    cards
        .iter()
        .filter(|c| {
            board
                .territory(&c.territory)
                .is_ok_and(|t| t.is_owned_by(player))
        })
        .map(|c| (c.territory.clone(), rules.territory_trade_bonus))
        .collect()
}
