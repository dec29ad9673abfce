// ═══════════════════════════════════════════════════════════════════════
// Territory cards — deck construction and set matching
// ═══════════════════════════════════════════════════════════════════════

use crate::map::Board;
use crate::types::*;

/// One card per territory, symbols dealt round-robin in board order so
/// every symbol appears (almost) equally often.
pub fn territory_deck(board: &Board) -> Vec<TerritoryCard> {
    board
        .territory_names()
        .zip(Symbol::ALL.iter().cycle())
        .map(|(name, &symbol)| TerritoryCard {
            territory: name.to_string(),
            symbol,
        })
        .collect()
}

/// Three of a kind, or one of each symbol.
pub fn is_tris(symbols: [Symbol; 3]) -> bool {
    let [a, b, c] = symbols;
    let all_same = a == b && b == c;
    let all_different = a != b && b != c && a != c;
    all_same || all_different
}

/// Whether any three cards from `hand` form a tris.
pub fn find_tris(hand: &[TerritoryCard]) -> Option<[&TerritoryCard; 3]> {
    let n = hand.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                if is_tris([hand[i].symbol, hand[j].symbol, hand[k].symbol]) {
                    return Some([&hand[i], &hand[j], &hand[k]]);
                }
            }
        }
    }
    None
}
