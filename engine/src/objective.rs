// ═══════════════════════════════════════════════════════════════════════
// Objective cards — secret win conditions and their evaluation
// ═══════════════════════════════════════════════════════════════════════

use crate::map::{self, Board};
use crate::types::{GameState, PlayerId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Objective {
    /// Hold `count` territories with at least `min_troops` each.
    ConquerTerritories { count: usize, min_troops: u32 },
    /// Take the last territory of `target`. If someone else does it first
    /// the card falls back to the territorial goal.
    EliminatePlayer { target: PlayerId },
    /// Hold any `count` complete continents.
    ConquerContinents { count: usize },
    /// Hold the named continents, plus one more of your choice if `plus_any`.
    ConquerNamedContinents { continents: Vec<String>, plus_any: bool },
}

/// Named-continent cards of the classic deck.
const CLASSIC_CONTINENT_GOALS: [(&[&str], bool); 6] = [
    (&[map::NORTH_AMERICA, map::AFRICA], false),
    (&[map::NORTH_AMERICA, map::OCEANIA], false),
    (&[map::ASIA, map::SOUTH_AMERICA], false),
    (&[map::ASIA, map::AFRICA], false),
    (&[map::EUROPE, map::SOUTH_AMERICA], true),
    (&[map::EUROPE, map::OCEANIA], true),
];

/// Territory goal used by the large "conquer" card and as the fallback
/// for elimination cards: 24 of 42 on the classic map.
pub fn territorial_goal(board: &Board) -> usize {
    (board.len() * 4 / 7).max(1)
}

impl Objective {
    pub fn fallback(board: &Board) -> Objective {
        Objective::ConquerTerritories {
            count: territorial_goal(board),
            min_troops: 1,
        }
    }

    pub fn is_satisfied(&self, state: &GameState, holder: PlayerId) -> bool {
        let board = &state.board;
        match self {
            Objective::ConquerTerritories { count, min_troops } => {
                board
                    .territories_owned_by(holder)
                    .filter(|t| t.troops >= *min_troops)
                    .count()
                    >= *count
            }
            Objective::EliminatePlayer { target } => {
                let eliminated_by = state.player(*target).map(|p| p.eliminated_by);
                match eliminated_by {
                    Some(Some(by)) if by == holder && *target != holder => true,
                    Some(None) if *target != holder => false,
                    // Target gone to someone else, absent, or ourselves.
                    _ => Objective::fallback(board).is_satisfied(state, holder),
                }
            }
            Objective::ConquerContinents { count } => {
                board.continents_owned_by(holder).count() >= *count
            }
            Objective::ConquerNamedContinents { continents, plus_any } => {
                let named = continents.iter().all(|name| {
                    board
                        .continent(name)
                        .is_ok_and(|c| board.owns_continent(holder, c))
                });
                if !named {
                    return false;
                }
                !*plus_any
                    || board
                        .continents_owned_by(holder)
                        .any(|c| !continents.contains(&c.name))
            }
        }
    }
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Objective::ConquerTerritories { count, min_troops: 1 } => {
                write!(f, "Conquer {count} territories")
            }
            Objective::ConquerTerritories { count, min_troops } => {
                write!(f, "Conquer {count} territories with at least {min_troops} troops each")
            }
            Objective::EliminatePlayer { target } => write!(f, "Eliminate {target}"),
            Objective::ConquerContinents { count } => write!(f, "Conquer {count} continents"),
            Objective::ConquerNamedContinents { continents, plus_any } => {
                write!(f, "Conquer {}", continents.join(" and "))?;
                if *plus_any {
                    write!(f, " plus one continent of your choice")?;
                }
                Ok(())
            }
        }
    }
}

/// Objective cards for a board and seat list. Named-continent cards are
/// included only when the board has those continents.
pub fn objective_deck(board: &Board, players: &[PlayerId]) -> Vec<Objective> {
    let mut deck = vec![
        Objective::fallback(board),
        Objective::ConquerTerritories {
            count: (board.len() * 3 / 7).max(1),
            min_troops: 2,
        },
    ];
    if board.continents().len() > 3 {
        deck.push(Objective::ConquerContinents { count: 3 });
    }
    for (names, plus_any) in CLASSIC_CONTINENT_GOALS {
        if names.iter().all(|n| board.continent(n).is_ok()) {
            deck.push(Objective::ConquerNamedContinents {
                continents: names.iter().map(|n| n.to_string()).collect(),
                plus_any,
            });
        }
    }
    deck.extend(players.iter().map(|&target| Objective::EliminatePlayer { target }));
    deck
}

/// Shuffle `deck` and deal one card per seat, never handing a player an
/// elimination card that targets themselves.
pub fn deal_objectives(
    mut deck: Vec<Objective>,
    players: &[PlayerId],
    board: &Board,
    rng: &mut impl Rng,
) -> Vec<Objective> {
    deck.shuffle(rng);
    players
        .iter()
        .map(|&seat| {
            let pick = deck
                .iter()
                .position(|o| !matches!(o, Objective::EliminatePlayer { target } if *target == seat));
            match pick {
                Some(i) => deck.remove(i),
                None => Objective::fallback(board),
            }
        })
        .collect()
}
