// ═══════════════════════════════════════════════════════════════════════
// Board model — territories, continents, adjacency
// Plus the static data for the classic 42-territory world map.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::Missing;
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// A single territory. Neighbors are referenced by name and resolved
/// through the owning `Board`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    pub name: String,
    pub continent: String,
    pub owner: Option<PlayerId>,
    pub troops: u32,
    pub neighbors: BTreeSet<String>,
}

impl Territory {
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    pub fn borders(&self, other: &str) -> bool {
        self.neighbors.contains(other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continent {
    pub name: String,
    pub bonus: u32,
    pub territories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board has no territories")]
    Empty,

    #[error("territory '{0}' is declared in more than one continent")]
    DuplicateTerritory(String),

    #[error("border references unknown territory '{0}'")]
    UnknownTerritory(String),

    #[error("territory '{0}' cannot border itself")]
    SelfBorder(String),

    #[error("territory '{0}' has no neighbors")]
    Isolated(String),
}

/// The playing board. Structure (continents, adjacency) is fixed once
/// built; only owner and troop counts change, always through
/// `with_territories`, which returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    continents: Vec<Continent>,
    territories: BTreeMap<String, Territory>,
}

impl Board {
    pub fn territory(&self, name: &str) -> Result<&Territory, Missing> {
        self.territories
            .get(name)
            .ok_or_else(|| Missing::Territory(name.to_string()))
    }

    pub fn continent(&self, name: &str) -> Result<&Continent, Missing> {
        self.continents
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Missing::Continent(name.to_string()))
    }

    pub fn neighbors(&self, name: &str) -> Result<&BTreeSet<String>, Missing> {
        self.territory(name).map(|t| &t.neighbors)
    }

    pub fn are_adjacent(&self, a: &str, b: &str) -> Result<bool, Missing> {
        let ta = self.territory(a)?;
        self.territory(b)?;
        Ok(ta.borders(b))
    }

    pub fn continents(&self) -> &[Continent] {
        &self.continents
    }

    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    pub fn territory_names(&self) -> impl Iterator<Item = &str> {
        self.territories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.territories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    pub fn territories_owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Territory> {
        self.territories.values().filter(move |t| t.is_owned_by(player))
    }

    pub fn all_owned(&self) -> bool {
        self.territories.values().all(|t| t.owner.is_some())
    }

    pub fn owns_continent(&self, player: PlayerId, continent: &Continent) -> bool {
        continent.territories.iter().all(|name| {
            self.territories
                .get(name)
                .is_some_and(|t| t.is_owned_by(player))
        })
    }

    pub fn continents_owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Continent> {
        self.continents
            .iter()
            .filter(move |c| self.owns_continent(player, c))
    }

    /// Copy-on-write update. Each replacement is matched by name; only its
    /// owner and troop count are taken, the continent and neighbor set of
    /// the existing territory are preserved.
    pub fn with_territories<I>(&self, updates: I) -> Result<Board, Missing>
    where
        I: IntoIterator<Item = Territory>,
    {
        let mut next = self.clone();
        for update in updates {
            let slot = next
                .territories
                .get_mut(&update.name)
                .ok_or_else(|| Missing::Territory(update.name.clone()))?;
            slot.owner = update.owner;
            slot.troops = update.troops;
        }
        Ok(next)
    }

    /// Convenience over `with_territories` for a single territory.
    pub fn with_territory(
        &self,
        name: &str,
        owner: Option<PlayerId>,
        troops: u32,
    ) -> Result<Board, Missing> {
        let mut updated = self.territory(name)?.clone();
        updated.owner = owner;
        updated.troops = troops;
        self.with_territories([updated])
    }
}

// ── Builder ────────────────────────────────────────────────────────────

/// Assembles a board from continent listings and border pairs, then
/// checks the structural invariants.
#[derive(Debug, Default)]
pub struct BoardBuilder {
    continents: Vec<Continent>,
    borders: Vec<(String, String)>,
}

impl BoardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn continent(mut self, name: &str, bonus: u32, territories: &[&str]) -> Self {
        self.continents.push(Continent {
            name: name.to_string(),
            bonus,
            territories: territories.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn border(mut self, a: &str, b: &str) -> Self {
        self.borders.push((a.to_string(), b.to_string()));
        self
    }

    pub fn build(self) -> Result<Board, BoardError> {
        let mut territories: BTreeMap<String, Territory> = BTreeMap::new();
        for continent in &self.continents {
            for name in &continent.territories {
                if territories.contains_key(name) {
                    return Err(BoardError::DuplicateTerritory(name.clone()));
                }
                territories.insert(
                    name.clone(),
                    Territory {
                        name: name.clone(),
                        continent: continent.name.clone(),
                        owner: None,
                        troops: 0,
                        neighbors: BTreeSet::new(),
                    },
                );
            }
        }
        if territories.is_empty() {
            return Err(BoardError::Empty);
        }

        // Borders are symmetric: record both directions.
        for (a, b) in &self.borders {
            if a == b {
                return Err(BoardError::SelfBorder(a.clone()));
            }
            for (from, to) in [(a, b), (b, a)] {
                territories
                    .get_mut(from)
                    .ok_or_else(|| BoardError::UnknownTerritory(from.clone()))?
                    .neighbors
                    .insert(to.clone());
            }
        }

        if let Some(t) = territories.values().find(|t| t.neighbors.is_empty()) {
            return Err(BoardError::Isolated(t.name.clone()));
        }

        Ok(Board {
            continents: self.continents,
            territories,
        })
    }
}

// ── Classic world map ──────────────────────────────────────────────────

pub const NORTH_AMERICA: &str = "North America";
pub const SOUTH_AMERICA: &str = "South America";
pub const EUROPE: &str = "Europe";
pub const AFRICA: &str = "Africa";
pub const ASIA: &str = "Asia";
pub const OCEANIA: &str = "Oceania";

/// (continent, bonus, member territories)
pub const WORLD_CONTINENTS: [(&str, u32, &[&str]); 6] = [
    (NORTH_AMERICA, 5, &[
        "Alaska", "Northwest Territory", "Greenland", "Alberta", "Ontario",
        "Quebec", "Western United States", "Eastern United States", "Central America",
    ]),
    (SOUTH_AMERICA, 2, &["Venezuela", "Peru", "Brazil", "Argentina"]),
    (EUROPE, 5, &[
        "Iceland", "Scandinavia", "Great Britain", "Northern Europe",
        "Western Europe", "Southern Europe", "Ukraine",
    ]),
    (AFRICA, 3, &[
        "North Africa", "Egypt", "East Africa", "Congo", "South Africa", "Madagascar",
    ]),
    (ASIA, 7, &[
        "Ural", "Siberia", "Yakutsk", "Kamchatka", "Irkutsk", "Mongolia",
        "Japan", "Afghanistan", "China", "Middle East", "India", "Siam",
    ]),
    (OCEANIA, 2, &["Indonesia", "New Guinea", "Western Australia", "Eastern Australia"]),
];

/// Undirected borders of the world map.
pub const WORLD_BORDERS: [(&str, &str); 83] = [
    // North America
    ("Alaska", "Northwest Territory"),
    ("Alaska", "Alberta"),
    ("Alaska", "Kamchatka"),
    ("Northwest Territory", "Alberta"),
    ("Northwest Territory", "Ontario"),
    ("Northwest Territory", "Greenland"),
    ("Greenland", "Ontario"),
    ("Greenland", "Quebec"),
    ("Greenland", "Iceland"),
    ("Alberta", "Ontario"),
    ("Alberta", "Western United States"),
    ("Ontario", "Quebec"),
    ("Ontario", "Western United States"),
    ("Ontario", "Eastern United States"),
    ("Quebec", "Eastern United States"),
    ("Western United States", "Eastern United States"),
    ("Western United States", "Central America"),
    ("Eastern United States", "Central America"),
    ("Central America", "Venezuela"),
    // South America
    ("Venezuela", "Peru"),
    ("Venezuela", "Brazil"),
    ("Peru", "Brazil"),
    ("Peru", "Argentina"),
    ("Brazil", "Argentina"),
    ("Brazil", "North Africa"),
    // Europe
    ("Iceland", "Great Britain"),
    ("Iceland", "Scandinavia"),
    ("Great Britain", "Scandinavia"),
    ("Great Britain", "Northern Europe"),
    ("Great Britain", "Western Europe"),
    ("Scandinavia", "Northern Europe"),
    ("Scandinavia", "Ukraine"),
    ("Northern Europe", "Western Europe"),
    ("Northern Europe", "Southern Europe"),
    ("Northern Europe", "Ukraine"),
    ("Western Europe", "Southern Europe"),
    ("Western Europe", "North Africa"),
    ("Southern Europe", "Ukraine"),
    ("Southern Europe", "North Africa"),
    ("Southern Europe", "Egypt"),
    ("Southern Europe", "Middle East"),
    ("Ukraine", "Ural"),
    ("Ukraine", "Afghanistan"),
    ("Ukraine", "Middle East"),
    // Africa
    ("North Africa", "Egypt"),
    ("North Africa", "East Africa"),
    ("North Africa", "Congo"),
    ("Egypt", "East Africa"),
    ("Egypt", "Middle East"),
    ("East Africa", "Congo"),
    ("East Africa", "South Africa"),
    ("East Africa", "Madagascar"),
    ("East Africa", "Middle East"),
    ("Congo", "South Africa"),
    ("South Africa", "Madagascar"),
    // Asia
    ("Ural", "Siberia"),
    ("Ural", "China"),
    ("Ural", "Afghanistan"),
    ("Siberia", "Yakutsk"),
    ("Siberia", "Irkutsk"),
    ("Siberia", "Mongolia"),
    ("Siberia", "China"),
    ("Yakutsk", "Kamchatka"),
    ("Yakutsk", "Irkutsk"),
    ("Kamchatka", "Irkutsk"),
    ("Kamchatka", "Mongolia"),
    ("Kamchatka", "Japan"),
    ("Irkutsk", "Mongolia"),
    ("Mongolia", "China"),
    ("Mongolia", "Japan"),
    ("Afghanistan", "China"),
    ("Afghanistan", "India"),
    ("Afghanistan", "Middle East"),
    ("China", "India"),
    ("China", "Siam"),
    ("Middle East", "India"),
    ("India", "Siam"),
    ("Siam", "Indonesia"),
    // Oceania
    ("Indonesia", "New Guinea"),
    ("Indonesia", "Western Australia"),
    ("New Guinea", "Western Australia"),
    ("New Guinea", "Eastern Australia"),
    ("Western Australia", "Eastern Australia"),
];

/// Build the classic 42-territory world board with no owners.
pub fn world_board() -> Board {
    let mut builder = BoardBuilder::new();
    for (name, bonus, members) in WORLD_CONTINENTS {
        builder = builder.continent(name, bonus, members);
    }
    for (a, b) in WORLD_BORDERS {
        builder = builder.border(a, b);
    }
    // The static tables are covered by `world_board_is_valid`.
    match builder.build() {
        Ok(board) => board,
        Err(e) => unreachable!("static world map is invalid: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_board_is_valid() {
        let board = world_board();
        assert_eq!(board.len(), 42);
        assert_eq!(board.continents().len(), 6);
        let bonuses: u32 = board.continents().iter().map(|c| c.bonus).sum();
        assert_eq!(bonuses, 24);
    }

    #[test]
    fn world_adjacency_is_symmetric() {
        let board = world_board();
        for t in board.territories() {
            for n in &t.neighbors {
                let other = board.territory(n).unwrap();
                assert!(other.borders(&t.name), "{} -> {} not symmetric", t.name, n);
            }
        }
    }

    #[test]
    fn every_territory_in_exactly_one_continent() {
        let board = world_board();
        let listed: usize = board.continents().iter().map(|c| c.territories.len()).sum();
        assert_eq!(listed, board.len());
        for t in board.territories() {
            let c = board.continent(&t.continent).unwrap();
            assert!(c.territories.contains(&t.name));
        }
    }

    #[test]
    fn intercontinental_links() {
        let board = world_board();
        assert!(board.are_adjacent("Alaska", "Kamchatka").unwrap());
        assert!(board.are_adjacent("Brazil", "North Africa").unwrap());
        assert!(board.are_adjacent("Siam", "Indonesia").unwrap());
        assert!(!board.are_adjacent("Alaska", "Japan").unwrap());
    }

    #[test]
    fn unknown_names_are_not_found() {
        let board = world_board();
        assert_eq!(
            board.territory("Atlantis").unwrap_err(),
            Missing::Territory("Atlantis".into())
        );
        assert!(board.continent("Antarctica").is_err());
        assert!(board.are_adjacent("Alaska", "Atlantis").is_err());
    }

    #[test]
    fn with_territories_is_copy_on_write() {
        let board = world_board();
        let mut peru = board.territory("Peru").unwrap().clone();
        peru.owner = Some(PlayerId(1));
        peru.troops = 4;
        // Attempted structural edits are ignored.
        peru.neighbors.clear();
        peru.continent = "Elsewhere".into();

        let next = board.with_territories([peru]).unwrap();
        let updated = next.territory("Peru").unwrap();
        assert_eq!(updated.owner, Some(PlayerId(1)));
        assert_eq!(updated.troops, 4);
        assert_eq!(updated.continent, SOUTH_AMERICA);
        assert_eq!(updated.neighbors.len(), 3);

        // Original untouched.
        assert_eq!(board.territory("Peru").unwrap().owner, None);
    }

    #[test]
    fn with_territories_rejects_unknown_name() {
        let board = world_board();
        let mut ghost = board.territory("Peru").unwrap().clone();
        ghost.name = "Atlantis".into();
        assert!(board.with_territories([ghost]).is_err());
    }

    #[test]
    fn builder_rejects_bad_structure() {
        let dup = BoardBuilder::new()
            .continent("A", 1, &["x", "y"])
            .continent("B", 1, &["y"])
            .border("x", "y")
            .build();
        assert_eq!(dup.unwrap_err(), BoardError::DuplicateTerritory("y".into()));

        let unknown = BoardBuilder::new()
            .continent("A", 1, &["x", "y"])
            .border("x", "z")
            .build();
        assert_eq!(unknown.unwrap_err(), BoardError::UnknownTerritory("z".into()));

        let isolated = BoardBuilder::new()
            .continent("A", 1, &["x", "y", "z"])
            .border("x", "y")
            .build();
        assert_eq!(isolated.unwrap_err(), BoardError::Isolated("z".into()));

        assert_eq!(BoardBuilder::new().build().unwrap_err(), BoardError::Empty);
    }

    #[test]
    fn continent_ownership() {
        let board = world_board();
        let p = PlayerId(0);
        let updates: Vec<Territory> = board
            .continent(OCEANIA)
            .unwrap()
            .territories
            .iter()
            .map(|name| {
                let mut t = board.territory(name).unwrap().clone();
                t.owner = Some(p);
                t.troops = 1;
                t
            })
            .collect();
        let next = board.with_territories(updates).unwrap();
        let owned: Vec<&str> = next.continents_owned_by(p).map(|c| c.name.as_str()).collect();
        assert_eq!(owned, vec![OCEANIA]);
        assert_eq!(next.territories_owned_by(p).count(), 4);
    }
}
