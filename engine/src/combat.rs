// ═══════════════════════════════════════════════════════════════════════
// Combat resolver — dice battles between two territories
// ═══════════════════════════════════════════════════════════════════════

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub const MAX_ATTACK_DICE: u32 = 3;
pub const MAX_DEFENSE_DICE: u32 = 2;

/// Source of six-sided dice. The engine never touches a global RNG, so
/// games replay exactly from their seed or a recorded script.
pub trait DiceRoller {
    /// Roll `count` dice, each in 1..=6.
    fn roll(&mut self, count: u32) -> Vec<u8>;
}

/// Seeded ChaCha dice, used by real games.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        SeededDice {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DiceRoller for SeededDice {
    fn roll(&mut self, count: u32) -> Vec<u8> {
        (0..count).map(|_| self.rng.gen_range(1..=6)).collect()
    }
}

/// Replays a fixed sequence of faces, cycling when exhausted.
/// Used by replays and tests.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: Vec<u8>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(faces: Vec<u8>) -> Self {
        ScriptedDice {
            faces,
            cursor: 0,
        }
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&mut self, count: u32) -> Vec<u8> {
        (0..count)
            .map(|_| {
                let face = if self.faces.is_empty() {
                    1
                } else {
                    self.faces[self.cursor % self.faces.len()]
                };
                self.cursor += 1;
                face
            })
            .collect()
    }
}

/// Outcome of one exchange of dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Sorted high to low.
    pub attacker_dice: Vec<u8>,
    /// Sorted high to low.
    pub defender_dice: Vec<u8>,
    pub attacker_losses: u32,
    pub defender_losses: u32,
    /// Defender's troops reached zero.
    pub conquered: bool,
}

pub fn attack_dice(committed: u32) -> u32 {
    committed.min(MAX_ATTACK_DICE)
}

pub fn defense_dice(defending_troops: u32) -> u32 {
    defending_troops.min(MAX_DEFENSE_DICE)
}

/// Compare dice pairwise, highest against highest. Ties go to the
/// attacker. Returns (attacker_losses, defender_losses).
pub fn compare_dice(attacker: &mut [u8], defender: &mut [u8]) -> (u32, u32) {
    attacker.sort_unstable_by(|a, b| b.cmp(a));
    defender.sort_unstable_by(|a, b| b.cmp(a));

    let mut attacker_losses = 0;
    let mut defender_losses = 0;
    for (a, d) in attacker.iter().zip(defender.iter()) {
        if a >= d {
            defender_losses += 1;
        } else {
            attacker_losses += 1;
        }
    }
    (attacker_losses, defender_losses)
}

/// Roll and settle one battle. `committed` is the number of attacking
/// troops (already validated to leave one behind); `defending` is the
/// defender territory's troop count.
pub fn resolve_battle(dice: &mut impl DiceRoller, committed: u32, defending: u32) -> BattleReport {
    let mut attacker_dice = dice.roll(attack_dice(committed));
    let mut defender_dice = dice.roll(defense_dice(defending));
    let (attacker_losses, defender_losses) = compare_dice(&mut attacker_dice, &mut defender_dice);

    BattleReport {
        attacker_dice,
        defender_dice,
        attacker_losses,
        defender_losses,
        conquered: defender_losses >= defending,
    }
}
