// ═══════════════════════════════════════════════════════════════════════
// Random Agent — makes all decisions randomly.
// Serves as baseline and for testing game engine stability.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{attack_options, Agent, AttackPlan, MovePlan, TurnBudget};
use conquest_engine::types::*;
use conquest_engine::visibility::PlayerView;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const MAX_ATTACKS_PER_TURN: u32 = 8;
const MAX_MOVES_PER_TURN: u32 = 1;

pub struct RandomAgent {
    player: PlayerId,
    rng: ChaCha8Rng,
    attacks: TurnBudget,
    moves: TurnBudget,
}

impl RandomAgent {
    pub fn new(player: PlayerId, seed: u64) -> Self {
        RandomAgent {
            player,
            rng: ChaCha8Rng::seed_from_u64(seed),
            attacks: TurnBudget::default(),
            moves: TurnBudget::default(),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str { "Random" }
    fn player(&self) -> PlayerId { self.player }

    fn place_troops(&mut self, view: &PlayerView) -> Option<(String, u32)> {
        let owned: Vec<&str> = view.my_territories().map(|t| t.name.as_str()).collect();
        let &target = owned.choose(&mut self.rng)?;
        let troops = self.rng.gen_range(1..=view.my_bonus_troops);
        Some((target.to_string(), troops))
    }

    fn choose_attack(&mut self, view: &PlayerView) -> Option<AttackPlan> {
        if !self.rng.gen_bool(0.7) || !self.attacks.spend(view, MAX_ATTACKS_PER_TURN) {
            return None;
        }
        let options = attack_options(view);
        let mut plan = options.choose(&mut self.rng)?.clone();
        plan.troops = self.rng.gen_range(1..=plan.troops);
        Some(plan)
    }

    fn choose_move(&mut self, view: &PlayerView) -> Option<MovePlan> {
        if !self.rng.gen_bool(0.3) || !self.moves.spend(view, MAX_MOVES_PER_TURN) {
            return None;
        }
        let options: Vec<MovePlan> = view
            .my_territories()
            .filter(|t| t.troops >= 2)
            .flat_map(|from| {
                from.neighbors
                    .iter()
                    .filter(move |n| view.board.territory(n).is_ok_and(|t| t.owner == Some(view.viewer)))
                    .map(move |to| MovePlan {
                        from: from.name.clone(),
                        to: to.clone(),
                        troops: from.troops - 1,
                    })
            })
            .collect();
        let mut plan = options.choose(&mut self.rng)?.clone();
        plan.troops = self.rng.gen_range(1..=plan.troops);
        Some(plan)
    }
}
