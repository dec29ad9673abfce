// ═══════════════════════════════════════════════════════════════════════
// Greedy Agent — makes decisions using simple strategic heuristics.
// Significantly stronger than RandomAgent.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{attack_options, border_territories, is_border, Agent, AttackPlan, MovePlan, TurnBudget};
use conquest_engine::types::*;
use conquest_engine::visibility::PlayerView;
use std::collections::{HashMap, VecDeque};

const MAX_ATTACKS_PER_TURN: u32 = 40;
const MAX_MOVES_PER_TURN: u32 = 6;
/// Troops the source must have over the target before attacking.
const REQUIRED_ADVANTAGE: u32 = 2;

pub struct GreedyAgent {
    player: PlayerId,
    attacks: TurnBudget,
    moves: TurnBudget,
}

impl GreedyAgent {
    pub fn new(player: PlayerId) -> Self {
        GreedyAgent {
            player,
            attacks: TurnBudget::default(),
            moves: TurnBudget::default(),
        }
    }

    /// Steps from each owned territory to the nearest border, walking
    /// only through owned territory.
    fn distance_to_border(&self, view: &PlayerView) -> HashMap<String, u32> {
        let mut dist = HashMap::new();
        let mut queue = VecDeque::new();
        for t in border_territories(view) {
            dist.insert(t.name.clone(), 0);
            queue.push_back(t.name.clone());
        }
        while let Some(name) = queue.pop_front() {
            let d = dist[&name];
            let Ok(t) = view.board.territory(&name) else { continue };
            for n in &t.neighbors {
                let owned = view.board.territory(n).is_ok_and(|nt| nt.owner == Some(view.viewer));
                if owned && !dist.contains_key(n) {
                    dist.insert(n.clone(), d + 1);
                    queue.push_back(n.clone());
                }
            }
        }
        dist
    }
}

impl Agent for GreedyAgent {
    fn name(&self) -> &str { "Greedy" }
    fn player(&self) -> PlayerId { self.player }

    fn place_troops(&mut self, view: &PlayerView) -> Option<(String, u32)> {
        // Stack everything on the strongest border territory.
        let target = border_territories(view)
            .into_iter()
            .max_by(|a, b| a.troops.cmp(&b.troops).then_with(|| b.name.cmp(&a.name)))
            .or_else(|| view.my_territories().next())?;
        Some((target.name.clone(), view.my_bonus_troops))
    }

    fn choose_attack(&mut self, view: &PlayerView) -> Option<AttackPlan> {
        let best = attack_options(view)
            .into_iter()
            .filter(|p| p.from_troops >= p.to_troops + REQUIRED_ADVANTAGE)
            .max_by(|a, b| {
                let edge_a = a.from_troops - a.to_troops;
                let edge_b = b.from_troops - b.to_troops;
                edge_a.cmp(&edge_b).then_with(|| b.to.cmp(&a.to))
            })?;
        self.attacks.spend(view, MAX_ATTACKS_PER_TURN).then_some(best)
    }

    fn choose_move(&mut self, view: &PlayerView) -> Option<MovePlan> {
        let dist = self.distance_to_border(view);
        let mut interior: Vec<_> = view
            .my_territories()
            .filter(|t| t.troops >= 2 && !is_border(view, t))
            .collect();
        // Deepest stacks first.
        interior.sort_by(|a, b| b.troops.cmp(&a.troops).then_with(|| a.name.cmp(&b.name)));

        for from in interior {
            let Some(&here) = dist.get(&from.name) else { continue };
            let closer = from
                .neighbors
                .iter()
                .filter_map(|n| dist.get(n).map(|&d| (n, d)))
                .filter(|&(_, d)| d < here)
                .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
            if let Some((to, _)) = closer {
                if !self.moves.spend(view, MAX_MOVES_PER_TURN) {
                    return None;
                }
                return Some(MovePlan {
                    from: from.name.clone(),
                    to: to.clone(),
                    troops: from.troops - 1,
                });
            }
        }
        None
    }
}
