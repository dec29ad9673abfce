pub mod agent;
pub mod random;
pub mod greedy;

pub use agent::{Agent, AttackPlan, MovePlan};
pub use random::RandomAgent;
pub use greedy::GreedyAgent;
