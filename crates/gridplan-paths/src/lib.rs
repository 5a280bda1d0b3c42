//! Planning algorithms for 4-connected occupancy grids.
//!
//! This crate combines two search strategies over a [`Grid`](gridplan_core::Grid):
//!
//! - **A\*** shortest-path search ([`SearchSpace::astar_path`], [`search`])
//! - **Backward chaining** from the goal to a cell satisfying a goal
//!   condition ([`SearchSpace::chain`], [`chain`])
//! - **Hybrid planning**: chain to a subgoal, then A* from the start to the
//!   subgoal and from the subgoal to the goal ([`SearchSpace::plan`], [`plan`])
//! - **BFS** unweighted distance maps ([`SearchSpace::bfs_map`])
//!
//! All algorithms operate through [`SearchSpace`], which owns and reuses the
//! per-search state. The free functions build a fresh space per call.
//!
//! # Trait hierarchy
//!
//! | Trait | Required for |
//! |---|---|
//! | [`Pather`] | BFS |
//! | [`WeightedPather`] : [`Pather`] | cost accounting |
//! | [`AstarPather`] : [`WeightedPather`] | A* |

mod astar;
mod bfs;
mod chain;
mod config;
mod distance;
mod hybrid;
mod space;
mod traits;

pub use chain::{GoalConditions, Rule, RuleSet, RuledPather};
pub use config::{CancelToken, PlannerConfig};
pub use distance::{manhattan, manhattan as heuristic};
pub use hybrid::HybridPlan;
pub use space::{PathNode, SearchSpace, UNREACHABLE};
pub use traits::{AstarPather, Pather, WeightedPather};

use gridplan_core::{Cell, Environment, Path, Result};

/// Shortest path from `source` to `destination` on the environment's grid.
pub fn search(env: &Environment<'_>, source: Cell, destination: Cell) -> Result<Path> {
    SearchSpace::new(env.bounds()).astar_path(env, source, destination)
}

/// Backward chain from the environment's goal under the default rules.
pub fn chain(env: &Environment<'_>, goals: &GoalConditions) -> Result<Path> {
    let rules = RuleSet::default();
    SearchSpace::new(env.bounds()).chain(&RuledPather::new(env, &rules), goals)
}

/// Hybrid plan from start to goal through a chained subgoal, under the
/// default rules.
pub fn plan(env: &Environment<'_>, goals: &GoalConditions) -> Result<Path> {
    SearchSpace::new(env.bounds()).plan(env, goals, &RuleSet::default())
}
