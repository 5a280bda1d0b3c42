use gridplan_core::{Environment, Error, Path, Result};

use crate::SearchSpace;
use crate::chain::{GoalConditions, RuleSet, RuledPather};

/// Every intermediate result of a hybrid planning call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HybridPlan {
    /// Backward chain from the goal; its last cell is the subgoal.
    pub chain: Path,
    /// Start to subgoal.
    pub first_leg: Path,
    /// Subgoal to goal.
    pub second_leg: Path,
    /// Both legs joined, the subgoal appearing once.
    pub path: Path,
}

impl SearchSpace {
    /// Plan from the environment's start to its goal through a subgoal
    /// derived by backward chaining.
    ///
    /// The chain and both A* legs run under `rules`. A failure of either leg
    /// fails the whole plan with that leg's [`Error::NotFound`]; a plan that
    /// stops at the subgoal is never returned. Chaining failures propagate
    /// unchanged.
    pub fn plan_detailed(
        &mut self,
        env: &Environment<'_>,
        goals: &GoalConditions,
        rules: &RuleSet,
    ) -> Result<HybridPlan> {
        let pather = RuledPather::new(env, rules);

        let chain = self.chain(&pather, goals)?;
        let subgoal = chain.last().copied().unwrap_or(env.start());
        log::debug!("subgoal {subgoal} via chain {chain}");

        let first_leg = self
            .astar_path(&pather, env.start(), subgoal)
            .inspect_err(|e| log::debug!("first leg failed: {e}"))?;
        let second_leg = self
            .astar_path(&pather, subgoal, env.goal())
            .inspect_err(|e| log::debug!("second leg failed: {e}"))?;

        let path = first_leg.clone().join(&second_leg).ok_or(Error::NotFound {
            from: env.start(),
            to: env.goal(),
        })?;
        log::debug!(
            "hybrid plan: {} + {} steps = {}",
            first_leg.edges(),
            second_leg.edges(),
            path.edges()
        );

        Ok(HybridPlan {
            chain,
            first_leg,
            second_leg,
            path,
        })
    }

    /// Like [`SearchSpace::plan_detailed`], returning only the joined path.
    pub fn plan(&mut self, env: &Environment<'_>, goals: &GoalConditions, rules: &RuleSet) -> Result<Path> {
        self.plan_detailed(env, goals, rules).map(|p| p.path)
    }
}
