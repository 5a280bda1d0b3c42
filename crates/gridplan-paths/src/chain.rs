//! Backward subgoal chaining.
//!
//! Starting at the environment's goal, the chainer repeatedly steps to the
//! first admissible neighbor that satisfies a goal condition, until the
//! current cell itself satisfies one. Admissibility is decided by a
//! [`RuleSet`] layered over the grid's own neighbor oracle.
//!
//! The walk keeps a visited set and a step cap, so a goal with no
//! satisfying neighbor ends in [`Error::ChainExhausted`] instead of spinning.

use std::collections::BTreeSet;

use gridplan_core::{Cell, Environment, Error, Grid, Path, Result};

use crate::SearchSpace;
use crate::distance::manhattan;
use crate::traits::{AstarPather, Pather, WeightedPather};

// ---------------------------------------------------------------------------
// Goal conditions
// ---------------------------------------------------------------------------

/// The set of cells accepted as chain terminators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalConditions(BTreeSet<Cell>);

impl GoalConditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell. Returns `false` if it was already present.
    pub fn insert(&mut self, c: Cell) -> bool {
        self.0.insert(c)
    }

    #[inline]
    pub fn contains(&self, c: Cell) -> bool {
        self.0.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.0.iter().copied()
    }
}

impl<C: Into<Cell>> FromIterator<C> for GoalConditions {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A single admissibility test applied to candidate cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// The cell lies within the grid.
    InBounds,
    /// The cell is not blocked on the grid.
    Free,
    /// The cell is not in an extra obstacle set.
    Avoid(BTreeSet<Cell>),
}

impl Rule {
    pub fn admits(&self, grid: &Grid, c: Cell) -> bool {
        match self {
            Self::InBounds => grid.contains(c),
            Self::Free => grid.is_free(c),
            Self::Avoid(cells) => !cells.contains(&c),
        }
    }
}

/// An ordered conjunction of [`Rule`]s. A cell is admissible iff every rule
/// admits it; evaluation stops at the first rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl Default for RuleSet {
    /// In bounds and not blocked.
    fn default() -> Self {
        Self {
            rules: vec![Rule::InBounds, Rule::Free],
        }
    }
}

impl RuleSet {
    /// A rule set with no rules. It adds no restriction of its own; a
    /// [`RuledPather`] still only yields free in-bounds cells.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule (builder).
    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append an [`Rule::Avoid`] over the given cells (builder).
    pub fn avoiding(self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.with(Rule::Avoid(cells.into_iter().collect()))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn admits(&self, grid: &Grid, c: Cell) -> bool {
        self.rules.iter().all(|r| r.admits(grid, c))
    }
}

/// An environment whose neighbor oracle is further filtered by a rule set.
///
/// Rules only narrow the grid's free neighbours. Blocked and out-of-bounds
/// cells are never yielded, whatever the rules say.
///
/// Usable anywhere a [`Pather`] is expected, so A* can run under the same
/// rules the chainer uses.
#[derive(Debug, Clone, Copy)]
pub struct RuledPather<'a> {
    env: &'a Environment<'a>,
    rules: &'a RuleSet,
}

impl<'a> RuledPather<'a> {
    pub fn new(env: &'a Environment<'a>, rules: &'a RuleSet) -> Self {
        Self { env, rules }
    }

    pub fn env(&self) -> &'a Environment<'a> {
        self.env
    }
}

impl Pather for RuledPather<'_> {
    fn neighbors(&self, c: Cell, buf: &mut Vec<Cell>) {
        for n in c.neighbors_4() {
            if self.passable(n) {
                buf.push(n);
            }
        }
    }

    #[inline]
    fn passable(&self, c: Cell) -> bool {
        let grid = self.env.grid();
        grid.is_free(c) && self.rules.admits(grid, c)
    }
}

impl WeightedPather for RuledPather<'_> {
    #[inline]
    fn cost(&self, _from: Cell, _to: Cell) -> i32 {
        1
    }
}

impl AstarPather for RuledPather<'_> {
    #[inline]
    fn estimate(&self, from: Cell, to: Cell) -> i32 {
        manhattan(from, to)
    }
}

// ---------------------------------------------------------------------------
// Chaining
// ---------------------------------------------------------------------------

impl SearchSpace {
    /// Walk backward from the goal toward a cell satisfying `goals`.
    ///
    /// Returns the chain `[goal, ..., subgoal]`; if the goal already
    /// satisfies a condition the chain is just `[goal]`. Neighbors are
    /// scanned north, east, south, west and the first admissible, unvisited
    /// one that is a goal condition is taken.
    ///
    /// Fails with [`Error::OutOfBounds`] if a goal condition lies outside
    /// the grid, and with [`Error::ChainExhausted`] when no step is
    /// possible or the step cap is reached.
    pub fn chain(&mut self, pather: &RuledPather<'_>, goals: &GoalConditions) -> Result<Path> {
        let env = pather.env();
        let grid = env.grid();
        for c in goals.iter() {
            grid.check(c)?;
        }
        let goal = env.goal();
        let goal_idx = self.idx(goal)?;

        let limit = self.config.max_chain_steps.unwrap_or(self.bounds.len());
        self.visited.fill(false);
        self.visited[goal_idx] = true;

        let mut chain = vec![goal];
        let mut current = goal;
        let mut steps = 0;

        while !goals.contains(current) {
            if steps >= limit {
                log::warn!("backward chaining from {goal} hit the {limit} step cap");
                return Err(Error::ChainExhausted { goal, steps });
            }
            steps += 1;

            self.nbuf.clear();
            pather.neighbors(current, &mut self.nbuf);
            let next = self.nbuf.iter().copied().find(|&n| {
                goals.contains(n) && self.bounds.index(n).is_some_and(|i| !self.visited[i])
            });
            let Some(n) = next else {
                log::debug!("backward chaining from {goal} stuck at {current}");
                return Err(Error::ChainExhausted { goal, steps });
            };

            let ni = self.idx(n)?;
            self.visited[ni] = true;
            chain.push(n);
            current = n;
        }

        log::debug!("backward chain from {goal}: {chain:?}");
        Path::from_cells(chain).ok_or(Error::ChainExhausted { goal, steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlannerConfig;

    const MAP: &str = "\
...#.
##.#.
.....
.###.
.....";

    fn goals(cs: &[(i32, i32)]) -> GoalConditions {
        cs.iter().copied().collect()
    }

    #[test]
    fn chain_on_sample_map() {
        let g: Grid = MAP.parse().unwrap();
        let env = Environment::new(&g, Cell::new(0, 0), Cell::new(4, 4)).unwrap();
        let rules = RuleSet::default();
        let mut space = SearchSpace::new(g.bounds());
        let chain = space
            .chain(&RuledPather::new(&env, &rules), &goals(&[(3, 4), (2, 4)]))
            .unwrap();
        // North of the goal is scanned first.
        assert_eq!(chain.cells(), &[Cell::new(4, 4), Cell::new(3, 4)]);
    }

    #[test]
    fn goal_already_satisfies_condition() {
        let g = Grid::open(3, 3);
        let env = Environment::new(&g, Cell::new(0, 0), Cell::new(1, 1)).unwrap();
        let rules = RuleSet::default();
        let mut space = SearchSpace::new(g.bounds());
        let chain = space
            .chain(&RuledPather::new(&env, &rules), &goals(&[(1, 1)]))
            .unwrap();
        assert_eq!(chain, Path::single(Cell::new(1, 1)));
    }

    #[test]
    fn no_satisfying_neighbor_is_exhausted() {
        let g = Grid::open(5, 5);
        let env = Environment::new(&g, Cell::new(0, 0), Cell::new(4, 4)).unwrap();
        let rules = RuleSet::default();
        let mut space = SearchSpace::new(g.bounds());
        let err = space
            .chain(&RuledPather::new(&env, &rules), &goals(&[(0, 4)]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::ChainExhausted {
                goal: Cell::new(4, 4),
                steps: 1
            }
        );
    }

    #[test]
    fn empty_conditions_are_exhausted() {
        let g = Grid::open(2, 2);
        let env = Environment::new(&g, Cell::new(0, 0), Cell::new(1, 1)).unwrap();
        let rules = RuleSet::default();
        let mut space = SearchSpace::new(g.bounds());
        let err = space
            .chain(&RuledPather::new(&env, &rules), &GoalConditions::new())
            .unwrap_err();
        assert!(matches!(err, Error::ChainExhausted { .. }));
    }

    #[test]
    fn blocked_or_avoided_conditions_are_skipped() {
        let g: Grid = "...\n..#\n...".parse().unwrap();
        let env = Environment::new(&g, Cell::new(0, 0), Cell::new(2, 2)).unwrap();
        let conds = goals(&[(1, 2), (2, 1)]);
        let mut space = SearchSpace::new(g.bounds());

        // (1, 2) is blocked, so the west neighbor is taken.
        let rules = RuleSet::default();
        let chain = space.chain(&RuledPather::new(&env, &rules), &conds).unwrap();
        assert_eq!(chain.destination(), Cell::new(2, 1));

        // Avoiding (2, 1) as well leaves nothing.
        let rules = RuleSet::default().avoiding([Cell::new(2, 1)]);
        let err = space
            .chain(&RuledPather::new(&env, &rules), &conds)
            .unwrap_err();
        assert!(matches!(err, Error::ChainExhausted { .. }));
    }

    #[test]
    fn step_cap_is_honoured() {
        let g = Grid::open(3, 3);
        let env = Environment::new(&g, Cell::new(0, 0), Cell::new(1, 1)).unwrap();
        let rules = RuleSet::default();
        let mut space = SearchSpace::with_config(
            g.bounds(),
            PlannerConfig::default().with_max_chain_steps(0),
        );
        let err = space
            .chain(&RuledPather::new(&env, &rules), &goals(&[(0, 1)]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::ChainExhausted {
                goal: Cell::new(1, 1),
                steps: 0
            }
        );
    }

    #[test]
    fn out_of_bounds_condition_is_rejected() {
        let g = Grid::open(3, 3);
        let env = Environment::new(&g, Cell::new(0, 0), Cell::new(1, 1)).unwrap();
        let rules = RuleSet::default();
        let mut space = SearchSpace::new(g.bounds());
        let err = space
            .chain(&RuledPather::new(&env, &rules), &goals(&[(0, 1), (7, 7)]))
            .unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { .. }));
    }

    #[test]
    fn rules_compose() {
        let g: Grid = ".#\n..".parse().unwrap();
        let rules = RuleSet::default().avoiding([Cell::new(1, 1)]);
        assert!(rules.admits(&g, Cell::new(0, 0)));
        assert!(!rules.admits(&g, Cell::new(0, 1)));
        assert!(!rules.admits(&g, Cell::new(1, 1)));
        assert!(!rules.admits(&g, Cell::new(2, 0)));
        assert!(RuleSet::empty().admits(&g, Cell::new(0, 1)));
        assert_eq!(rules.rules().len(), 3);
    }

    #[test]
    fn ruled_pather_restricts_search() {
        let g = Grid::open(3, 3);
        let env = Environment::new(&g, Cell::new(0, 0), Cell::new(0, 2)).unwrap();
        let rules = RuleSet::default().avoiding([Cell::new(0, 1), Cell::new(1, 1)]);
        let mut space = SearchSpace::new(g.bounds());
        let p = space
            .astar_path(&RuledPather::new(&env, &rules), env.start(), env.goal())
            .unwrap();
        assert_eq!(p.edges(), 6);
        assert!(!p.contains(&Cell::new(0, 1)));
        assert!(!p.contains(&Cell::new(1, 1)));
    }

    #[test]
    fn empty_rules_still_respect_the_grid() {
        let g: Grid = ".#\n..".parse().unwrap();
        let env = Environment::new(&g, Cell::new(0, 0), Cell::new(1, 1)).unwrap();
        let rules = RuleSet::empty();
        let pather = RuledPather::new(&env, &rules);
        let mut buf = Vec::new();
        pather.neighbors(Cell::new(0, 0), &mut buf);
        assert_eq!(buf, vec![Cell::new(1, 0)]);
        assert!(!pather.passable(Cell::new(0, 1)));
        assert!(!pather.passable(Cell::new(2, 0)));
    }

    #[test]
    fn avoided_endpoint_is_not_found() {
        let g = Grid::open(3, 3);
        let env = Environment::new(&g, Cell::new(0, 0), Cell::new(2, 2)).unwrap();
        let rules = RuleSet::default().avoiding([Cell::new(0, 0)]);
        let mut space = SearchSpace::new(g.bounds());
        assert_eq!(
            space.astar_path(&RuledPather::new(&env, &rules), env.start(), env.goal()),
            Err(Error::NotFound {
                from: Cell::new(0, 0),
                to: Cell::new(2, 2)
            })
        );
    }
}
