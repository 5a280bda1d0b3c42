use gridplan_core::{Bounds, Cell, Error, Result};

use crate::config::{CancelToken, PlannerConfig};

/// A cell with an associated cost, returned from BFS map queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    pub pos: Cell,
    pub cost: i32,
}

// ---------------------------------------------------------------------------
// Internal node for A* priority-queue searches
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) g: i32,
    pub(crate) f: i32,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) open: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: 0,
            f: 0,
            parent: usize::MAX,
            generation: 0,
            open: false,
        }
    }
}

/// Queue entry. The heap pops the smallest `(f, cell)` first: lower cost
/// estimate wins, and equal estimates go to the row-major smaller cell.
#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) f: i32,
    pub(crate) cell: Cell,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest first.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Sentinel value meaning "unreachable" in BFS maps.
pub const UNREACHABLE: i32 = i32::MAX;

// ---------------------------------------------------------------------------
// SearchSpace
// ---------------------------------------------------------------------------

/// Central coordinator for planning on a grid of a given size.
///
/// `SearchSpace` owns the per-search state (node array with `g` values and
/// predecessors, BFS maps, neighbor buffers) so that repeated queries over
/// grids of the same size reuse their allocations. The state of one call is
/// invalidated by bumping a generation counter rather than clearing.
pub struct SearchSpace {
    pub(crate) bounds: Bounds,
    pub(crate) config: PlannerConfig,
    pub(crate) cancel: Option<CancelToken>,
    // A* caches
    pub(crate) nodes: Vec<Node>,
    pub(crate) generation: u32,
    // BFS caches
    pub(crate) bfs_map: Vec<i32>,
    pub(crate) bfs_results: Vec<PathNode>,
    // backward chaining
    pub(crate) visited: Vec<bool>,
    // shared scratch buffer for neighbor queries
    pub(crate) nbuf: Vec<Cell>,
}

impl SearchSpace {
    /// Create a new `SearchSpace` for grids with the given extents.
    pub fn new(bounds: Bounds) -> Self {
        Self::with_config(bounds, PlannerConfig::default())
    }

    /// Create a new `SearchSpace` with explicit limits.
    pub fn with_config(bounds: Bounds, config: PlannerConfig) -> Self {
        let len = bounds.len();
        Self {
            bounds,
            config,
            cancel: None,
            nodes: vec![Node::default(); len],
            generation: 0,
            bfs_map: vec![UNREACHABLE; len],
            bfs_results: Vec::new(),
            visited: vec![false; len],
            nbuf: Vec::with_capacity(4),
        }
    }

    /// Attach a cancellation token checked between queue pops (builder).
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The grid extents being used.
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn config(&self) -> PlannerConfig {
        self.config
    }

    pub fn set_config(&mut self, config: PlannerConfig) {
        self.config = config;
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Flat index of `c`, or [`Error::OutOfBounds`].
    #[inline]
    pub(crate) fn idx(&self, c: Cell) -> Result<usize> {
        self.bounds.index(c).ok_or(Error::OutOfBounds {
            cell: c,
            bounds: self.bounds,
        })
    }

    #[inline]
    pub(crate) fn cell(&self, idx: usize) -> Cell {
        self.bounds.cell(idx)
    }

    /// Start a new A* generation, resetting the node array on wrap-around.
    pub(crate) fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.nodes.fill(Node::default());
            self.generation = 1;
        }
        self.generation
    }

    /// Fail if the caller cancelled or the expansion budget is spent.
    pub(crate) fn check_limits(&self, expansions: usize) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            log::warn!("search cancelled after {expansions} expansions");
            return Err(Error::Cancelled);
        }
        if let Some(max) = self.config.max_expansions {
            if expansions >= max {
                log::warn!("search budget of {max} expansions exhausted");
                return Err(Error::BudgetExceeded { expansions });
            }
        }
        Ok(())
    }
}
