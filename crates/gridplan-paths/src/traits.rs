use gridplan_core::{Cell, Environment, Grid};

use crate::distance::manhattan;

/// Minimal pathfinding interface — provides neighbor enumeration.
pub trait Pather {
    /// Append neighbors of `c` into `buf`. The caller clears `buf` before calling.
    ///
    /// The order must be the same on every call for a given `c`; search
    /// results depend on it.
    fn neighbors(&self, c: Cell, buf: &mut Vec<Cell>);

    /// Whether a path may occupy `c`. Searches reject endpoints that are not
    /// passable, so every returned path stays on passable cells.
    fn passable(&self, c: Cell) -> bool;
}

/// Pather with weighted (positive-cost) edges.
pub trait WeightedPather: Pather {
    /// Cost of moving from `from` to adjacent `to`. Must be > 0.
    fn cost(&self, from: Cell, to: Cell) -> i32;
}

/// Full A* pather with an admissible heuristic.
pub trait AstarPather: WeightedPather {
    /// Heuristic estimate of distance from `from` to `to`.
    /// Must never overestimate the true cost (admissible), and must be
    /// consistent for the search to return shortest paths.
    fn estimate(&self, from: Cell, to: Cell) -> i32;
}

// ---------------------------------------------------------------------------
// Unit-cost 4-connected movement over an occupancy grid
// ---------------------------------------------------------------------------

impl Pather for Grid {
    fn neighbors(&self, c: Cell, buf: &mut Vec<Cell>) {
        for n in c.neighbors_4() {
            if self.is_free(n) {
                buf.push(n);
            }
        }
    }

    #[inline]
    fn passable(&self, c: Cell) -> bool {
        self.is_free(c)
    }
}

impl WeightedPather for Grid {
    #[inline]
    fn cost(&self, _from: Cell, _to: Cell) -> i32 {
        1
    }
}

impl AstarPather for Grid {
    #[inline]
    fn estimate(&self, from: Cell, to: Cell) -> i32 {
        manhattan(from, to)
    }
}

impl Pather for Environment<'_> {
    fn neighbors(&self, c: Cell, buf: &mut Vec<Cell>) {
        Pather::neighbors(self.grid(), c, buf);
    }

    #[inline]
    fn passable(&self, c: Cell) -> bool {
        self.grid().is_free(c)
    }
}

impl WeightedPather for Environment<'_> {
    #[inline]
    fn cost(&self, _from: Cell, _to: Cell) -> i32 {
        1
    }
}

impl AstarPather for Environment<'_> {
    #[inline]
    fn estimate(&self, from: Cell, to: Cell) -> i32 {
        manhattan(from, to)
    }
}
