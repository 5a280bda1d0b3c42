//! The [`Environment`] — one planning request over a borrowed grid.

use crate::error::Result;
use crate::geom::{Bounds, Cell};
use crate::grid::Grid;

/// A grid plus a designated start and goal.
///
/// Constructed once per planning request and immutable afterwards. The grid
/// is borrowed, so it cannot change while a search runs over it.
#[derive(Debug, Clone, Copy)]
pub struct Environment<'g> {
    grid: &'g Grid,
    start: Cell,
    goal: Cell,
}

impl<'g> Environment<'g> {
    /// Fails with [`Error::OutOfBounds`](crate::Error::OutOfBounds) if
    /// `start` or `goal` lies outside the grid.
    ///
    /// Blocked endpoints are accepted; searches touching them simply find no
    /// path.
    pub fn new(grid: &'g Grid, start: Cell, goal: Cell) -> Result<Self> {
        grid.check(start)?;
        grid.check(goal)?;
        Ok(Self { grid, start, goal })
    }

    #[inline]
    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.grid.bounds()
    }

    #[inline]
    pub fn start(&self) -> Cell {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// Free in-bounds neighbours of `c`, north, east, south, west.
    #[inline]
    pub fn neighbors(&self, c: Cell) -> Vec<Cell> {
        self.grid.neighbors(c)
    }
}
