//! The [`Path`] type — an ordered, non-empty walk over grid cells.

use std::fmt;
use std::ops::Deref;

use crate::geom::Cell;
use crate::grid::Grid;

/// An ordered sequence of cells from a source to a destination.
///
/// A path always holds at least one cell; a single-cell path means the
/// source is the destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Path(Vec<Cell>);

impl Path {
    /// A path consisting of one cell.
    pub fn single(c: Cell) -> Self {
        Self(vec![c])
    }

    /// Wrap a list of cells. Returns `None` if `cells` is empty.
    pub fn from_cells(cells: Vec<Cell>) -> Option<Self> {
        if cells.is_empty() { None } else { Some(Self(cells)) }
    }

    /// First cell.
    #[inline]
    pub fn source(&self) -> Cell {
        self.0[0]
    }

    /// Last cell.
    #[inline]
    pub fn destination(&self) -> Cell {
        self.0[self.0.len() - 1]
    }

    /// Number of steps (cells minus one).
    #[inline]
    pub fn edges(&self) -> usize {
        self.0.len() - 1
    }

    /// The cells of the path.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    /// Append `next`, which must start where this path ends. The shared
    /// cell appears once in the result.
    /// Returns `None` if the endpoints do not meet.
    pub fn join(mut self, next: &Path) -> Option<Path> {
        if next.source() != self.destination() {
            return None;
        }
        self.0.extend_from_slice(&next.0[1..]);
        Some(self)
    }

    /// Whether every cell is free on `grid` and consecutive cells are
    /// 4-adjacent.
    pub fn is_valid_on(&self, grid: &Grid) -> bool {
        self.0.iter().all(|&c| grid.is_free(c))
            && self.0.windows(2).all(|w| w[0].is_adjacent(w[1]))
    }
}

impl Deref for Path {
    type Target = [Cell];

    fn deref(&self) -> &[Cell] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}
