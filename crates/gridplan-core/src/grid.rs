//! Occupancy grid used as the planning map.
//!
//! A [`Grid`] is a rectangular array of [`Occupancy`] values. It is built
//! once by the caller and only borrowed by the planners, so a search always
//! sees an immutable snapshot.
//!
//! The text form is one line per row, `.` or `0` for a free cell and `#` or
//! `1` for a blocked one:
//!
//! ```text
//! ...#.
//! ##.#.
//! .....
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::geom::{Bounds, Cell};

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Occupancy {
    #[default]
    Free,
    Blocked,
}

impl Occupancy {
    /// Whether a path may pass through this cell.
    #[inline]
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

impl From<u8> for Occupancy {
    /// 0 is free; every other value is treated as blocked.
    fn from(v: u8) -> Self {
        if v == 0 { Self::Free } else { Self::Blocked }
    }
}

impl From<Occupancy> for u8 {
    fn from(o: Occupancy) -> Self {
        match o {
            Occupancy::Free => 0,
            Occupancy::Blocked => 1,
        }
    }
}

/// A rectangular 2D occupancy grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    cells: Vec<Occupancy>,
    bounds: Bounds,
}

impl Grid {
    /// Build a grid from occupancy rows (0 = free, non-zero = blocked).
    ///
    /// Fails with [`Error::InvalidGrid`] if the rows differ in length.
    pub fn new(rows: Vec<Vec<u8>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidGrid {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            cells.extend(row.iter().map(|&v| Occupancy::from(v)));
        }
        Ok(Self {
            cells,
            bounds: Bounds::new(rows.len() as i32, cols as i32),
        })
    }

    /// Create an all-free grid.
    pub fn open(rows: i32, cols: i32) -> Self {
        let bounds = Bounds::new(rows, cols);
        Self {
            cells: vec![Occupancy::Free; bounds.len()],
            bounds,
        }
    }

    /// Create a grid with the given cells blocked.
    pub fn with_obstacles(
        rows: i32,
        cols: i32,
        obstacles: impl IntoIterator<Item = Cell>,
    ) -> Result<Self> {
        let mut grid = Self::open(rows, cols);
        for c in obstacles {
            grid.set(c, Occupancy::Blocked)?;
        }
        Ok(grid)
    }

    /// Returns the extents of this grid.
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> i32 {
        self.bounds.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> i32 {
        self.bounds.cols
    }

    /// Whether the grid contains the given cell.
    #[inline]
    pub fn contains(&self, c: Cell) -> bool {
        self.bounds.contains(c)
    }

    /// Fail with [`Error::OutOfBounds`] unless `c` is inside the grid.
    pub fn check(&self, c: Cell) -> Result<Cell> {
        if self.contains(c) {
            Ok(c)
        } else {
            Err(Error::OutOfBounds {
                cell: c,
                bounds: self.bounds,
            })
        }
    }

    /// Get the occupancy at a cell, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, c: Cell) -> Option<Occupancy> {
        self.bounds.index(c).map(|i| self.cells[i])
    }

    /// Whether `c` is in bounds and free.
    #[inline]
    pub fn is_free(&self, c: Cell) -> bool {
        self.at(c).is_some_and(Occupancy::is_free)
    }

    /// Set the occupancy of a cell.
    pub fn set(&mut self, c: Cell, o: Occupancy) -> Result<()> {
        let i = self.bounds.index(c).ok_or(Error::OutOfBounds {
            cell: c,
            bounds: self.bounds,
        })?;
        self.cells[i] = o;
        Ok(())
    }

    /// Free in-bounds neighbours of `c` in north, east, south, west order.
    pub fn neighbors(&self, c: Cell) -> Vec<Cell> {
        c.neighbors_4()
            .filter(|&n| self.is_free(n))
            .collect()
    }

    /// Iterate over all cells with their occupancy, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Occupancy)> + '_ {
        self.bounds.iter().zip(self.cells.iter().copied())
    }

    /// Iterate over the free cells, row-major.
    pub fn free_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.iter().filter(|(_, o)| o.is_free()).map(|(c, _)| c)
    }

    /// Occupancy as rows of 0/1 values.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        if self.bounds.is_empty() {
            return vec![Vec::new(); self.bounds.rows as usize];
        }
        self.cells
            .chunks(self.bounds.cols as usize)
            .map(|row| row.iter().map(|&o| u8::from(o)).collect())
            .collect()
    }
}

impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for line in s.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()) {
            let r = rows.len() as i32;
            let row = line
                .trim_start()
                .chars()
                .enumerate()
                .map(|(c, ch)| match ch {
                    '.' | '0' => Ok(0),
                    '#' | '1' => Ok(1),
                    _ => Err(Error::InvalidCell {
                        ch,
                        cell: Cell::new(r, c as i32),
                    }),
                })
                .collect::<Result<Vec<u8>>>()?;
            rows.push(row);
        }
        Self::new(rows)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                let ch = if self.is_free(Cell::new(row, col)) { '.' } else { '#' };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
