//! **gridplan-core** — core types for grid motion planning.
//!
//! This crate provides the data model shared by the planners in
//! `gridplan-paths`: cell coordinates and grid extents, the occupancy grid,
//! paths, the per-request [`Environment`], and the error taxonomy.

pub mod env;
pub mod error;
pub mod geom;
pub mod grid;
pub mod path;

pub use env::Environment;
pub use error::{Error, Result};
pub use geom::{Bounds, Cell};
pub use grid::{Grid, Occupancy};
pub use path::Path;
