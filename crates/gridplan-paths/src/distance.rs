use gridplan_core::Cell;

/// Manhattan (L1) distance between two cells.
///
/// Admissible and consistent for unit-cost 4-connected movement: every step
/// changes the distance to any target by exactly one. Saturates at
/// `i32::MAX` for cells too far apart to represent.
#[inline]
pub fn manhattan(a: Cell, b: Cell) -> i32 {
    let d = a.row.abs_diff(b.row).saturating_add(a.col.abs_diff(b.col));
    i32::try_from(d).unwrap_or(i32::MAX)
}
