//! Pure collision and bounds predicates.
//!
//! # Responsibility
//! - Decide whether two unit footprints overlap.
//! - Decide whether a footprint lies inside the facility grid.
//!
//! # Invariants
//! - Rectangles are half-open: units sharing an edge do not overlap.
//! - Predicates never mutate and never allocate.

use crate::geometry::rect::GridRect;
use crate::model::coord::HalfGrid;
use crate::model::layout::GridSize;
use crate::model::unit::{Unit, UnitId};

/// Returns whether two rectangles share interior area.
///
/// Touching edges (`a.x2 == b.x1`) are not an overlap.
pub fn overlaps(a: &GridRect, b: &GridRect) -> bool {
    !(a.x2() <= b.x || a.x >= b.x2() || a.y2() <= b.y || a.y >= b.y2())
}

/// Returns whether `rect` has positive extent and fits inside `grid`.
///
/// A rectangle whose far corner overflows is out of bounds.
pub fn within_bounds(rect: &GridRect, grid: GridSize) -> bool {
    if !rect.has_positive_extent() || rect.x.is_negative() || rect.y.is_negative() {
        return false;
    }
    match rect.checked_far_corner() {
        Some(far) => {
            far.x <= HalfGrid::from_units(i64::from(grid.cols))
                && far.y <= HalfGrid::from_units(i64::from(grid.rows))
        }
        None => false,
    }
}

/// Returns the id of some unit overlapping `candidate`, skipping `exclude`.
///
/// Callers pass units of a single floor. No ordering guarantee on which
/// conflicting unit is reported.
pub fn first_collision<'a>(
    candidate: &GridRect,
    floor_units: impl IntoIterator<Item = &'a Unit>,
    exclude: Option<UnitId>,
) -> Option<UnitId> {
    floor_units
        .into_iter()
        .filter(|unit| Some(unit.id) != exclude)
        .find(|unit| overlaps(candidate, &GridRect::of_unit(unit)))
        .map(|unit| unit.id)
}

/// Returns whether any unit except `exclude` overlaps `candidate`.
pub fn any_collision<'a>(
    candidate: &GridRect,
    floor_units: impl IntoIterator<Item = &'a Unit>,
    exclude: Option<UnitId>,
) -> bool {
    first_collision(candidate, floor_units, exclude).is_some()
}
