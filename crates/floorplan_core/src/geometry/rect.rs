//! Axis-aligned grid rectangles.

use crate::model::coord::{GridPoint, HalfGrid};
use crate::model::unit::Unit;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Axis-aligned rectangle in half-grid fixed-point coordinates.
///
/// Covers the half-open area `[x, x + width) × [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x: HalfGrid,
    pub y: HalfGrid,
    pub width: HalfGrid,
    pub height: HalfGrid,
}

impl GridRect {
    pub const fn new(origin: GridPoint, width: HalfGrid, height: HalfGrid) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width,
            height,
        }
    }

    /// Footprint of a unit at its committed position.
    pub fn of_unit(unit: &Unit) -> Self {
        Self::new(unit.position, unit.width, unit.height)
    }

    /// Footprint of a unit if it were moved to `position`.
    pub fn of_unit_at(unit: &Unit, position: GridPoint) -> Self {
        Self::new(position, unit.width, unit.height)
    }

    pub fn origin(&self) -> GridPoint {
        GridPoint::new(self.x, self.y)
    }

    pub fn x2(&self) -> HalfGrid {
        self.x + self.width
    }

    pub fn y2(&self) -> HalfGrid {
        self.y + self.height
    }

    /// Far corner, or `None` when the rectangle reaches past `i64` range.
    pub fn checked_far_corner(&self) -> Option<GridPoint> {
        Some(GridPoint::new(
            self.x.checked_add(self.width)?,
            self.y.checked_add(self.height)?,
        ))
    }

    pub fn has_positive_extent(&self) -> bool {
        self.width.is_positive() && self.height.is_positive()
    }
}

impl Display for GridRect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {} {}x{}]",
            self.x, self.y, self.width, self.height
        )
    }
}
