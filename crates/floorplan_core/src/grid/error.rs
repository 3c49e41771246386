//! Layout error taxonomy.

use crate::geometry::rect::GridRect;
use crate::model::layout::GridSize;
use crate::model::unit::UnitId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LayoutResult<T> = Result<T, LayoutError>;

/// Rejection of one layout operation.
///
/// Every variant carries the rejected input. A returned error always means
/// the model was left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Footprint overlaps another unit on the same floor.
    Collision {
        unit_id: UnitId,
        floor: i32,
        rect: GridRect,
        conflicting_id: UnitId,
    },
    /// Footprint leaves the grid or has non-positive extent.
    OutOfBounds {
        unit_id: UnitId,
        rect: GridRect,
        grid: GridSize,
    },
    LockedUnit(UnitId),
    NotFound(UnitId),
    DuplicateId(UnitId),
    /// Structurally invalid layout or document.
    SchemaValidation(String),
    /// Document text is not parseable at all.
    Parse(String),
}

impl LayoutError {
    /// Stable code used in log events and FFI messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Collision { .. } => "collision",
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::LockedUnit(_) => "locked_unit",
            Self::NotFound(_) => "not_found",
            Self::DuplicateId(_) => "duplicate_id",
            Self::SchemaValidation(_) => "schema_validation",
            Self::Parse(_) => "parse",
        }
    }
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collision {
                unit_id,
                floor,
                rect,
                conflicting_id,
            } => write!(
                f,
                "unit {unit_id} at {rect} collides with unit {conflicting_id} on floor {floor}"
            ),
            Self::OutOfBounds {
                unit_id,
                rect,
                grid,
            } => write!(f, "unit {unit_id} at {rect} is outside grid {grid}"),
            Self::LockedUnit(id) => write!(f, "unit is locked: {id}"),
            Self::NotFound(id) => write!(f, "unit not found: {id}"),
            Self::DuplicateId(id) => write!(f, "duplicate unit id: {id}"),
            Self::SchemaValidation(message) => write!(f, "invalid layout: {message}"),
            Self::Parse(message) => write!(f, "layout document parse error: {message}"),
        }
    }
}

impl Error for LayoutError {}
