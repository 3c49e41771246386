//! Facility layout containers.
//!
//! # Responsibility
//! - Define the global grid extent shared by every floor.
//! - Describe static infrastructure overlays drawn under units.
//! - Carry a full layout between the serializer and `GridModel`.
//!
//! # Invariants
//! - `GridSize` applies to every floor; floors never have their own extent.
//! - Infrastructure is reference geometry only and never takes part in
//!   unit collision checks.

use crate::geometry::rect::GridRect;
use crate::model::unit::Unit;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Global grid extent in whole grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: u32,
    pub cols: u32,
}

impl GridSize {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(30, 40)
    }
}

impl Display for GridSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Kind of static infrastructure overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureKind {
    Aisle,
    Entrance,
    Elevator,
}

/// Read-only reference geometry on one floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infrastructure {
    pub kind: InfrastructureKind,
    pub floor: i32,
    pub rect: GridRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Full layout payload used for wholesale replacement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityLayout {
    pub grid_size: GridSize,
    pub units: Vec<Unit>,
    pub infrastructure: Vec<Infrastructure>,
}

impl FacilityLayout {
    pub fn new(grid_size: GridSize) -> Self {
        Self {
            grid_size,
            units: Vec::new(),
            infrastructure: Vec::new(),
        }
    }
}
