//! Storage unit domain model.
//!
//! # Responsibility
//! - Define the canonical rectangular unit record placed on a floor grid.
//! - Map unit status to its display style without fallback branches.
//! - Derive physical and grid extents from standard size categories.
//!
//! # Invariants
//! - `id` is non-nil, stable, and never reused for another unit.
//! - `width` and `height` are strictly positive.
//! - `position` is non-negative on both axes.
//! - Collaborator-owned attributes are carried verbatim and never interpreted.

use crate::model::coord::{GridPoint, HalfGrid};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a storage unit.
pub type UnitId = Uuid;

/// Physical feet covered by one grid unit.
pub const FEET_PER_GRID_UNIT: f64 = 5.0;

/// Document keys owned by the layout schema; never valid as attributes.
const SCHEMA_KEYS: &[&str] = &[
    "id",
    "unitNumber",
    "floor",
    "position",
    "width",
    "height",
    "realWidth",
    "realHeight",
    "status",
    "locked",
    "features",
];

/// Returns whether `key` can be stored as a passthrough attribute.
pub fn is_attribute_key(key: &str) -> bool {
    !key.trim().is_empty() && !SCHEMA_KEYS.contains(&key)
}

/// Rental state of a unit. Drives color/pattern only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
    Reserved,
}

/// Fill pattern used when drawing a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPattern {
    Solid,
    Hatched,
    Dotted,
    Striped,
}

/// Display style for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub fill: &'static str,
    pub border: &'static str,
    pub pattern: FillPattern,
}

impl UnitStatus {
    pub const ALL: [UnitStatus; 4] = [
        UnitStatus::Available,
        UnitStatus::Occupied,
        UnitStatus::Maintenance,
        UnitStatus::Reserved,
    ];

    /// Stable wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Maintenance => "maintenance",
            Self::Reserved => "reserved",
        }
    }

    /// Parses a wire label. Unknown labels are rejected, never defaulted.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "available" => Some(Self::Available),
            "occupied" => Some(Self::Occupied),
            "maintenance" => Some(Self::Maintenance),
            "reserved" => Some(Self::Reserved),
            _ => None,
        }
    }

    pub fn style(self) -> StatusStyle {
        match self {
            Self::Available => StatusStyle {
                fill: "#22c55e",
                border: "#15803d",
                pattern: FillPattern::Solid,
            },
            Self::Occupied => StatusStyle {
                fill: "#3b82f6",
                border: "#1d4ed8",
                pattern: FillPattern::Solid,
            },
            Self::Maintenance => StatusStyle {
                fill: "#f59e0b",
                border: "#b45309",
                pattern: FillPattern::Hatched,
            },
            Self::Reserved => StatusStyle {
                fill: "#a855f7",
                border: "#7e22ce",
                pattern: FillPattern::Striped,
            },
        }
    }
}

impl Display for UnitStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard unit sizes offered by the facility, in feet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeCategory {
    Small5x5,
    Small5x10,
    Medium10x10,
    Medium10x15,
    Large10x20,
    Large10x30,
    /// Custom physical size override.
    Custom { real_width: f64, real_height: f64 },
}

impl SizeCategory {
    pub const STANDARD: [SizeCategory; 6] = [
        SizeCategory::Small5x5,
        SizeCategory::Small5x10,
        SizeCategory::Medium10x10,
        SizeCategory::Medium10x15,
        SizeCategory::Large10x20,
        SizeCategory::Large10x30,
    ];

    /// Physical `(width, height)` in feet.
    pub fn real_size(self) -> (f64, f64) {
        match self {
            Self::Small5x5 => (5.0, 5.0),
            Self::Small5x10 => (5.0, 10.0),
            Self::Medium10x10 => (10.0, 10.0),
            Self::Medium10x15 => (10.0, 15.0),
            Self::Large10x20 => (10.0, 20.0),
            Self::Large10x30 => (10.0, 30.0),
            Self::Custom {
                real_width,
                real_height,
            } => (real_width, real_height),
        }
    }

    /// Grid `(width, height)` covering the physical size.
    ///
    /// Rounds up to half-grid resolution. Returns `None` when the physical
    /// size is not a positive finite number.
    pub fn grid_extent(self) -> Option<(HalfGrid, HalfGrid)> {
        let (real_width, real_height) = self.real_size();
        Some((feet_to_grid(real_width)?, feet_to_grid(real_height)?))
    }

    /// Short label such as `10x20`.
    pub fn label(self) -> String {
        let (w, h) = self.real_size();
        format!("{w}x{h}")
    }
}

fn feet_to_grid(feet: f64) -> Option<HalfGrid> {
    if !feet.is_finite() || feet <= 0.0 {
        return None;
    }
    let halves = (feet / FEET_PER_GRID_UNIT * 2.0).ceil();
    HalfGrid::from_f64_exact(halves / 2.0)
}

/// Validation failures for a single unit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitValidationError {
    NilId,
    NonPositiveExtent {
        width: HalfGrid,
        height: HalfGrid,
    },
    NegativePosition(GridPoint),
}

impl Display for UnitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "unit id must not be nil"),
            Self::NonPositiveExtent { width, height } => {
                write!(f, "unit extent must be positive, got {width}x{height}")
            }
            Self::NegativePosition(position) => {
                write!(f, "unit position must be non-negative, got {position}")
            }
        }
    }
}

impl Error for UnitValidationError {}

/// Canonical storage unit record.
///
/// Serialized in camelCase to match the layout document schema. Unknown
/// document keys land in `attributes` and are written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub unit_number: String,
    pub floor: i32,
    pub position: GridPoint,
    pub width: HalfGrid,
    pub height: HalfGrid,
    /// Feet. Informational only.
    pub real_width: f64,
    /// Feet. Informational only.
    pub real_height: f64,
    pub status: UnitStatus,
    pub locked: bool,
    pub features: BTreeSet<String>,
    /// Collaborator-owned passthrough fields (rate, customer, notes, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Unit {
    /// Creates an available, unlocked unit with a generated ID.
    ///
    /// Physical size is derived from the grid extent at
    /// `FEET_PER_GRID_UNIT`; use `with_size_category` for catalog sizes.
    pub fn new(
        unit_number: impl Into<String>,
        floor: i32,
        position: GridPoint,
        width: HalfGrid,
        height: HalfGrid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            unit_number: unit_number.into(),
            floor,
            position,
            width,
            height,
            real_width: width.to_f64() * FEET_PER_GRID_UNIT,
            real_height: height.to_f64() * FEET_PER_GRID_UNIT,
            status: UnitStatus::Available,
            locked: false,
            features: BTreeSet::new(),
            attributes: Map::new(),
        }
    }

    /// Creates a unit with a caller-provided stable ID.
    ///
    /// Used by import and seeded generation where identity already exists.
    pub fn with_id(
        id: UnitId,
        unit_number: impl Into<String>,
        floor: i32,
        position: GridPoint,
        width: HalfGrid,
        height: HalfGrid,
    ) -> Result<Self, UnitValidationError> {
        if id.is_nil() {
            return Err(UnitValidationError::NilId);
        }
        let mut unit = Self::new(unit_number, floor, position, width, height);
        unit.id = id;
        Ok(unit)
    }

    /// Creates a unit sized from a catalog category.
    ///
    /// Returns `None` for custom sizes that are not positive and finite.
    pub fn with_size_category(
        unit_number: impl Into<String>,
        floor: i32,
        position: GridPoint,
        size: SizeCategory,
    ) -> Option<Self> {
        let (width, height) = size.grid_extent()?;
        let (real_width, real_height) = size.real_size();
        let mut unit = Self::new(unit_number, floor, position, width, height);
        unit.real_width = real_width;
        unit.real_height = real_height;
        Some(unit)
    }

    /// Validates record-level invariants that do not depend on other units.
    pub fn validate(&self) -> Result<(), UnitValidationError> {
        if self.id.is_nil() {
            return Err(UnitValidationError::NilId);
        }
        if !self.width.is_positive() || !self.height.is_positive() {
            return Err(UnitValidationError::NonPositiveExtent {
                width: self.width,
                height: self.height,
            });
        }
        if self.position.x.is_negative() || self.position.y.is_negative() {
            return Err(UnitValidationError::NegativePosition(self.position));
        }
        Ok(())
    }

    pub fn style(&self) -> StatusStyle {
        self.status.style()
    }
}

/// Non-geometric changes applied by `GridModel::update_unit`.
///
/// `None` leaves a field untouched. Attribute entries set to `Value::Null`
/// remove the key; keys that collide with schema fields are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitPatch {
    pub unit_number: Option<String>,
    pub status: Option<UnitStatus>,
    pub locked: Option<bool>,
    pub features: Option<BTreeSet<String>>,
    pub attributes: Map<String, Value>,
}

impl UnitPatch {
    pub fn is_empty(&self) -> bool {
        self.unit_number.is_none()
            && self.status.is_none()
            && self.locked.is_none()
            && self.features.is_none()
            && self.attributes.is_empty()
    }

    pub(crate) fn apply_to(&self, unit: &mut Unit) {
        if let Some(unit_number) = &self.unit_number {
            unit.unit_number = unit_number.clone();
        }
        if let Some(status) = self.status {
            unit.status = status;
        }
        if let Some(locked) = self.locked {
            unit.locked = locked;
        }
        if let Some(features) = &self.features {
            unit.features = features.clone();
        }
        for (key, value) in &self.attributes {
            if !is_attribute_key(key) {
                continue;
            }
            if value.is_null() {
                unit.attributes.remove(key);
            } else {
                unit.attributes.insert(key.clone(), value.clone());
            }
        }
    }
}
