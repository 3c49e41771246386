//! Fixed-point grid coordinates.
//!
//! # Responsibility
//! - Store every position and extent at half-grid-unit resolution.
//! - Convert to/from `f64` only at viewport and document boundaries.
//!
//! # Invariants
//! - `HalfGrid` holds an integer count of half grid units; arithmetic on it
//!   never drifts across repeated drags.
//! - Values decoded from documents must be exact multiples of 0.5.
//! - `+`/`-` saturate at the `i64` range; bounds checks use `checked_add`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::ops::{Add, Sub};

/// Number of storage steps per grid unit.
pub const HALF_GRID_SCALE: i64 = 2;

/// Largest magnitude accepted when converting from `f64`.
///
/// Keeps `f64 -> i64` conversion exact and far from overflow.
const MAX_ABS_HALVES: f64 = 1e12;

/// Grid-space scalar stored as an integer number of half grid units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HalfGrid(i64);

impl HalfGrid {
    pub const ZERO: Self = Self(0);

    /// Creates a value from a raw half-unit count.
    pub const fn from_halves(halves: i64) -> Self {
        Self(halves)
    }

    /// Creates a value from whole grid units.
    pub const fn from_units(units: i64) -> Self {
        Self(units * HALF_GRID_SCALE)
    }

    /// Raw half-unit count.
    pub const fn halves(self) -> i64 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / HALF_GRID_SCALE as f64
    }

    /// Converts an `f64` that is already an exact multiple of 0.5.
    ///
    /// Returns `None` for non-finite, off-grid, or out-of-range input.
    pub fn from_f64_exact(value: f64) -> Option<Self> {
        let scaled = scale_checked(value)?;
        if scaled.fract() != 0.0 {
            return None;
        }
        Some(Self(scaled as i64))
    }

    /// Rounds an `f64` to the nearest half grid unit.
    ///
    /// Ties round away from zero. Returns `None` for non-finite or
    /// out-of-range input.
    pub fn round_from_f64(value: f64) -> Option<Self> {
        let scaled = scale_checked(value)?;
        Some(Self(scaled.round() as i64))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Sum that reports overflow instead of wrapping or panicking.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

fn scale_checked(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let scaled = value * HALF_GRID_SCALE as f64;
    if scaled.abs() > MAX_ABS_HALVES {
        return None;
    }
    Some(scaled)
}

impl Add for HalfGrid {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for HalfGrid {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Display for HalfGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / HALF_GRID_SCALE;
        let rem = self.0 % HALF_GRID_SCALE;
        match rem {
            0 => write!(f, "{whole}"),
            _ if self.0 < 0 && whole == 0 => write!(f, "-0.5"),
            _ => write!(f, "{whole}.5"),
        }
    }
}

impl Serialize for HalfGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for HalfGrid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::from_f64_exact(value).ok_or_else(|| {
            D::Error::custom(format!(
                "grid value {value} must be a finite multiple of 0.5"
            ))
        })
    }
}

/// Committed grid position at half-grid resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: HalfGrid,
    pub y: HalfGrid,
}

impl GridPoint {
    pub const ORIGIN: Self = Self {
        x: HalfGrid::ZERO,
        y: HalfGrid::ZERO,
    };

    pub const fn new(x: HalfGrid, y: HalfGrid) -> Self {
        Self { x, y }
    }

    /// Point at whole grid units.
    pub const fn from_units(x: i64, y: i64) -> Self {
        Self::new(HalfGrid::from_units(x), HalfGrid::from_units(y))
    }

    /// Exact conversion; `None` when either coordinate is off the half grid.
    pub fn from_f64_exact(x: f64, y: f64) -> Option<Self> {
        Some(Self::new(
            HalfGrid::from_f64_exact(x)?,
            HalfGrid::from_f64_exact(y)?,
        ))
    }

    /// Nearest half-grid point to a continuous coordinate.
    pub fn nearest(coord: GridCoord) -> Option<Self> {
        Some(Self::new(
            HalfGrid::round_from_f64(coord.x)?,
            HalfGrid::round_from_f64(coord.y)?,
        ))
    }

    pub fn to_coord(self) -> GridCoord {
        GridCoord::new(self.x.to_f64(), self.y.to_f64())
    }
}

impl Display for GridPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Continuous grid-space coordinate produced by viewport transforms.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridCoord {
    pub x: f64,
    pub y: f64,
}

impl GridCoord {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rounds each axis to the nearest 0.5 grid unit.
    pub fn snapped(self) -> Self {
        Self::new(snap_half(self.x), snap_half(self.y))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

fn snap_half(value: f64) -> f64 {
    (value * HALF_GRID_SCALE as f64).round() / HALF_GRID_SCALE as f64
}
