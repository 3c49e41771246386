//! Console configuration.
//!
//! # Responsibility
//! - Describe grid extent, viewport bounds and placement defaults.
//! - Parse the optional JSON config supplied by the embedding shell.
//!
//! # Invariants
//! - A config returned from `from_json_str` has passed `validate()`.
//! - Missing keys fall back to defaults; unknown keys are ignored.

use crate::model::layout::GridSize;
use crate::placement::controller::PlacementSettings;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Viewport bounds and initial zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    /// Pixels per grid unit at zoom 1.
    pub cell_size: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Increment used by zoom in/out controls.
    pub zoom_step: f64,
    pub initial_zoom: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            cell_size: 40.0,
            zoom_min: 0.5,
            zoom_max: 2.0,
            zoom_step: 0.1,
            initial_zoom: 1.0,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::NonPositiveCellSize(self.cell_size));
        }
        let bounds_ok = self.zoom_min.is_finite()
            && self.zoom_max.is_finite()
            && self.zoom_min > 0.0
            && self.zoom_min <= self.zoom_max;
        if !bounds_ok {
            return Err(ConfigError::InvalidZoomBounds {
                min: self.zoom_min,
                max: self.zoom_max,
            });
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            return Err(ConfigError::NonPositiveZoomStep(self.zoom_step));
        }
        if !(self.zoom_min..=self.zoom_max).contains(&self.initial_zoom) {
            return Err(ConfigError::InitialZoomOutOfBounds(self.initial_zoom));
        }
        Ok(())
    }
}

/// Top-level console configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsoleConfig {
    pub grid: GridSize,
    pub viewport: ViewportConfig,
    pub placement: PlacementSettings,
}

impl ConsoleConfig {
    /// Parses and validates a JSON config document.
    ///
    /// Blank input yields the default config.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.is_empty() {
            return Err(ConfigError::EmptyGrid(self.grid));
        }
        self.viewport.validate()
    }
}

/// Invalid console configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveCellSize(f64),
    InvalidZoomBounds { min: f64, max: f64 },
    NonPositiveZoomStep(f64),
    InitialZoomOutOfBounds(f64),
    EmptyGrid(GridSize),
    Parse(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveCellSize(value) => {
                write!(f, "cell size must be positive, got {value}")
            }
            Self::InvalidZoomBounds { min, max } => {
                write!(f, "zoom bounds must satisfy 0 < min <= max, got [{min}, {max}]")
            }
            Self::NonPositiveZoomStep(value) => {
                write!(f, "zoom step must be positive, got {value}")
            }
            Self::InitialZoomOutOfBounds(value) => {
                write!(f, "initial zoom {value} is outside zoom bounds")
            }
            Self::EmptyGrid(grid) => write!(f, "grid size must be positive, got {grid}"),
            Self::Parse(message) => write!(f, "invalid config document: {message}"),
        }
    }
}

impl Error for ConfigError {}
