//! Screen ↔ grid coordinate transforms.
//!
//! # Responsibility
//! - Map pointer positions to continuous grid coordinates and back.
//! - Hold zoom and scroll state for the floor-plan canvas.
//!
//! # Invariants
//! - `zoom` always lies within the configured bounds.
//! - `grid_to_screen` is the exact inverse of `screen_to_grid` up to
//!   floating-point tolerance.
//! - Viewport changes never touch `GridModel`.

use crate::config::{ConfigError, ViewportConfig};
use crate::geometry::rect::GridRect;
use crate::model::coord::GridCoord;
use crate::model::layout::GridSize;
use crate::viewport::minimap::{GridFraction, MinimapViewport};

/// Point in canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size in canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Zoom/scroll state of the floor-plan canvas.
///
/// `scroll_offset` is the canvas position of the grid origin; scrolling
/// right into the content makes it negative.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportMapper {
    zoom: f64,
    cell_size: f64,
    scroll_offset: ScreenPoint,
    bounds: ViewportConfig,
}

impl ViewportMapper {
    pub fn new(config: ViewportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            zoom: config.initial_zoom,
            cell_size: config.cell_size,
            scroll_offset: ScreenPoint::default(),
            bounds: config,
        })
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn scroll_offset(&self) -> ScreenPoint {
        self.scroll_offset
    }

    pub fn zoom_bounds(&self) -> (f64, f64) {
        (self.bounds.zoom_min, self.bounds.zoom_max)
    }

    /// Pixels per grid unit at the current zoom.
    pub fn scale(&self) -> f64 {
        self.cell_size * self.zoom
    }

    /// Sets zoom, clamped to bounds. Scroll offset is left unchanged.
    ///
    /// NaN is ignored; infinities clamp to the nearest bound. Returns the
    /// applied zoom.
    pub fn set_zoom(&mut self, value: f64) -> f64 {
        if !value.is_nan() {
            self.zoom = value.clamp(self.bounds.zoom_min, self.bounds.zoom_max);
        }
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(round_zoom(self.zoom + self.bounds.zoom_step))
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(round_zoom(self.zoom - self.bounds.zoom_step))
    }

    /// Zooms while keeping the grid point under `anchor` fixed on screen.
    pub fn zoom_at(&mut self, anchor: ScreenPoint, value: f64) -> f64 {
        let pinned = self.screen_to_grid(anchor);
        self.set_zoom(value);
        let scale = self.scale();
        self.scroll_offset = ScreenPoint::new(
            anchor.x - pinned.x * scale,
            anchor.y - pinned.y * scale,
        );
        self.zoom
    }

    pub fn set_scroll_offset(&mut self, offset: ScreenPoint) {
        if offset.x.is_finite() && offset.y.is_finite() {
            self.scroll_offset = offset;
        }
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.set_scroll_offset(ScreenPoint::new(
            self.scroll_offset.x + dx,
            self.scroll_offset.y + dy,
        ));
    }

    /// `(point - scroll_offset) / (cell_size * zoom)`.
    pub fn screen_to_grid(&self, point: ScreenPoint) -> GridCoord {
        let scale = self.scale();
        GridCoord::new(
            (point.x - self.scroll_offset.x) / scale,
            (point.y - self.scroll_offset.y) / scale,
        )
    }

    pub fn grid_to_screen(&self, coord: GridCoord) -> ScreenPoint {
        let scale = self.scale();
        ScreenPoint::new(
            coord.x * scale + self.scroll_offset.x,
            coord.y * scale + self.scroll_offset.y,
        )
    }

    pub fn grid_rect_to_screen(&self, rect: &GridRect) -> ScreenRect {
        let origin = self.grid_to_screen(rect.origin().to_coord());
        let scale = self.scale();
        ScreenRect {
            x: origin.x,
            y: origin.y,
            width: rect.width.to_f64() * scale,
            height: rect.height.to_f64() * scale,
        }
    }

    /// Pixel size of the whole grid at the current zoom.
    pub fn content_size(&self, grid: GridSize) -> ScreenSize {
        let scale = self.scale();
        ScreenSize::new(f64::from(grid.cols) * scale, f64::from(grid.rows) * scale)
    }

    /// Visible region as fractions of the full grid, clamped to `[0, 1]`.
    pub fn compute_minimap_viewport(&self, viewport: ScreenSize, grid: GridSize) -> MinimapViewport {
        if grid.is_empty() {
            return MinimapViewport::default();
        }
        let top_left = self.screen_to_grid(ScreenPoint::default());
        let bottom_right =
            self.screen_to_grid(ScreenPoint::new(viewport.width.max(0.0), viewport.height.max(0.0)));
        let cols = f64::from(grid.cols);
        let rows = f64::from(grid.rows);

        let x0 = unit_clamp(top_left.x / cols);
        let y0 = unit_clamp(top_left.y / rows);
        let x1 = unit_clamp(bottom_right.x / cols);
        let y1 = unit_clamp(bottom_right.y / rows);
        MinimapViewport {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0.0),
            height: (y1 - y0).max(0.0),
        }
    }

    /// Scrolls so the grid point at `target` is centered in the viewport.
    pub fn center_on_minimap(&mut self, target: GridFraction, viewport: ScreenSize, grid: GridSize) {
        let coord = GridCoord::new(
            unit_clamp(target.x) * f64::from(grid.cols),
            unit_clamp(target.y) * f64::from(grid.rows),
        );
        let scale = self.scale();
        self.set_scroll_offset(ScreenPoint::new(
            viewport.width / 2.0 - coord.x * scale,
            viewport.height / 2.0 - coord.y * scale,
        ));
    }
}

fn round_zoom(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
