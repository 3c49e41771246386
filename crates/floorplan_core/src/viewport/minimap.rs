//! Proportional minimap projection.
//!
//! # Responsibility
//! - Scale the whole grid uniformly into a fixed minimap box.
//! - Project units, overlays and the visible-region box into that space.
//! - Translate minimap clicks back into grid fractions.

use crate::geometry::rect::GridRect;
use crate::model::layout::GridSize;
use crate::viewport::mapper::{ScreenPoint, ScreenRect, ScreenSize};

/// Point expressed as fractions of the full grid extent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridFraction {
    pub x: f64,
    pub y: f64,
}

/// Visible region as fractions of the full grid, each within `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MinimapViewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Fixed-size minimap canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimap {
    size: ScreenSize,
}

impl Minimap {
    pub fn new(size: ScreenSize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> ScreenSize {
        self.size
    }

    /// Minimap pixels per grid unit; the same on both axes.
    pub fn scale(&self, grid: GridSize) -> f64 {
        if grid.is_empty() {
            return 0.0;
        }
        let sx = self.size.width / f64::from(grid.cols);
        let sy = self.size.height / f64::from(grid.rows);
        sx.min(sy).max(0.0)
    }

    /// Pixel extent actually covered by the scaled grid.
    pub fn drawn_size(&self, grid: GridSize) -> ScreenSize {
        let scale = self.scale(grid);
        ScreenSize::new(f64::from(grid.cols) * scale, f64::from(grid.rows) * scale)
    }

    pub fn project_rect(&self, rect: &GridRect, grid: GridSize) -> ScreenRect {
        let scale = self.scale(grid);
        ScreenRect {
            x: rect.x.to_f64() * scale,
            y: rect.y.to_f64() * scale,
            width: rect.width.to_f64() * scale,
            height: rect.height.to_f64() * scale,
        }
    }

    /// Box drawn around the main canvas' visible region.
    pub fn viewport_box(&self, visible: &MinimapViewport, grid: GridSize) -> ScreenRect {
        let drawn = self.drawn_size(grid);
        ScreenRect {
            x: visible.x * drawn.width,
            y: visible.y * drawn.height,
            width: visible.width * drawn.width,
            height: visible.height * drawn.height,
        }
    }

    /// Grid fraction under a minimap click; `None` outside the drawn grid.
    pub fn fraction_at(&self, point: ScreenPoint, grid: GridSize) -> Option<GridFraction> {
        let drawn = self.drawn_size(grid);
        if drawn.width <= 0.0 || drawn.height <= 0.0 {
            return None;
        }
        let inside = (0.0..=drawn.width).contains(&point.x) && (0.0..=drawn.height).contains(&point.y);
        if !inside {
            return None;
        }
        Some(GridFraction {
            x: point.x / drawn.width,
            y: point.y / drawn.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{GridFraction, Minimap, MinimapViewport};
    use crate::geometry::rect::GridRect;
    use crate::model::coord::{GridPoint, HalfGrid};
    use crate::model::layout::GridSize;
    use crate::viewport::mapper::{ScreenPoint, ScreenRect, ScreenSize};

    #[test]
    fn scale_is_uniform_and_fits_box() {
        let minimap = Minimap::new(ScreenSize::new(200.0, 150.0));
        let grid = GridSize::new(30, 40);
        assert_eq!(minimap.scale(grid), 5.0);
        assert_eq!(minimap.drawn_size(grid), ScreenSize::new(200.0, 150.0));

        let tall = GridSize::new(60, 40);
        assert_eq!(minimap.scale(tall), 2.5);
        assert_eq!(minimap.scale(GridSize::new(0, 40)), 0.0);
    }

    #[test]
    fn projects_units_and_viewport_box() {
        let minimap = Minimap::new(ScreenSize::new(200.0, 150.0));
        let grid = GridSize::new(30, 40);
        let rect = GridRect::new(
            GridPoint::from_units(4, 2),
            HalfGrid::from_halves(3),
            HalfGrid::from_units(2),
        );
        assert_eq!(
            minimap.project_rect(&rect, grid),
            ScreenRect {
                x: 20.0,
                y: 10.0,
                width: 7.5,
                height: 10.0
            }
        );

        let visible = MinimapViewport {
            x: 0.25,
            y: 0.5,
            width: 0.5,
            height: 0.5,
        };
        assert_eq!(
            minimap.viewport_box(&visible, grid),
            ScreenRect {
                x: 50.0,
                y: 75.0,
                width: 100.0,
                height: 75.0
            }
        );
    }

    #[test]
    fn click_outside_drawn_grid_is_ignored() {
        let minimap = Minimap::new(ScreenSize::new(200.0, 200.0));
        let grid = GridSize::new(10, 20);
        // Drawn area is 200x100.
        assert_eq!(
            minimap.fraction_at(ScreenPoint::new(50.0, 50.0), grid),
            Some(GridFraction { x: 0.25, y: 0.5 })
        );
        assert_eq!(minimap.fraction_at(ScreenPoint::new(50.0, 150.0), grid), None);
    }
}
