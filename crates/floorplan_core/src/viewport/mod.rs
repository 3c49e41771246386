//! Canvas viewport and minimap transforms.
//!
//! # Responsibility
//! - Convert between canvas pixels and grid coordinates under zoom/scroll.
//! - Project the full grid into the minimap overview.
//!
//! # Invariants
//! - Nothing here reads or writes `GridModel`.

pub mod mapper;
pub mod minimap;

pub use mapper::{ScreenPoint, ScreenRect, ScreenSize, ViewportMapper};
pub use minimap::{GridFraction, Minimap, MinimapViewport};
