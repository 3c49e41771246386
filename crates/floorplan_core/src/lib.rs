//! Floor-plan layout engine for self-storage facilities.
//! This crate is the single source of truth for layout invariants.

pub mod config;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod model;
pub mod persist;
pub mod placement;
pub mod seed;
pub mod serialization;
pub mod service;
pub mod viewport;

pub use config::{ConfigError, ConsoleConfig, ViewportConfig};
pub use geometry::collision::{any_collision, first_collision, overlaps, within_bounds};
pub use geometry::rect::GridRect;
pub use grid::{GridModel, LayoutError, LayoutResult, OccupancySummary};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::coord::{GridCoord, GridPoint, HalfGrid};
pub use model::layout::{FacilityLayout, GridSize, Infrastructure, InfrastructureKind};
pub use model::unit::{
    FillPattern, SizeCategory, StatusStyle, Unit, UnitId, UnitPatch, UnitStatus,
    UnitValidationError,
};
pub use persist::{load_layout_file, save_layout_file, PersistError, PersistResult};
pub use placement::{
    DragRejection, DragSession, HoverIndicator, PlacementController, PlacementSettings,
    PlacementState, RevertReason,
};
pub use seed::{demo_layout, DemoLayoutConfig, StatusWeights};
pub use serialization::{
    export_layout, export_layout_json, import_layout, import_layout_json, LayoutDocument,
    LAYOUT_DOCUMENT_VERSION,
};
pub use service::{ConsoleError, ConsoleResult, FacilityConsole, NewUnitRequest};
pub use viewport::{
    GridFraction, Minimap, MinimapViewport, ScreenPoint, ScreenRect, ScreenSize, ViewportMapper,
};

/// Minimal health-check API for shell integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
