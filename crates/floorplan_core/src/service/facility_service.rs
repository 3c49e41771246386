//! Facility console use-case service.
//!
//! # Responsibility
//! - Own the layout model together with its viewport and drag controller.
//! - Turn form-level requests (size category, optional position) into
//!   validated model mutations.
//! - Route document and file persistence through one entry point.
//!
//! # Invariants
//! - Every mutation goes through `GridModel`; the console never edits units
//!   in place.
//! - A successful import or load cancels any in-flight drag, since the
//!   dragged unit may no longer exist.

use crate::config::{ConfigError, ConsoleConfig};
use crate::grid::error::LayoutError;
use crate::grid::grid_model::{GridModel, OccupancySummary};
use crate::model::coord::{GridCoord, GridPoint, HalfGrid};
use crate::model::unit::{is_attribute_key, SizeCategory, Unit, UnitId, UnitPatch, UnitStatus};
use crate::persist::{load_layout_file, save_layout_file, PersistError};
use crate::placement::controller::{
    DragRejection, HoverIndicator, PlacementController, PlacementSettings, PlacementState,
};
use crate::seed::demo_layout::{demo_layout, DemoLayoutConfig};
use crate::serialization::layout_document::{export_layout_json, import_layout_json};
use crate::viewport::mapper::{ScreenPoint, ScreenSize, ViewportMapper};
use crate::viewport::minimap::{GridFraction, MinimapViewport};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Service error for console use-cases.
#[derive(Debug)]
pub enum ConsoleError {
    /// No free slot on the floor fits the requested size.
    NoFreeSpace {
        floor: i32,
        width: HalfGrid,
        height: HalfGrid,
    },
    /// Custom size is not a positive finite number of feet.
    InvalidSize(SizeCategory),
    Layout(LayoutError),
    Drag(DragRejection),
    Config(ConfigError),
    Persist(PersistError),
}

impl Display for ConsoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFreeSpace {
                floor,
                width,
                height,
            } => write!(f, "no free {width}x{height} slot on floor {floor}"),
            Self::InvalidSize(size) => write!(f, "invalid unit size: {}", size.label()),
            Self::Layout(err) => write!(f, "{err}"),
            Self::Drag(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConsoleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Drag(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Persist(err) => Some(err),
            Self::NoFreeSpace { .. } | Self::InvalidSize(_) => None,
        }
    }
}

impl From<LayoutError> for ConsoleError {
    fn from(value: LayoutError) -> Self {
        Self::Layout(value)
    }
}

impl From<DragRejection> for ConsoleError {
    fn from(value: DragRejection) -> Self {
        Self::Drag(value)
    }
}

impl From<ConfigError> for ConsoleError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<PersistError> for ConsoleError {
    fn from(value: PersistError) -> Self {
        match value {
            PersistError::Layout(err) => Self::Layout(err),
            other => Self::Persist(other),
        }
    }
}

/// Add-unit form payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUnitRequest {
    pub unit_number: String,
    pub floor: i32,
    /// `None` places the unit at the first free slot on the floor.
    pub position: Option<GridPoint>,
    pub size: SizeCategory,
    pub status: UnitStatus,
    pub locked: bool,
    pub features: BTreeSet<String>,
    /// Collaborator fields; schema keys are dropped.
    pub attributes: Map<String, Value>,
}

impl NewUnitRequest {
    pub fn new(unit_number: impl Into<String>, floor: i32, size: SizeCategory) -> Self {
        Self {
            unit_number: unit_number.into(),
            floor,
            position: None,
            size,
            status: UnitStatus::default(),
            locked: false,
            features: BTreeSet::new(),
            attributes: Map::new(),
        }
    }

    pub fn at(mut self, position: GridPoint) -> Self {
        self.position = Some(position);
        self
    }
}

/// Console facade over model, viewport and placement state.
#[derive(Debug, Clone)]
pub struct FacilityConsole {
    model: GridModel,
    viewport: ViewportMapper,
    placement: PlacementController,
}

impl FacilityConsole {
    /// Creates an empty console from a validated config.
    pub fn new(config: &ConsoleConfig) -> ConsoleResult<Self> {
        config.validate()?;
        Ok(Self {
            model: GridModel::new(config.grid),
            viewport: ViewportMapper::new(config.viewport)?,
            placement: PlacementController::new(config.placement),
        })
    }

    /// Creates a console around an existing model; `config.grid` is ignored.
    pub fn with_model(config: &ConsoleConfig, model: GridModel) -> ConsoleResult<Self> {
        Ok(Self {
            model,
            viewport: ViewportMapper::new(config.viewport)?,
            placement: PlacementController::new(config.placement),
        })
    }

    pub fn model(&self) -> &GridModel {
        &self.model
    }

    pub fn viewport(&self) -> &ViewportMapper {
        &self.viewport
    }

    pub fn placement(&self) -> &PlacementController {
        &self.placement
    }

    pub fn units_on_floor(&self, floor: i32) -> Vec<Unit> {
        self.model.units_on_floor(floor)
    }

    pub fn occupancy(&self, floor: Option<i32>) -> OccupancySummary {
        self.model.occupancy(floor)
    }

    /// Creates one unit from a form request.
    pub fn create_unit(&mut self, request: NewUnitRequest) -> ConsoleResult<Unit> {
        let (width, height) = request
            .size
            .grid_extent()
            .ok_or(ConsoleError::InvalidSize(request.size))?;
        let position = match request.position {
            Some(position) => position,
            None => self
                .model
                .find_free_position(request.floor, width, height)
                .ok_or(ConsoleError::NoFreeSpace {
                    floor: request.floor,
                    width,
                    height,
                })?,
        };

        let mut unit =
            Unit::with_size_category(request.unit_number, request.floor, position, request.size)
                .ok_or(ConsoleError::InvalidSize(request.size))?;
        unit.status = request.status;
        unit.locked = request.locked;
        unit.features = request.features;
        unit.attributes = request
            .attributes
            .into_iter()
            .filter(|(key, _)| is_attribute_key(key))
            .collect();

        self.model.add_unit(unit.clone())?;
        Ok(unit)
    }

    /// Applies a non-geometric patch and returns the updated unit.
    pub fn update_unit(&mut self, id: UnitId, patch: &UnitPatch) -> ConsoleResult<Unit> {
        self.model.update_unit(id, patch)?;
        self.model
            .unit(id)
            .cloned()
            .ok_or(ConsoleError::Layout(LayoutError::NotFound(id)))
    }

    pub fn remove_unit(&mut self, id: UnitId) -> ConsoleResult<Unit> {
        let removed = self.model.remove_unit(id)?;
        let dragging_removed = matches!(
            self.placement.state(),
            PlacementState::Dragging(session) if session.unit_id == id
        );
        if dragging_removed {
            self.placement.cancel();
        }
        Ok(removed)
    }

    /// Direct move, bypassing the drag state machine.
    pub fn move_unit(&mut self, id: UnitId, position: GridPoint) -> ConsoleResult<()> {
        Ok(self.model.move_unit(id, position)?)
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.placement.set_edit_mode(enabled);
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.placement.set_snap_to_grid(enabled);
    }

    pub fn placement_settings(&self) -> PlacementSettings {
        self.placement.settings()
    }

    pub fn begin_drag(&mut self, id: UnitId) -> ConsoleResult<()> {
        Ok(self.placement.begin_drag(&self.model, id)?)
    }

    pub fn drag_to(&mut self, pointer: ScreenPoint) -> Option<GridCoord> {
        self.placement.pointer_moved(&self.viewport, pointer)
    }

    /// Drops the dragged unit and returns the terminal state.
    pub fn drop_unit(&mut self) -> PlacementState {
        self.placement.commit_drop(&mut self.model).clone()
    }

    pub fn cancel_drag(&mut self) {
        self.placement.cancel();
    }

    pub fn settle_drag(&mut self) {
        self.placement.settle();
    }

    pub fn display_position(&self, id: UnitId) -> Option<GridCoord> {
        self.placement.display_position(&self.model, id)
    }

    pub fn hover_indicator(&self) -> Option<HoverIndicator> {
        self.placement.hover_indicator(&self.model, &self.viewport)
    }

    pub fn set_zoom(&mut self, value: f64) -> f64 {
        self.viewport.set_zoom(value)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.viewport.zoom_out()
    }

    pub fn zoom_at(&mut self, anchor: ScreenPoint, value: f64) -> f64 {
        self.viewport.zoom_at(anchor, value)
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.viewport.scroll_by(dx, dy);
    }

    pub fn minimap_viewport(&self, viewport: ScreenSize) -> MinimapViewport {
        self.viewport
            .compute_minimap_viewport(viewport, self.model.grid_size())
    }

    pub fn center_on_minimap(&mut self, target: GridFraction, viewport: ScreenSize) {
        let grid = self.model.grid_size();
        self.viewport.center_on_minimap(target, viewport, grid);
    }

    pub fn export_json(&self) -> ConsoleResult<String> {
        Ok(export_layout_json(&self.model)?)
    }

    pub fn import_json(&mut self, text: &str) -> ConsoleResult<()> {
        import_layout_json(&mut self.model, text)?;
        self.reset_placement();
        Ok(())
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> ConsoleResult<()> {
        Ok(save_layout_file(path, &self.model)?)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConsoleResult<()> {
        load_layout_file(path, &mut self.model)?;
        self.reset_placement();
        Ok(())
    }

    /// Replaces the layout with a seeded demo facility.
    pub fn load_demo(&mut self, seed: u64, config: &DemoLayoutConfig) -> ConsoleResult<()> {
        let demo = demo_layout(seed, config)?;
        self.model.replace_all(demo.to_layout())?;
        self.reset_placement();
        Ok(())
    }

    fn reset_placement(&mut self) {
        self.placement.cancel();
        self.placement.settle();
    }
}
