//! Interactive relocation state machine.
//!
//! # Responsibility
//! - Track one drag of one unit from pick-up to drop or cancel.
//! - Resolve pointer positions through the viewport, with optional snapping.
//! - Commit through exactly one `GridModel::move_unit` call per drop.
//!
//! # Invariants
//! - States flow `Idle -> Dragging -> {Committed | Reverted} -> Idle`.
//! - Nothing is written to the model before drop; cancel never writes.
//! - With snapping on, every committed coordinate is a multiple of 0.5.

use crate::geometry::collision::{any_collision, within_bounds};
use crate::geometry::rect::GridRect;
use crate::grid::error::LayoutError;
use crate::grid::grid_model::GridModel;
use crate::model::coord::{GridCoord, GridPoint};
use crate::model::unit::UnitId;
use crate::viewport::mapper::{ScreenPoint, ScreenRect, ViewportMapper};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Runtime-toggleable placement behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementSettings {
    /// Units can only be dragged while edit mode is on.
    pub edit_mode: bool,
    /// Round drop coordinates to the nearest 0.5 grid unit.
    pub snap_to_grid: bool,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            edit_mode: false,
            snap_to_grid: true,
        }
    }
}

/// In-flight drag of one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub unit_id: UnitId,
    /// Committed position at pick-up.
    pub origin: GridPoint,
    /// Latest resolved pointer position in grid space.
    pub candidate: GridCoord,
}

/// Why a drag ended without a committed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// The model rejected the drop.
    Rejected(LayoutError),
    /// Pointer left the canvas, explicit cancel, or edit mode switched off.
    Cancelled,
    /// Candidate could not be represented as a grid position.
    UnresolvedPosition,
}

impl Display for RevertReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(err) => write!(f, "{err}"),
            Self::Cancelled => write!(f, "drag cancelled"),
            Self::UnresolvedPosition => write!(f, "drop position could not be resolved"),
        }
    }
}

/// Placement state machine states.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementState {
    Idle,
    Dragging(DragSession),
    Committed {
        unit_id: UnitId,
        position: GridPoint,
    },
    Reverted {
        unit_id: UnitId,
        /// Pre-drag position the unit is displayed at again.
        position: GridPoint,
        reason: RevertReason,
    },
}

/// Refusal to start a drag. The controller stays in its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragRejection {
    EditModeOff,
    UnitNotFound(UnitId),
    UnitLocked(UnitId),
    AlreadyDragging(UnitId),
}

impl Display for DragRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EditModeOff => write!(f, "edit mode is off"),
            Self::UnitNotFound(id) => write!(f, "unit not found: {id}"),
            Self::UnitLocked(id) => write!(f, "unit is locked: {id}"),
            Self::AlreadyDragging(id) => write!(f, "another drag is in progress: {id}"),
        }
    }
}

impl Error for DragRejection {}

/// Hover indicator drawn under the pointer while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverIndicator {
    pub unit_id: UnitId,
    pub screen_rect: ScreenRect,
    /// Whether dropping here would be accepted by the model right now.
    pub valid: bool,
}

/// Drag-and-drop controller for unit relocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementController {
    settings: PlacementSettings,
    state: PlacementState,
}

impl PlacementController {
    pub fn new(settings: PlacementSettings) -> Self {
        Self {
            settings,
            state: PlacementState::Idle,
        }
    }

    pub fn settings(&self) -> PlacementSettings {
        self.settings
    }

    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PlacementState::Dragging(_))
    }

    /// Toggles edit mode. Turning it off cancels an in-flight drag.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.settings.edit_mode = enabled;
        if !enabled && self.is_dragging() {
            self.cancel();
        }
    }

    /// Applies to the next pointer update; the current candidate is kept.
    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.settings.snap_to_grid = enabled;
    }

    /// Picks up a unit. A finished (`Committed`/`Reverted`) drag is settled
    /// implicitly.
    pub fn begin_drag(&mut self, model: &GridModel, unit_id: UnitId) -> Result<(), DragRejection> {
        if let PlacementState::Dragging(session) = &self.state {
            return Err(DragRejection::AlreadyDragging(session.unit_id));
        }
        if !self.settings.edit_mode {
            return Err(DragRejection::EditModeOff);
        }
        let unit = model
            .unit(unit_id)
            .ok_or(DragRejection::UnitNotFound(unit_id))?;
        if unit.locked {
            return Err(DragRejection::UnitLocked(unit_id));
        }

        debug!(
            "event=drag_start module=placement status=ok unit_id={} origin={}",
            unit_id, unit.position
        );
        self.state = PlacementState::Dragging(DragSession {
            unit_id,
            origin: unit.position,
            candidate: unit.position.to_coord(),
        });
        Ok(())
    }

    /// Resolves the pointer into a new candidate while dragging.
    ///
    /// Returns the candidate, or `None` when not dragging. Non-finite
    /// pointer positions keep the previous candidate.
    pub fn pointer_moved(&mut self, mapper: &ViewportMapper, pointer: ScreenPoint) -> Option<GridCoord> {
        let snap = self.settings.snap_to_grid;
        let PlacementState::Dragging(session) = &mut self.state else {
            return None;
        };
        let raw = mapper.screen_to_grid(pointer);
        if raw.is_finite() {
            session.candidate = if snap { raw.snapped() } else { raw };
        }
        Some(session.candidate)
    }

    /// Drops the dragged unit at the current candidate.
    ///
    /// Performs exactly one `move_unit` call. Without snapping the
    /// continuous candidate is stored at the nearest half-grid position.
    /// Returns the terminal state, or `Idle` when nothing was dragged.
    pub fn commit_drop(&mut self, model: &mut GridModel) -> &PlacementState {
        let session = match std::mem::replace(&mut self.state, PlacementState::Idle) {
            PlacementState::Dragging(session) => session,
            other => {
                self.state = other;
                return &self.state;
            }
        };

        self.state = match GridPoint::nearest(session.candidate) {
            None => revert(&session, RevertReason::UnresolvedPosition),
            Some(position) => match model.move_unit(session.unit_id, position) {
                Ok(()) => {
                    info!(
                        "event=drag_drop module=placement status=ok unit_id={} position={}",
                        session.unit_id, position
                    );
                    PlacementState::Committed {
                        unit_id: session.unit_id,
                        position,
                    }
                }
                Err(err) => revert(&session, RevertReason::Rejected(err)),
            },
        };
        &self.state
    }

    /// Abandons the drag without touching the model.
    pub fn cancel(&mut self) {
        if let PlacementState::Dragging(session) = &self.state {
            self.state = revert(session, RevertReason::Cancelled);
        }
    }

    /// Returns a finished drag to `Idle` once the UI has settled.
    pub fn settle(&mut self) {
        if matches!(
            self.state,
            PlacementState::Committed { .. } | PlacementState::Reverted { .. }
        ) {
            self.state = PlacementState::Idle;
        }
    }

    /// Position to draw a unit at: the candidate while it is being dragged,
    /// otherwise its committed position.
    pub fn display_position(&self, model: &GridModel, unit_id: UnitId) -> Option<GridCoord> {
        if let PlacementState::Dragging(session) = &self.state {
            if session.unit_id == unit_id {
                return Some(session.candidate);
            }
        }
        model.unit(unit_id).map(|unit| unit.position.to_coord())
    }

    /// Hover indicator for the current drag, validated without mutation.
    pub fn hover_indicator(&self, model: &GridModel, mapper: &ViewportMapper) -> Option<HoverIndicator> {
        let PlacementState::Dragging(session) = &self.state else {
            return None;
        };
        let unit = model.unit(session.unit_id)?;
        let valid = GridPoint::nearest(session.candidate).is_some_and(|position| {
            let rect = GridRect::of_unit_at(unit, position);
            !unit.locked
                && within_bounds(&rect, model.grid_size())
                && !any_collision(
                    &rect,
                    model.units().iter().filter(|other| other.floor == unit.floor),
                    Some(unit.id),
                )
        });

        let origin = mapper.grid_to_screen(session.candidate);
        let scale = mapper.scale();
        Some(HoverIndicator {
            unit_id: unit.id,
            screen_rect: ScreenRect {
                x: origin.x,
                y: origin.y,
                width: unit.width.to_f64() * scale,
                height: unit.height.to_f64() * scale,
            },
            valid,
        })
    }
}

fn revert(session: &DragSession, reason: RevertReason) -> PlacementState {
    warn!(
        "event=drag_revert module=placement status=rejected unit_id={} reason={}",
        session.unit_id, reason
    );
    PlacementState::Reverted {
        unit_id: session.unit_id,
        position: session.origin,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::{DragRejection, PlacementController, PlacementSettings, PlacementState, RevertReason};
    use crate::config::ViewportConfig;
    use crate::grid::error::LayoutError;
    use crate::grid::grid_model::GridModel;
    use crate::model::coord::{GridCoord, GridPoint, HalfGrid};
    use crate::model::layout::GridSize;
    use crate::model::unit::{Unit, UnitPatch};
    use crate::viewport::mapper::{ScreenPoint, ViewportMapper};

    fn editing(snap: bool) -> PlacementController {
        PlacementController::new(PlacementSettings {
            edit_mode: true,
            snap_to_grid: snap,
        })
    }

    fn model_with_unit() -> (GridModel, Unit) {
        let mut model = GridModel::new(GridSize::new(20, 20));
        let unit = Unit::new(
            "A1",
            1,
            GridPoint::from_units(2, 2),
            HalfGrid::from_units(2),
            HalfGrid::from_units(2),
        );
        model.add_unit(unit.clone()).unwrap();
        (model, unit)
    }

    fn mapper() -> ViewportMapper {
        ViewportMapper::new(ViewportConfig::default()).unwrap()
    }

    #[test]
    fn drag_start_requires_edit_mode() {
        let (model, unit) = model_with_unit();
        let mut controller = PlacementController::new(PlacementSettings::default());

        let err = controller.begin_drag(&model, unit.id).unwrap_err();
        assert_eq!(err, DragRejection::EditModeOff);
        assert_eq!(controller.state(), &PlacementState::Idle);
    }

    #[test]
    fn second_drag_is_rejected_while_dragging() {
        let (model, unit) = model_with_unit();
        let mut controller = editing(true);
        controller.begin_drag(&model, unit.id).unwrap();

        let err = controller.begin_drag(&model, unit.id).unwrap_err();
        assert_eq!(err, DragRejection::AlreadyDragging(unit.id));
    }

    #[test]
    fn continuous_drop_rounds_to_storage_resolution() {
        let (mut model, unit) = model_with_unit();
        let viewport = mapper();
        let mut controller = editing(false);
        controller.begin_drag(&model, unit.id).unwrap();

        // 40px per grid unit.
        let candidate = controller
            .pointer_moved(&viewport, ScreenPoint::new(412.0, 404.0))
            .unwrap();
        assert_eq!(candidate, GridCoord::new(10.3, 10.1));

        controller.commit_drop(&mut model);
        let expected = GridPoint::new(HalfGrid::from_halves(21), HalfGrid::from_units(10));
        assert_eq!(
            controller.state(),
            &PlacementState::Committed {
                unit_id: unit.id,
                position: expected
            }
        );
        assert_eq!(model.unit(unit.id).unwrap().position, expected);
    }

    #[test]
    fn lock_applied_mid_drag_reverts_drop() {
        let (mut model, unit) = model_with_unit();
        let viewport = mapper();
        let mut controller = editing(true);
        controller.begin_drag(&model, unit.id).unwrap();
        controller.pointer_moved(&viewport, ScreenPoint::new(400.0, 400.0));

        let lock = UnitPatch {
            locked: Some(true),
            ..UnitPatch::default()
        };
        model.update_unit(unit.id, &lock).unwrap();
        controller.commit_drop(&mut model);

        assert_eq!(
            controller.state(),
            &PlacementState::Reverted {
                unit_id: unit.id,
                position: unit.position,
                reason: RevertReason::Rejected(LayoutError::LockedUnit(unit.id)),
            }
        );
        assert_eq!(model.unit(unit.id).unwrap().position, unit.position);
    }

    #[test]
    fn turning_edit_mode_off_cancels_drag() {
        let (model, unit) = model_with_unit();
        let mut controller = editing(true);
        controller.begin_drag(&model, unit.id).unwrap();

        controller.set_edit_mode(false);
        assert!(matches!(
            controller.state(),
            PlacementState::Reverted {
                reason: RevertReason::Cancelled,
                ..
            }
        ));
        controller.settle();
        assert_eq!(controller.state(), &PlacementState::Idle);
    }

    #[test]
    fn display_position_follows_candidate_only_while_dragging() {
        let (model, unit) = model_with_unit();
        let viewport = mapper();
        let mut controller = editing(true);
        controller.begin_drag(&model, unit.id).unwrap();
        controller.pointer_moved(&viewport, ScreenPoint::new(200.0, 120.0));

        assert_eq!(
            controller.display_position(&model, unit.id),
            Some(GridCoord::new(5.0, 3.0))
        );
        controller.cancel();
        assert_eq!(
            controller.display_position(&model, unit.id),
            Some(GridCoord::new(2.0, 2.0))
        );
    }

    #[test]
    fn hover_indicator_flags_invalid_targets() {
        let (mut model, unit) = model_with_unit();
        let blocker = Unit::new(
            "B1",
            1,
            GridPoint::from_units(10, 10),
            HalfGrid::from_units(2),
            HalfGrid::from_units(2),
        );
        model.add_unit(blocker).unwrap();
        let viewport = mapper();
        let mut controller = editing(true);
        controller.begin_drag(&model, unit.id).unwrap();

        controller.pointer_moved(&viewport, ScreenPoint::new(420.0, 420.0));
        let hover = controller.hover_indicator(&model, &viewport).unwrap();
        assert!(!hover.valid);
        assert_eq!(hover.screen_rect.width, 80.0);

        controller.pointer_moved(&viewport, ScreenPoint::new(40.0, 40.0));
        assert!(controller.hover_indicator(&model, &viewport).unwrap().valid);

        controller.pointer_moved(&viewport, ScreenPoint::new(780.0, 40.0));
        assert!(!controller.hover_indicator(&model, &viewport).unwrap().valid);
    }
}
