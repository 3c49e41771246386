//! Authoritative in-memory store of units per floor.
//!
//! # Responsibility
//! - Own every unit of the facility and expose only validated mutations.
//! - Provide read-only floor snapshots for rendering collaborators.
//! - Swap the whole layout atomically for document import.
//!
//! # Invariants
//! - No two units on one floor overlap (half-open rectangles).
//! - Every unit lies inside `grid_size` with positive extent.
//! - Unit ids are unique across all floors.
//! - A failed call leaves the model exactly as it was.

use crate::geometry::collision::{first_collision, within_bounds};
use crate::geometry::rect::GridRect;
use crate::grid::error::{LayoutError, LayoutResult};
use crate::model::coord::{GridPoint, HalfGrid};
use crate::model::layout::{FacilityLayout, GridSize, Infrastructure};
use crate::model::unit::{Unit, UnitId, UnitPatch, UnitStatus, UnitValidationError};
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Per-status unit counts for one floor or the whole facility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccupancySummary {
    pub available: usize,
    pub occupied: usize,
    pub maintenance: usize,
    pub reserved: usize,
}

impl OccupancySummary {
    pub fn total(&self) -> usize {
        self.available + self.occupied + self.maintenance + self.reserved
    }

    /// Occupied share of all units, `0.0` for an empty selection.
    pub fn occupancy_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.occupied as f64 / total as f64,
        }
    }

    fn record(&mut self, status: UnitStatus) {
        match status {
            UnitStatus::Available => self.available += 1,
            UnitStatus::Occupied => self.occupied += 1,
            UnitStatus::Maintenance => self.maintenance += 1,
            UnitStatus::Reserved => self.reserved += 1,
        }
    }
}

/// Owned aggregate of all units and static overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct GridModel {
    grid_size: GridSize,
    units: Vec<Unit>,
    infrastructure: Vec<Infrastructure>,
}

impl GridModel {
    /// Creates an empty model for the given global grid extent.
    pub fn new(grid_size: GridSize) -> Self {
        Self {
            grid_size,
            units: Vec::new(),
            infrastructure: Vec::new(),
        }
    }

    /// Builds a model from a full layout, validating every invariant.
    pub fn from_layout(layout: FacilityLayout) -> LayoutResult<Self> {
        let mut model = Self::new(layout.grid_size);
        model.replace_all(layout)?;
        Ok(model)
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// All units in insertion order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    /// Read-only snapshot of one floor in insertion order.
    pub fn units_on_floor(&self, floor: i32) -> Vec<Unit> {
        self.floor_units(floor).cloned().collect()
    }

    /// Distinct floors that hold units or overlays, ascending.
    pub fn floors(&self) -> Vec<i32> {
        self.units
            .iter()
            .map(|unit| unit.floor)
            .chain(self.infrastructure.iter().map(|overlay| overlay.floor))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn infrastructure(&self) -> &[Infrastructure] {
        &self.infrastructure
    }

    pub fn infrastructure_on_floor(&self, floor: i32) -> Vec<Infrastructure> {
        self.infrastructure
            .iter()
            .filter(|overlay| overlay.floor == floor)
            .cloned()
            .collect()
    }

    /// Adds one unit after checking id, extent, bounds and overlap.
    pub fn add_unit(&mut self, unit: Unit) -> LayoutResult<UnitId> {
        match self.check_new_unit(&unit) {
            Ok(()) => {
                info!(
                    "event=unit_add module=grid status=ok unit_id={} floor={} rect={}",
                    unit.id,
                    unit.floor,
                    GridRect::of_unit(&unit)
                );
                let id = unit.id;
                self.units.push(unit);
                Ok(id)
            }
            Err(err) => Err(rejected("unit_add", err)),
        }
    }

    /// Removes one unit and returns it.
    pub fn remove_unit(&mut self, id: UnitId) -> LayoutResult<Unit> {
        let Some(index) = self.index_of(id) else {
            return Err(rejected("unit_remove", LayoutError::NotFound(id)));
        };
        let unit = self.units.remove(index);
        info!(
            "event=unit_remove module=grid status=ok unit_id={} floor={}",
            unit.id, unit.floor
        );
        Ok(unit)
    }

    /// Moves one unit. Only `position` changes on success.
    ///
    /// Checks run in order: existence, lock, bounds, overlap with every
    /// other unit on the same floor.
    pub fn move_unit(&mut self, id: UnitId, position: GridPoint) -> LayoutResult<()> {
        match self.check_move(id, position) {
            Ok(index) => {
                let unit = &mut self.units[index];
                let from = unit.position;
                unit.position = position;
                info!(
                    "event=unit_move module=grid status=ok unit_id={} floor={} from={} to={}",
                    id, unit.floor, from, position
                );
                Ok(())
            }
            Err(err) => Err(rejected("unit_move", err)),
        }
    }

    /// Runs every `move_unit` check without mutating.
    pub fn validate_move(&self, id: UnitId, position: GridPoint) -> LayoutResult<()> {
        self.check_move(id, position).map(|_| ())
    }

    /// Applies non-geometric changes. Never re-runs geometric checks.
    pub fn update_unit(&mut self, id: UnitId, patch: &UnitPatch) -> LayoutResult<()> {
        let Some(index) = self.index_of(id) else {
            return Err(rejected("unit_update", LayoutError::NotFound(id)));
        };
        patch.apply_to(&mut self.units[index]);
        info!("event=unit_update module=grid status=ok unit_id={id}");
        Ok(())
    }

    /// Replaces grid, units and overlays atomically.
    ///
    /// The incoming layout is fully validated first; on error nothing
    /// changes.
    pub fn replace_all(&mut self, layout: FacilityLayout) -> LayoutResult<()> {
        if let Err(err) = validate_layout(&layout) {
            return Err(rejected("layout_replace", err));
        }

        self.grid_size = layout.grid_size;
        self.units = layout.units;
        self.infrastructure = layout.infrastructure;
        info!(
            "event=layout_replace module=grid status=ok grid={} units={} overlays={}",
            self.grid_size,
            self.units.len(),
            self.infrastructure.len()
        );
        Ok(())
    }

    /// Clones the current state into a layout payload.
    pub fn to_layout(&self) -> FacilityLayout {
        FacilityLayout {
            grid_size: self.grid_size,
            units: self.units.clone(),
            infrastructure: self.infrastructure.clone(),
        }
    }

    /// First free whole-unit-aligned origin for a `width × height` unit.
    ///
    /// Scans rows top to bottom, then columns left to right.
    pub fn find_free_position(
        &self,
        floor: i32,
        width: HalfGrid,
        height: HalfGrid,
    ) -> Option<GridPoint> {
        if !width.is_positive() || !height.is_positive() {
            return None;
        }
        let max_x = HalfGrid::from_units(i64::from(self.grid_size.cols)) - width;
        let max_y = HalfGrid::from_units(i64::from(self.grid_size.rows)) - height;
        let step = HalfGrid::from_units(1);

        let mut y = HalfGrid::ZERO;
        while y <= max_y {
            let mut x = HalfGrid::ZERO;
            while x <= max_x {
                let origin = GridPoint::new(x, y);
                let rect = GridRect::new(origin, width, height);
                if first_collision(&rect, self.floor_units(floor), None).is_none() {
                    return Some(origin);
                }
                x = x + step;
            }
            y = y + step;
        }
        None
    }

    /// Status counts for one floor, or all floors when `floor` is `None`.
    pub fn occupancy(&self, floor: Option<i32>) -> OccupancySummary {
        let mut summary = OccupancySummary::default();
        self.units
            .iter()
            .filter(|unit| floor.map_or(true, |floor| unit.floor == floor))
            .for_each(|unit| summary.record(unit.status));
        summary
    }

    fn floor_units(&self, floor: i32) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().filter(move |unit| unit.floor == floor)
    }

    fn index_of(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|unit| unit.id == id)
    }

    fn check_new_unit(&self, unit: &Unit) -> LayoutResult<()> {
        check_record(unit, self.grid_size)?;
        if self.index_of(unit.id).is_some() {
            return Err(LayoutError::DuplicateId(unit.id));
        }
        let rect = GridRect::of_unit(unit);
        check_placement(unit.id, unit.floor, &rect, self.grid_size, || {
            first_collision(&rect, self.floor_units(unit.floor), None)
        })
    }

    fn check_move(&self, id: UnitId, position: GridPoint) -> LayoutResult<usize> {
        let index = self.index_of(id).ok_or(LayoutError::NotFound(id))?;
        let unit = &self.units[index];
        if unit.locked {
            return Err(LayoutError::LockedUnit(id));
        }
        let rect = GridRect::of_unit_at(unit, position);
        check_placement(id, unit.floor, &rect, self.grid_size, || {
            first_collision(&rect, self.floor_units(unit.floor), Some(id))
        })?;
        Ok(index)
    }
}

fn validate_layout(layout: &FacilityLayout) -> LayoutResult<()> {
    let grid = layout.grid_size;
    if grid.is_empty() {
        return Err(LayoutError::SchemaValidation(format!(
            "grid size must be positive, got {grid}"
        )));
    }

    let mut seen = HashSet::with_capacity(layout.units.len());
    let mut by_floor: BTreeMap<i32, Vec<&Unit>> = BTreeMap::new();
    for unit in &layout.units {
        check_record(unit, grid)?;
        if !seen.insert(unit.id) {
            return Err(LayoutError::DuplicateId(unit.id));
        }
        let rect = GridRect::of_unit(unit);
        let placed = by_floor.entry(unit.floor).or_default();
        check_placement(unit.id, unit.floor, &rect, grid, || {
            first_collision(&rect, placed.iter().copied(), None)
        })?;
        placed.push(unit);
    }

    for overlay in &layout.infrastructure {
        if !within_bounds(&overlay.rect, grid) {
            return Err(LayoutError::SchemaValidation(format!(
                "{:?} overlay on floor {} at {} is outside grid {grid}",
                overlay.kind, overlay.floor, overlay.rect
            )));
        }
    }
    Ok(())
}

fn check_record(unit: &Unit, grid: GridSize) -> LayoutResult<()> {
    unit.validate().map_err(|err| match err {
        UnitValidationError::NilId => LayoutError::SchemaValidation(err.to_string()),
        UnitValidationError::NonPositiveExtent { .. }
        | UnitValidationError::NegativePosition(_) => LayoutError::OutOfBounds {
            unit_id: unit.id,
            rect: GridRect::of_unit(unit),
            grid,
        },
    })
}

fn check_placement(
    unit_id: UnitId,
    floor: i32,
    rect: &GridRect,
    grid: GridSize,
    find_conflict: impl FnOnce() -> Option<UnitId>,
) -> LayoutResult<()> {
    if !within_bounds(rect, grid) {
        return Err(LayoutError::OutOfBounds {
            unit_id,
            rect: *rect,
            grid,
        });
    }
    if let Some(conflicting_id) = find_conflict() {
        return Err(LayoutError::Collision {
            unit_id,
            floor,
            rect: *rect,
            conflicting_id,
        });
    }
    Ok(())
}

fn rejected(event: &str, err: LayoutError) -> LayoutError {
    warn!(
        "event={event} module=grid status=rejected error_code={} error={}",
        err.code(),
        err
    );
    err
}

#[cfg(test)]
mod tests {
    use super::GridModel;
    use crate::grid::error::LayoutError;
    use crate::model::coord::{GridPoint, HalfGrid};
    use crate::model::layout::{FacilityLayout, GridSize};
    use crate::model::unit::{Unit, UnitStatus};

    fn unit_at(floor: i32, x: i64, y: i64, w: i64, h: i64) -> Unit {
        Unit::new(
            format!("U{x}-{y}"),
            floor,
            GridPoint::from_units(x, y),
            HalfGrid::from_units(w),
            HalfGrid::from_units(h),
        )
    }

    #[test]
    fn units_on_different_floors_never_collide() {
        let mut model = GridModel::new(GridSize::new(10, 10));
        model.add_unit(unit_at(1, 2, 2, 2, 2)).unwrap();
        model.add_unit(unit_at(2, 2, 2, 2, 2)).unwrap();
        assert_eq!(model.floors(), vec![1, 2]);
    }

    #[test]
    fn duplicate_id_is_rejected_across_floors() {
        let mut model = GridModel::new(GridSize::new(10, 10));
        let first = unit_at(1, 0, 0, 1, 1);
        let mut clone = unit_at(3, 5, 5, 1, 1);
        clone.id = first.id;
        model.add_unit(first).unwrap();

        let err = model.add_unit(clone.clone()).unwrap_err();
        assert_eq!(err, LayoutError::DuplicateId(clone.id));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn extreme_positions_are_out_of_bounds_not_overflow() {
        let mut model = GridModel::new(GridSize::new(10, 10));
        let id = model.add_unit(unit_at(1, 0, 0, 2, 2)).unwrap();
        let before = model.clone();

        let far_x = GridPoint::new(HalfGrid::from_halves(i64::MAX), HalfGrid::ZERO);
        let far_y = GridPoint::new(HalfGrid::ZERO, HalfGrid::from_halves(i64::MAX - 1));
        for position in [far_x, far_y] {
            let err = model.move_unit(id, position).unwrap_err();
            assert!(matches!(err, LayoutError::OutOfBounds { .. }));
        }

        let mut runaway = unit_at(1, 0, 0, 2, 2);
        runaway.position = far_x;
        let err = model.add_unit(runaway).unwrap_err();
        assert_eq!(err.code(), "out_of_bounds");
        assert_eq!(model, before);
    }

    #[test]
    fn move_to_own_footprint_is_allowed() {
        let mut model = GridModel::new(GridSize::new(10, 10));
        let unit = unit_at(1, 2, 2, 3, 3);
        let id = model.add_unit(unit).unwrap();

        model
            .move_unit(id, GridPoint::new(HalfGrid::from_halves(5), HalfGrid::from_units(2)))
            .unwrap();
        assert_eq!(
            model.unit(id).unwrap().position,
            GridPoint::new(HalfGrid::from_halves(5), HalfGrid::from_units(2))
        );
    }

    #[test]
    fn move_reports_checks_in_order() {
        let mut model = GridModel::new(GridSize::new(10, 10));
        let mut locked = unit_at(1, 0, 0, 2, 2);
        locked.locked = true;
        let locked_id = model.add_unit(locked).unwrap();

        let err = model
            .move_unit(locked_id, GridPoint::from_units(50, 50))
            .unwrap_err();
        assert_eq!(err, LayoutError::LockedUnit(locked_id));

        let free_id = model.add_unit(unit_at(1, 5, 5, 2, 2)).unwrap();
        let err = model
            .move_unit(free_id, GridPoint::from_units(9, 0))
            .unwrap_err();
        assert!(matches!(err, LayoutError::OutOfBounds { .. }));

        let err = model
            .move_unit(free_id, GridPoint::from_units(1, 1))
            .unwrap_err();
        assert!(
            matches!(err, LayoutError::Collision { conflicting_id, .. } if conflicting_id == locked_id)
        );
    }

    #[test]
    fn replace_all_rejects_overlap_and_keeps_state() {
        let mut model = GridModel::new(GridSize::new(10, 10));
        model.add_unit(unit_at(1, 0, 0, 2, 2)).unwrap();
        let before = model.clone();

        let mut layout = FacilityLayout::new(GridSize::new(20, 20));
        layout.units.push(unit_at(1, 0, 0, 4, 4));
        layout.units.push(unit_at(1, 3, 3, 2, 2));
        let err = model.replace_all(layout).unwrap_err();

        assert!(matches!(err, LayoutError::Collision { .. }));
        assert_eq!(model, before);
    }

    #[test]
    fn replace_all_rejects_empty_grid() {
        let mut model = GridModel::new(GridSize::new(10, 10));
        let err = model
            .replace_all(FacilityLayout::new(GridSize::new(0, 10)))
            .unwrap_err();
        assert!(matches!(err, LayoutError::SchemaValidation(_)));
        assert_eq!(model.grid_size(), GridSize::new(10, 10));
    }

    #[test]
    fn find_free_position_skips_occupied_cells() {
        let mut model = GridModel::new(GridSize::new(4, 4));
        model.add_unit(unit_at(1, 0, 0, 2, 2)).unwrap();

        let slot = model
            .find_free_position(1, HalfGrid::from_units(2), HalfGrid::from_units(2))
            .unwrap();
        assert_eq!(slot, GridPoint::from_units(2, 0));

        model.add_unit(unit_at(1, 2, 0, 2, 4)).unwrap();
        model.add_unit(unit_at(1, 0, 2, 2, 2)).unwrap();
        assert_eq!(
            model.find_free_position(1, HalfGrid::from_units(1), HalfGrid::from_units(1)),
            None
        );
        assert_eq!(
            model.find_free_position(2, HalfGrid::from_units(4), HalfGrid::from_units(4)),
            Some(GridPoint::ORIGIN)
        );
    }

    #[test]
    fn occupancy_counts_by_status() {
        let mut model = GridModel::new(GridSize::new(10, 10));
        let mut occupied = unit_at(1, 0, 0, 1, 1);
        occupied.status = UnitStatus::Occupied;
        model.add_unit(occupied).unwrap();
        model.add_unit(unit_at(1, 1, 0, 1, 1)).unwrap();
        model.add_unit(unit_at(2, 1, 0, 1, 1)).unwrap();

        let floor_one = model.occupancy(Some(1));
        assert_eq!(floor_one.total(), 2);
        assert_eq!(floor_one.occupied, 1);
        assert!((floor_one.occupancy_rate() - 0.5).abs() < f64::EPSILON);
        assert_eq!(model.occupancy(None).available, 2);
    }
}
