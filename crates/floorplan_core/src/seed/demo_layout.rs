//! Banded demo facility generator.
//!
//! Each floor gets a front corridor (entrance on floor 1, elevator on every
//! floor), then horizontal bands of same-size units separated by aisles.
//! Band sizes cycle through the standard catalog.

use crate::geometry::collision::within_bounds;
use crate::geometry::rect::GridRect;
use crate::grid::error::LayoutResult;
use crate::grid::grid_model::GridModel;
use crate::model::coord::{GridPoint, HalfGrid};
use crate::model::layout::{FacilityLayout, GridSize, Infrastructure, InfrastructureKind};
use crate::model::unit::{SizeCategory, Unit, UnitStatus};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Builder;

const CORRIDOR_DEPTH: i64 = 2;
const AISLE_WIDTH: i64 = 2;
const ENTRANCE_WIDTH: i64 = 4;
const ELEVATOR_SIDE: i64 = 2;

/// Relative odds for each status; all-zero means everything is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWeights {
    pub available: u32,
    pub occupied: u32,
    pub maintenance: u32,
    pub reserved: u32,
}

impl Default for StatusWeights {
    fn default() -> Self {
        Self {
            available: 45,
            occupied: 40,
            maintenance: 5,
            reserved: 10,
        }
    }
}

impl StatusWeights {
    fn pick(&self, rng: &mut ChaCha8Rng) -> UnitStatus {
        let table = [
            (UnitStatus::Available, self.available),
            (UnitStatus::Occupied, self.occupied),
            (UnitStatus::Maintenance, self.maintenance),
            (UnitStatus::Reserved, self.reserved),
        ];
        let total: u64 = table.iter().map(|(_, weight)| u64::from(*weight)).sum();
        if total == 0 {
            return UnitStatus::Available;
        }
        let mut roll = rng.gen_range(0..total);
        for (status, weight) in table {
            let weight = u64::from(weight);
            if roll < weight {
                return status;
            }
            roll -= weight;
        }
        UnitStatus::Available
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoLayoutConfig {
    pub grid_size: GridSize,
    pub floors: u8,
    pub status_weights: StatusWeights,
}

impl Default for DemoLayoutConfig {
    fn default() -> Self {
        Self {
            grid_size: GridSize::default(),
            floors: 2,
            status_weights: StatusWeights::default(),
        }
    }
}

/// Generates a full layout from `seed`.
///
/// The result goes through `GridModel::from_layout`, so a config whose grid
/// is empty fails the same way an imported document would.
pub fn demo_layout(seed: u64, config: &DemoLayoutConfig) -> LayoutResult<GridModel> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut layout = FacilityLayout::new(config.grid_size);

    for floor in 1..=i32::from(config.floors) {
        layout
            .infrastructure
            .extend(corridor_overlays(floor, config.grid_size));
        fill_floor(&mut rng, floor, config, &mut layout);
    }

    let model = GridModel::from_layout(layout)?;
    info!(
        "event=demo_generate module=seed status=ok seed={} floors={} units={}",
        seed,
        config.floors,
        model.len()
    );
    Ok(model)
}

fn corridor_overlays(floor: i32, grid: GridSize) -> Vec<Infrastructure> {
    let cols = i64::from(grid.cols);
    let mut overlays = Vec::new();
    if floor == 1 {
        overlays.push(Infrastructure {
            kind: InfrastructureKind::Entrance,
            floor,
            rect: rect_units(0, 0, ENTRANCE_WIDTH, CORRIDOR_DEPTH),
            label: Some("Main entrance".to_string()),
        });
    }
    overlays.push(Infrastructure {
        kind: InfrastructureKind::Elevator,
        floor,
        rect: rect_units(cols - ELEVATOR_SIDE, 0, ELEVATOR_SIDE, ELEVATOR_SIDE),
        label: Some("Elevator".to_string()),
    });
    overlays.retain(|overlay| within_bounds(&overlay.rect, grid));
    overlays
}

fn fill_floor(rng: &mut ChaCha8Rng, floor: i32, config: &DemoLayoutConfig, layout: &mut FacilityLayout) {
    let rows = HalfGrid::from_units(i64::from(config.grid_size.rows));
    let cols = HalfGrid::from_units(i64::from(config.grid_size.cols));
    let aisle = HalfGrid::from_units(AISLE_WIDTH);
    let mut y = HalfGrid::from_units(CORRIDOR_DEPTH);

    for (band, size) in SizeCategory::STANDARD.iter().cycle().enumerate() {
        let Some((width, height)) = size.grid_extent() else {
            continue;
        };
        if y + height > rows {
            break;
        }
        let letter = char::from(b'A' + (band % 26) as u8);

        let mut x = HalfGrid::ZERO;
        let mut slot = 1;
        while x + width <= cols {
            let unit_number = format!("{floor}{letter}{slot:02}");
            if let Some(unit) = demo_unit(rng, unit_number, floor, GridPoint::new(x, y), *size, config) {
                layout.units.push(unit);
            }
            x = x + width;
            slot += 1;
        }

        y = y + height;
        if y + aisle > rows {
            break;
        }
        layout.infrastructure.push(Infrastructure {
            kind: InfrastructureKind::Aisle,
            floor,
            rect: GridRect::new(GridPoint::new(HalfGrid::ZERO, y), cols, aisle),
            label: None,
        });
        y = y + aisle;
    }
}

fn demo_unit(
    rng: &mut ChaCha8Rng,
    unit_number: String,
    floor: i32,
    position: GridPoint,
    size: SizeCategory,
    config: &DemoLayoutConfig,
) -> Option<Unit> {
    let mut unit = Unit::with_size_category(unit_number, floor, position, size)?;
    unit.id = Builder::from_random_bytes(rng.gen()).into_uuid();
    unit.status = config.status_weights.pick(rng);
    unit.locked = unit.status == UnitStatus::Occupied && rng.gen_bool(0.2);
    if rng.gen_bool(0.3) {
        unit.features.insert("climate_controlled".to_string());
    }
    if floor == 1 && size.real_size().1 >= 20.0 {
        unit.features.insert("drive_up".to_string());
    }
    Some(unit)
}

fn rect_units(x: i64, y: i64, width: i64, height: i64) -> GridRect {
    GridRect::new(
        GridPoint::from_units(x, y),
        HalfGrid::from_units(width),
        HalfGrid::from_units(height),
    )
}
