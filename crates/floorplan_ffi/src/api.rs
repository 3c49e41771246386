//! FFI use-case API for the Flutter floor-plan console.
//!
//! # Responsibility
//! - Expose stable, use-case-level layout functions to Dart via FRB.
//! - Flatten engine types into plain DTOs and response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - All calls go through one process-wide console lock, so a document
//!   import can never interleave with a drag commit.
//! - Grid values cross the boundary as `f64` grid units; screen values as
//!   canvas pixels.

use floorplan_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ConsoleConfig, DemoLayoutConfig, FacilityConsole, FillPattern, GridCoord, GridFraction,
    GridPoint, NewUnitRequest, PlacementState, ScreenPoint, ScreenSize, SizeCategory, Unit, UnitId,
    UnitPatch, UnitStatus,
};
use log::warn;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::{Mutex, OnceLock, PoisonError};
use uuid::Uuid;

static CONSOLE: OnceLock<Mutex<Option<FacilityConsole>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat unit projection for rendering and forms.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitView {
    pub unit_id: String,
    pub unit_number: String,
    pub floor: i32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub real_width: f64,
    pub real_height: f64,
    /// `available|occupied|maintenance|reserved`.
    pub status: String,
    pub locked: bool,
    pub features: Vec<String>,
    /// Collaborator passthrough fields as a JSON object.
    pub attributes_json: String,
    pub fill: String,
    pub border: String,
    /// `solid|hatched|dotted|striped`.
    pub pattern: String,
}

/// Continuous grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCoordView {
    pub x: f64,
    pub y: f64,
}

/// Canvas pixel position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPointView {
    pub x: f64,
    pub y: f64,
}

/// Visible region as fractions of the full grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapView {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Generic action response envelope for layout commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected unit ID, when the command targets one unit.
    pub unit_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl LayoutActionResponse {
    fn success(message: impl Into<String>, unit_id: Option<String>) -> Self {
        Self {
            ok: true,
            unit_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            unit_id: None,
            message: message.into(),
        }
    }
}

/// Export response carrying the JSON layout document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDocumentResponse {
    pub ok: bool,
    /// Pretty JSON document; empty on failure.
    pub document: String,
    pub message: String,
}

/// Replaces the console with a fresh, empty one built from `config_json`.
///
/// Blank input uses defaults.
#[flutter_rust_bridge::frb(sync)]
pub fn console_init(config_json: String) -> LayoutActionResponse {
    let console = ConsoleConfig::from_json_str(&config_json)
        .map_err(|err| err.to_string())
        .and_then(|config| FacilityConsole::new(&config).map_err(|err| err.to_string()));
    match console {
        Ok(console) => {
            *lock_console() = Some(console);
            LayoutActionResponse::success("Console initialized.", None)
        }
        Err(err) => LayoutActionResponse::failure(format!("console_init failed: {err}")),
    }
}

/// Units on one floor in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn layout_units_on_floor(floor: i32) -> Vec<UnitView> {
    with_console(|console| {
        console
            .units_on_floor(floor)
            .iter()
            .map(|unit| unit_view(unit, console.display_position(unit.id).map(|c| (c.x, c.y))))
            .collect()
    })
    .unwrap_or_default()
}

/// Creates a unit from the add-unit form.
///
/// Input semantics:
/// - `size`: catalog label such as `10x20`.
/// - `x`/`y`: both set for an explicit position, both `None` for the first
///   free slot.
/// - `status`: wire label; `None` means available.
/// - `attributes_json`: optional JSON object of collaborator fields (rate,
///   customer, ...); schema keys are dropped.
#[allow(clippy::too_many_arguments)]
#[flutter_rust_bridge::frb(sync)]
pub fn layout_create_unit(
    unit_number: String,
    floor: i32,
    size: String,
    x: Option<f64>,
    y: Option<f64>,
    status: Option<String>,
    features: Vec<String>,
    attributes_json: Option<String>,
) -> LayoutActionResponse {
    let request = new_unit_request(unit_number, floor, &size, x, y, status).and_then(|mut request| {
        request.features = feature_set(features);
        if let Some(raw) = attributes_json {
            request.attributes = parse_attributes(&raw)?;
        }
        Ok(request)
    });
    let request = match request {
        Ok(request) => request,
        Err(err) => return LayoutActionResponse::failure(format!("layout_create_unit failed: {err}")),
    };
    match with_console(|console| console.create_unit(request).map_err(|err| err.to_string())) {
        Ok(Ok(unit)) => LayoutActionResponse::success("Unit created.", Some(unit.id.to_string())),
        Ok(Err(err)) | Err(err) => {
            LayoutActionResponse::failure(format!("layout_create_unit failed: {err}"))
        }
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn layout_remove_unit(unit_id: String) -> LayoutActionResponse {
    unit_command("layout_remove_unit", &unit_id, "Unit removed.", |console, id| {
        console.remove_unit(id).map(|_| ()).map_err(|err| err.to_string())
    })
}

/// Moves a unit directly; `x`/`y` must be multiples of 0.5.
#[flutter_rust_bridge::frb(sync)]
pub fn layout_move_unit(unit_id: String, x: f64, y: f64) -> LayoutActionResponse {
    unit_command("layout_move_unit", &unit_id, "Unit moved.", |console, id| {
        let position = half_grid_point(x, y)?;
        console.move_unit(id, position).map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn layout_set_status(unit_id: String, status: String) -> LayoutActionResponse {
    unit_command("layout_set_status", &unit_id, "Status updated.", |console, id| {
        let patch = UnitPatch {
            status: Some(parse_status(&status)?),
            ..UnitPatch::default()
        };
        console
            .update_unit(id, &patch)
            .map(|_| ())
            .map_err(|err| err.to_string())
    })
}

/// Applies non-geometric edits to one unit.
///
/// Input semantics:
/// - `patch_json`: object with any of `unitNumber`, `status`, `locked`,
///   `features` and `attributes`. Omitted keys stay unchanged; an
///   attribute set to `null` is removed.
#[flutter_rust_bridge::frb(sync)]
pub fn layout_update_unit(unit_id: String, patch_json: String) -> LayoutActionResponse {
    unit_command("layout_update_unit", &unit_id, "Unit updated.", |console, id| {
        let patch = parse_unit_patch(&patch_json)?;
        console
            .update_unit(id, &patch)
            .map(|_| ())
            .map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn layout_set_locked(unit_id: String, locked: bool) -> LayoutActionResponse {
    unit_command("layout_set_locked", &unit_id, "Lock updated.", |console, id| {
        let patch = UnitPatch {
            locked: Some(locked),
            ..UnitPatch::default()
        };
        console
            .update_unit(id, &patch)
            .map(|_| ())
            .map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn drag_set_edit_mode(enabled: bool) -> bool {
    with_console(|console| console.set_edit_mode(enabled)).is_ok()
}

#[flutter_rust_bridge::frb(sync)]
pub fn drag_set_snap_to_grid(enabled: bool) -> bool {
    with_console(|console| console.set_snap_to_grid(enabled)).is_ok()
}

#[flutter_rust_bridge::frb(sync)]
pub fn drag_begin(unit_id: String) -> LayoutActionResponse {
    unit_command("drag_begin", &unit_id, "Drag started.", |console, id| {
        console.begin_drag(id).map_err(|err| err.to_string())
    })
}

/// Feeds a pointer position; returns the candidate while dragging.
#[flutter_rust_bridge::frb(sync)]
pub fn drag_move(screen_x: f64, screen_y: f64) -> Option<GridCoordView> {
    with_console(|console| console.drag_to(ScreenPoint::new(screen_x, screen_y)))
        .ok()
        .flatten()
        .map(|coord| GridCoordView {
            x: coord.x,
            y: coord.y,
        })
}

/// Drops the dragged unit and settles the controller back to idle.
///
/// `ok` is false when the drop was reverted; `message` carries the reason.
#[flutter_rust_bridge::frb(sync)]
pub fn drag_drop() -> LayoutActionResponse {
    let outcome = with_console(|console| {
        let state = console.drop_unit();
        console.settle_drag();
        state
    });
    match outcome {
        Ok(PlacementState::Committed { unit_id, position }) => LayoutActionResponse::success(
            format!("Unit moved to {position}."),
            Some(unit_id.to_string()),
        ),
        Ok(PlacementState::Reverted {
            unit_id, reason, ..
        }) => LayoutActionResponse {
            ok: false,
            unit_id: Some(unit_id.to_string()),
            message: format!("drag_drop reverted: {reason}"),
        },
        Ok(_) => LayoutActionResponse::failure("drag_drop failed: no drag in progress"),
        Err(err) => LayoutActionResponse::failure(format!("drag_drop failed: {err}")),
    }
}

/// Cancels any in-flight drag (pointer left the canvas).
#[flutter_rust_bridge::frb(sync)]
pub fn drag_cancel() -> bool {
    with_console(|console| {
        console.cancel_drag();
        console.settle_drag();
    })
    .is_ok()
}

/// Returns the applied zoom.
#[flutter_rust_bridge::frb(sync)]
pub fn viewport_set_zoom(value: f64) -> f64 {
    with_console(|console| console.set_zoom(value)).unwrap_or(1.0)
}

#[flutter_rust_bridge::frb(sync)]
pub fn viewport_zoom_in() -> f64 {
    with_console(|console| console.zoom_in()).unwrap_or(1.0)
}

#[flutter_rust_bridge::frb(sync)]
pub fn viewport_zoom_out() -> f64 {
    with_console(|console| console.zoom_out()).unwrap_or(1.0)
}

/// Zooms while keeping the grid point under the pointer in place.
#[flutter_rust_bridge::frb(sync)]
pub fn viewport_zoom_at(screen_x: f64, screen_y: f64, value: f64) -> f64 {
    with_console(|console| console.zoom_at(ScreenPoint::new(screen_x, screen_y), value))
        .unwrap_or(1.0)
}

#[flutter_rust_bridge::frb(sync)]
pub fn viewport_scroll_by(dx: f64, dy: f64) -> bool {
    with_console(|console| console.scroll_by(dx, dy)).is_ok()
}

#[flutter_rust_bridge::frb(sync)]
pub fn viewport_screen_to_grid(screen_x: f64, screen_y: f64) -> GridCoordView {
    with_console(|console| {
        console
            .viewport()
            .screen_to_grid(ScreenPoint::new(screen_x, screen_y))
    })
    .map(|coord| GridCoordView {
        x: coord.x,
        y: coord.y,
    })
    .unwrap_or(GridCoordView { x: 0.0, y: 0.0 })
}

#[flutter_rust_bridge::frb(sync)]
pub fn viewport_grid_to_screen(x: f64, y: f64) -> ScreenPointView {
    with_console(|console| console.viewport().grid_to_screen(GridCoord { x, y }))
        .map(|point| ScreenPointView {
            x: point.x,
            y: point.y,
        })
        .unwrap_or(ScreenPointView { x: 0.0, y: 0.0 })
}

/// Scrolls so the minimap click at fraction (`x`, `y`) becomes the
/// viewport center.
#[flutter_rust_bridge::frb(sync)]
pub fn viewport_center_on_minimap(
    x: f64,
    y: f64,
    viewport_width: f64,
    viewport_height: f64,
) -> bool {
    with_console(|console| {
        console.center_on_minimap(
            GridFraction { x, y },
            ScreenSize::new(viewport_width, viewport_height),
        )
    })
    .is_ok()
}

#[flutter_rust_bridge::frb(sync)]
pub fn viewport_minimap(viewport_width: f64, viewport_height: f64) -> MinimapView {
    let visible = with_console(|console| {
        console.minimap_viewport(ScreenSize::new(viewport_width, viewport_height))
    })
    .unwrap_or_default();
    MinimapView {
        x: visible.x,
        y: visible.y,
        width: visible.width,
        height: visible.height,
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn layout_export_json() -> LayoutDocumentResponse {
    match with_console(|console| console.export_json().map_err(|err| err.to_string())) {
        Ok(Ok(document)) => LayoutDocumentResponse {
            ok: true,
            document,
            message: "Layout exported.".to_string(),
        },
        Ok(Err(err)) | Err(err) => LayoutDocumentResponse {
            ok: false,
            document: String::new(),
            message: format!("layout_export_json failed: {err}"),
        },
    }
}

/// Replaces the whole layout; on failure nothing changes.
#[flutter_rust_bridge::frb(sync)]
pub fn layout_import_json(document: String) -> LayoutActionResponse {
    document_command("layout_import_json", "Layout imported.", |console| {
        console.import_json(&document).map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn layout_save_file(path: String) -> LayoutActionResponse {
    document_command("layout_save_file", "Layout saved.", |console| {
        console.save_file(path.trim()).map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn layout_load_file(path: String) -> LayoutActionResponse {
    document_command("layout_load_file", "Layout loaded.", |console| {
        console.load_file(path.trim()).map_err(|err| err.to_string())
    })
}

/// Replaces the layout with the seeded demo facility.
#[flutter_rust_bridge::frb(sync)]
pub fn layout_load_demo(seed: u64) -> LayoutActionResponse {
    document_command("layout_load_demo", "Demo layout loaded.", |console| {
        console
            .load_demo(seed, &DemoLayoutConfig::default())
            .map_err(|err| err.to_string())
    })
}

fn lock_console() -> std::sync::MutexGuard<'static, Option<FacilityConsole>> {
    let slot = CONSOLE.get_or_init(|| Mutex::new(None));
    slot.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("event=console_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

fn with_console<R>(f: impl FnOnce(&mut FacilityConsole) -> R) -> Result<R, String> {
    let mut guard = lock_console();
    if guard.is_none() {
        let console = FacilityConsole::new(&ConsoleConfig::default())
            .map_err(|err| format!("console init failed: {err}"))?;
        *guard = Some(console);
    }
    let Some(console) = guard.as_mut() else {
        return Err("console unavailable".to_string());
    };
    Ok(f(console))
}

fn unit_command(
    name: &str,
    unit_id: &str,
    success: &str,
    f: impl FnOnce(&mut FacilityConsole, UnitId) -> Result<(), String>,
) -> LayoutActionResponse {
    let id = match parse_unit_id(unit_id) {
        Ok(id) => id,
        Err(err) => return LayoutActionResponse::failure(format!("{name} failed: {err}")),
    };
    match with_console(|console| f(console, id)) {
        Ok(Ok(())) => LayoutActionResponse::success(success, Some(id.to_string())),
        Ok(Err(err)) | Err(err) => LayoutActionResponse::failure(format!("{name} failed: {err}")),
    }
}

fn document_command(
    name: &str,
    success: &str,
    f: impl FnOnce(&mut FacilityConsole) -> Result<(), String>,
) -> LayoutActionResponse {
    match with_console(f) {
        Ok(Ok(())) => LayoutActionResponse::success(success, None),
        Ok(Err(err)) | Err(err) => LayoutActionResponse::failure(format!("{name} failed: {err}")),
    }
}

fn new_unit_request(
    unit_number: String,
    floor: i32,
    size: &str,
    x: Option<f64>,
    y: Option<f64>,
    status: Option<String>,
) -> Result<NewUnitRequest, String> {
    let unit_number = unit_number.trim().to_string();
    if unit_number.is_empty() {
        return Err("unit number cannot be empty".to_string());
    }
    let mut request = NewUnitRequest::new(unit_number, floor, parse_size(size)?);
    request.position = match (x, y) {
        (Some(x), Some(y)) => Some(half_grid_point(x, y)?),
        (None, None) => None,
        _ => return Err("x and y must be given together".to_string()),
    };
    if let Some(status) = status {
        request.status = parse_status(&status)?;
    }
    Ok(request)
}

/// Wire shape of `layout_update_unit` input.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UnitPatchInput {
    unit_number: Option<String>,
    status: Option<String>,
    locked: Option<bool>,
    features: Option<Vec<String>>,
    #[serde(default)]
    attributes: Map<String, Value>,
}

fn parse_unit_patch(raw: &str) -> Result<UnitPatch, String> {
    let input: UnitPatchInput =
        serde_json::from_str(raw).map_err(|err| format!("invalid unit patch: {err}"))?;
    let unit_number = match input.unit_number {
        Some(number) if number.trim().is_empty() => {
            return Err("unit number cannot be empty".to_string())
        }
        Some(number) => Some(number.trim().to_string()),
        None => None,
    };
    let status = input.status.as_deref().map(parse_status).transpose()?;
    Ok(UnitPatch {
        unit_number,
        status,
        locked: input.locked,
        features: input.features.map(feature_set),
        attributes: input.attributes,
    })
}

fn parse_attributes(raw: &str) -> Result<Map<String, Value>, String> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("attributes must be a JSON object".to_string()),
        Err(err) => Err(format!("invalid attributes: {err}")),
    }
}

fn feature_set(features: Vec<String>) -> BTreeSet<String> {
    features
        .into_iter()
        .map(|feature| feature.trim().to_string())
        .filter(|feature| !feature.is_empty())
        .collect()
}

fn parse_unit_id(raw: &str) -> Result<UnitId, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid unit id `{raw}`: {err}"))
}

fn parse_size(raw: &str) -> Result<SizeCategory, String> {
    let wanted = raw.trim();
    SizeCategory::STANDARD
        .into_iter()
        .find(|size| size.label() == wanted)
        .ok_or_else(|| format!("unknown unit size `{wanted}`"))
}

fn parse_status(raw: &str) -> Result<UnitStatus, String> {
    UnitStatus::parse(raw).ok_or_else(|| format!("unknown unit status `{}`", raw.trim()))
}

fn half_grid_point(x: f64, y: f64) -> Result<GridPoint, String> {
    GridPoint::from_f64_exact(x, y)
        .ok_or_else(|| format!("position ({x}, {y}) must be a multiple of 0.5"))
}

fn unit_view(unit: &Unit, display_position: Option<(f64, f64)>) -> UnitView {
    let (x, y) = display_position.unwrap_or((unit.position.x.to_f64(), unit.position.y.to_f64()));
    let style = unit.style();
    UnitView {
        unit_id: unit.id.to_string(),
        unit_number: unit.unit_number.clone(),
        floor: unit.floor,
        x,
        y,
        width: unit.width.to_f64(),
        height: unit.height.to_f64(),
        real_width: unit.real_width,
        real_height: unit.real_height,
        status: unit.status.as_str().to_string(),
        locked: unit.locked,
        features: unit.features.iter().cloned().collect(),
        attributes_json: Value::Object(unit.attributes.clone()).to_string(),
        fill: style.fill.to_string(),
        border: style.border.to_string(),
        pattern: pattern_label(style.pattern).to_string(),
    }
}

fn pattern_label(pattern: FillPattern) -> &'static str {
    match pattern {
        FillPattern::Solid => "solid",
        FillPattern::Hatched => "hatched",
        FillPattern::Dotted => "dotted",
        FillPattern::Striped => "striped",
    }
}

#[cfg(test)]
mod tests {
    // Tests share the process-wide console; each one works on its own floor
    // and none of them replaces the whole layout.
    use super::{
        core_version, drag_begin, drag_drop, drag_move, drag_set_edit_mode, init_logging,
        layout_create_unit, layout_export_json, layout_import_json, layout_move_unit,
        layout_remove_unit, layout_set_locked, layout_set_status, layout_units_on_floor,
        layout_update_unit, parse_size, ping, viewport_center_on_minimap,
        viewport_grid_to_screen, viewport_minimap, viewport_scroll_by, viewport_screen_to_grid,
        viewport_set_zoom, viewport_zoom_at,
    };
    use floorplan_core::SizeCategory;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    // Serializes tests that read or change the shared viewport.
    static VIEWPORT: Mutex<()> = Mutex::new(());

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn size_labels_match_catalog() {
        assert_eq!(parse_size("10x20").unwrap(), SizeCategory::Large10x20);
        assert_eq!(parse_size(" 5x5 ").unwrap(), SizeCategory::Small5x5);
        assert!(parse_size("7x7").is_err());
    }

    #[test]
    fn create_collide_and_remove() {
        let floor = 101;
        let first = layout_create_unit(
            "101A".to_string(),
            floor,
            "10x10".to_string(),
            Some(2.0),
            Some(2.0),
            None,
            Vec::new(),
            None,
        );
        assert!(first.ok, "{}", first.message);

        let clash = layout_create_unit(
            "101B".to_string(),
            floor,
            "10x10".to_string(),
            Some(2.0),
            Some(2.0),
            Some("occupied".to_string()),
            Vec::new(),
            None,
        );
        assert!(!clash.ok);
        assert!(clash.message.contains("collides"), "{}", clash.message);

        let units = layout_units_on_floor(floor);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].status, "available");
        assert_eq!(units[0].pattern, "solid");

        let removed = layout_remove_unit(first.unit_id.unwrap());
        assert!(removed.ok, "{}", removed.message);
        assert!(layout_units_on_floor(floor).is_empty());
    }

    #[test]
    fn off_grid_and_locked_moves_are_rejected() {
        let floor = 102;
        let created = layout_create_unit(
            "102A".to_string(),
            floor,
            "5x5".to_string(),
            None,
            None,
            None,
            Vec::new(),
            None,
        );
        let unit_id = created.unit_id.unwrap();

        let off_grid = layout_move_unit(unit_id.clone(), 1.3, 0.0);
        assert!(!off_grid.ok);
        assert!(off_grid.message.contains("0.5"));

        assert!(layout_set_status(unit_id.clone(), "reserved".to_string()).ok);
        assert!(!layout_set_status(unit_id.clone(), "vip".to_string()).ok);
        assert!(layout_set_locked(unit_id.clone(), true).ok);
        let locked = layout_move_unit(unit_id, 3.0, 3.0);
        assert!(!locked.ok);
        assert!(locked.message.contains("locked"), "{}", locked.message);
    }

    #[test]
    fn drag_lifecycle_commits_snapped_position() {
        let _viewport = VIEWPORT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let floor = 103;
        let created = layout_create_unit(
            "103A".to_string(),
            floor,
            "5x5".to_string(),
            Some(0.0),
            Some(0.0),
            None,
            Vec::new(),
            None,
        );
        let unit_id = created.unit_id.unwrap();
        assert!(drag_set_edit_mode(true));

        assert!(drag_begin(unit_id.clone()).ok);
        let origin = viewport_screen_to_grid(0.0, 0.0);
        assert_eq!((origin.x, origin.y), (0.0, 0.0));
        let candidate = drag_move(412.0, 408.0).unwrap();
        assert_eq!((candidate.x, candidate.y), (10.5, 10.0));

        let dropped = drag_drop();
        assert!(dropped.ok, "{}", dropped.message);
        let unit = layout_units_on_floor(floor).remove(0);
        assert_eq!((unit.x, unit.y), (candidate.x, candidate.y));
    }

    #[test]
    fn create_with_features_and_attributes_then_update() {
        let floor = 104;
        let created = layout_create_unit(
            "104A".to_string(),
            floor,
            "10x15".to_string(),
            None,
            None,
            None,
            vec!["climate_controlled".to_string(), " ".to_string()],
            Some(r#"{ "rate": 95, "customer": "Ada", "status": "occupied" }"#.to_string()),
        );
        assert!(created.ok, "{}", created.message);
        let unit_id = created.unit_id.unwrap();

        let unit = layout_units_on_floor(floor).remove(0);
        assert_eq!(unit.features, vec!["climate_controlled"]);
        assert_eq!(unit.status, "available");
        let attributes: Value = serde_json::from_str(&unit.attributes_json).unwrap();
        assert_eq!(attributes, json!({ "rate": 95, "customer": "Ada" }));

        let patch = json!({
            "unitNumber": "104Z",
            "status": "occupied",
            "features": ["drive_up"],
            "attributes": { "customer": null, "notes": "gate code" }
        });
        let updated = layout_update_unit(unit_id.clone(), patch.to_string());
        assert!(updated.ok, "{}", updated.message);

        let unit = layout_units_on_floor(floor).remove(0);
        assert_eq!(unit.unit_number, "104Z");
        assert_eq!(unit.status, "occupied");
        assert_eq!(unit.features, vec!["drive_up"]);
        let attributes: Value = serde_json::from_str(&unit.attributes_json).unwrap();
        assert_eq!(attributes, json!({ "rate": 95, "notes": "gate code" }));
    }

    #[test]
    fn bad_create_and_update_input_is_rejected() {
        let floor = 105;
        let bad_attributes = layout_create_unit(
            "105A".to_string(),
            floor,
            "5x5".to_string(),
            None,
            None,
            None,
            Vec::new(),
            Some("[1, 2]".to_string()),
        );
        assert!(!bad_attributes.ok);
        assert!(layout_units_on_floor(floor).is_empty());

        let created = layout_create_unit(
            "105A".to_string(),
            floor,
            "5x5".to_string(),
            None,
            None,
            None,
            Vec::new(),
            None,
        );
        let unit_id = created.unit_id.unwrap();
        for patch in [
            r#"{ "position": { "x": 1, "y": 1 } }"#,
            r#"{ "status": "vip" }"#,
            r#"{ "unitNumber": "  " }"#,
            "not json",
        ] {
            let response = layout_update_unit(unit_id.clone(), patch.to_string());
            assert!(!response.ok, "{patch}");
            assert!(response.message.starts_with("layout_update_unit failed"));
        }
        assert_eq!(layout_units_on_floor(floor)[0].unit_number, "105A");
    }

    #[test]
    fn viewport_controls_round_trip() {
        let _viewport = VIEWPORT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let anchor = (300.0, 200.0);
        let pinned = viewport_screen_to_grid(anchor.0, anchor.1);
        assert_close(viewport_zoom_at(anchor.0, anchor.1, 1.5), 1.5);
        let after = viewport_screen_to_grid(anchor.0, anchor.1);
        assert_close(after.x, pinned.x);
        assert_close(after.y, pinned.y);

        let screen = viewport_grid_to_screen(after.x, after.y);
        assert_close(screen.x, anchor.0);
        assert_close(screen.y, anchor.1);

        assert!(viewport_center_on_minimap(0.5, 0.5, 800.0, 600.0));
        let visible = viewport_minimap(800.0, 600.0);
        assert_close(visible.x + visible.width / 2.0, 0.5);
        assert_close(visible.y + visible.height / 2.0, 0.5);

        // Restore the default view for other tests.
        viewport_set_zoom(1.0);
        let origin = viewport_grid_to_screen(0.0, 0.0);
        assert!(viewport_scroll_by(-origin.x, -origin.y));
        let origin = viewport_grid_to_screen(0.0, 0.0);
        assert_eq!((origin.x, origin.y), (0.0, 0.0));
    }

    #[test]
    fn malformed_import_reports_failure() {
        let response = layout_import_json("{ not json".to_string());
        assert!(!response.ok);
        assert!(layout_export_json().ok);
    }

    #[test]
    fn bad_unit_id_is_reported() {
        let response = layout_remove_unit("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.starts_with("layout_remove_unit failed"));
    }
}
