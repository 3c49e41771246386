use floorplan_core::{
    ConfigError, ConsoleConfig, ConsoleError, DemoLayoutConfig, FacilityConsole, GridFraction,
    GridPoint, HalfGrid, LayoutError, NewUnitRequest, PlacementState, RevertReason, ScreenPoint,
    ScreenSize, SizeCategory, UnitPatch, UnitStatus,
};
use tempfile::TempDir;

fn editing_console() -> FacilityConsole {
    let config = ConsoleConfig::from_json_str(r#"{ "placement": { "editMode": true } }"#).unwrap();
    FacilityConsole::new(&config).unwrap()
}

#[test]
fn config_json_overrides_only_given_keys() {
    let config = ConsoleConfig::from_json_str(
        r#"{ "grid": { "rows": 12, "cols": 18 }, "viewport": { "zoomMax": 3.0 } }"#,
    )
    .unwrap();
    assert_eq!(config.grid.rows, 12);
    assert_eq!(config.viewport.zoom_max, 3.0);
    assert_eq!(config.viewport.cell_size, 40.0);
    assert!(config.placement.snap_to_grid);
    assert!(!config.placement.edit_mode);
}

#[test]
fn invalid_config_is_rejected_by_console() {
    let mut config = ConsoleConfig::default();
    config.viewport.initial_zoom = 5.0;
    let err = FacilityConsole::new(&config).unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::Config(ConfigError::InitialZoomOutOfBounds(_))
    ));
}

#[test]
fn drag_rejected_by_collision_reverts_to_origin() {
    let mut console = editing_console();
    let a = console
        .create_unit(NewUnitRequest::new("1A01", 1, SizeCategory::Medium10x10).at(GridPoint::ORIGIN))
        .unwrap();
    let b = console
        .create_unit(
            NewUnitRequest::new("1A02", 1, SizeCategory::Medium10x10)
                .at(GridPoint::from_units(4, 0)),
        )
        .unwrap();

    console.begin_drag(a.id).unwrap();
    // Grid (4.2, 0.3) snaps to (4.0, 0.5), on top of b.
    console.drag_to(ScreenPoint::new(168.0, 12.0));
    let state = console.drop_unit();

    match state {
        PlacementState::Reverted {
            unit_id,
            position,
            reason: RevertReason::Rejected(LayoutError::Collision { conflicting_id, .. }),
        } => {
            assert_eq!(unit_id, a.id);
            assert_eq!(position, GridPoint::ORIGIN);
            assert_eq!(conflicting_id, b.id);
        }
        other => panic!("expected collision revert, got {other:?}"),
    }
    assert_eq!(console.display_position(a.id), Some(GridPoint::ORIGIN.to_coord()));
    console.settle_drag();
    assert_eq!(console.placement().state(), &PlacementState::Idle);
}

#[test]
fn unsnapped_drag_shows_continuous_candidate_and_commits_nearest_half() {
    let mut console = editing_console();
    console.set_snap_to_grid(false);
    let unit = console
        .create_unit(NewUnitRequest::new("1A01", 1, SizeCategory::Small5x5))
        .unwrap();

    console.begin_drag(unit.id).unwrap();
    let candidate = console.drag_to(ScreenPoint::new(130.0, 90.0)).unwrap();
    assert_eq!(candidate.x, 3.25);
    assert_eq!(console.display_position(unit.id), Some(candidate));
    let indicator = console.hover_indicator().unwrap();
    assert!(indicator.valid);
    assert_eq!(indicator.screen_rect.width, 40.0);

    console.drop_unit();
    let stored = console.model().unit(unit.id).unwrap().position;
    // 3.25 and 2.25 round away from zero at the half-grid tie.
    assert_eq!(
        stored,
        GridPoint::new(HalfGrid::from_halves(7), HalfGrid::from_halves(5))
    );
}

#[test]
fn pointer_leaving_canvas_cancels_without_mutation() {
    let mut console = editing_console();
    let unit = console
        .create_unit(NewUnitRequest::new("1A01", 1, SizeCategory::Small5x10))
        .unwrap();
    let before = console.export_json().unwrap();

    console.begin_drag(unit.id).unwrap();
    console.drag_to(ScreenPoint::new(300.0, 300.0));
    console.cancel_drag();

    assert!(matches!(
        console.placement().state(),
        PlacementState::Reverted {
            reason: RevertReason::Cancelled,
            ..
        }
    ));
    assert_eq!(console.export_json().unwrap(), before);
}

#[test]
fn status_update_never_moves_unit() {
    let mut console = editing_console();
    let unit = console
        .create_unit(NewUnitRequest::new("1A01", 1, SizeCategory::Large10x20))
        .unwrap();

    let updated = console
        .update_unit(
            unit.id,
            &UnitPatch {
                status: Some(UnitStatus::Maintenance),
                ..UnitPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.status, UnitStatus::Maintenance);
    assert_eq!(updated.position, unit.position);
    assert_eq!(console.occupancy(Some(1)).maintenance, 1);
}

#[test]
fn viewport_controls_do_not_touch_layout() {
    let mut console = editing_console();
    console.load_demo(21, &DemoLayoutConfig::default()).unwrap();
    let before = console.model().clone();

    console.zoom_in();
    console.zoom_at(ScreenPoint::new(200.0, 100.0), 1.5);
    console.scroll_by(-120.0, -40.0);
    let size = ScreenSize::new(800.0, 600.0);
    console.center_on_minimap(GridFraction { x: 0.5, y: 0.5 }, size);
    let visible = console.minimap_viewport(size);

    assert!(visible.width > 0.0 && visible.width <= 1.0);
    assert_eq!(console.model(), &before);
}

#[test]
fn console_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("facility.json");
    let mut console = editing_console();
    console.load_demo(4, &DemoLayoutConfig::default()).unwrap();
    console.save_file(&path).unwrap();

    let mut other = editing_console();
    other.load_file(&path).unwrap();
    assert_eq!(other.model(), console.model());

    let err = other.load_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, ConsoleError::Persist(_)));
}
