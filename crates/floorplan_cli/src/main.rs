//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `floorplan_core` linkage.
//! - Print a deterministic demo layout summary, or its full document with
//!   `--json`.

use floorplan_core::{demo_layout, export_layout_json, DemoLayoutConfig};

const DEMO_SEED: u64 = 42;

fn main() {
    println!("floorplan_core ping={}", floorplan_core::ping());
    println!("floorplan_core version={}", floorplan_core::core_version());

    let model = match demo_layout(DEMO_SEED, &DemoLayoutConfig::default()) {
        Ok(model) => model,
        Err(err) => {
            eprintln!("demo layout failed: {err}");
            std::process::exit(1);
        }
    };

    if std::env::args().any(|arg| arg == "--json") {
        match export_layout_json(&model) {
            Ok(document) => println!("{document}"),
            Err(err) => {
                eprintln!("demo export failed: {err}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("demo seed={} grid={} units={}", DEMO_SEED, model.grid_size(), model.len());
    for floor in model.floors() {
        let summary = model.occupancy(Some(floor));
        println!(
            "floor={} units={} available={} occupied={} maintenance={} reserved={} occupancy={:.0}%",
            floor,
            summary.total(),
            summary.available,
            summary.occupied,
            summary.maintenance,
            summary.reserved,
            summary.occupancy_rate() * 100.0
        );
    }
}
