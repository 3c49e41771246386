//! Interactive unit placement.
//!
//! # Responsibility
//! - Drive drag-and-drop relocation on top of `GridModel`.
//!
//! # Invariants
//! - One drop performs at most one model mutation.

pub mod controller;

pub use controller::{
    DragRejection, DragSession, HoverIndicator, PlacementController, PlacementSettings,
    PlacementState, RevertReason,
};
