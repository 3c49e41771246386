//! Floor-plan domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the layout engine.
//! - Keep geometry in fixed-point grid units; floats only at the edges.
//!
//! # Invariants
//! - Every unit is identified by a stable, non-nil `UnitId`.
//! - Status has no effect on geometry.

pub mod coord;
pub mod layout;
pub mod unit;
