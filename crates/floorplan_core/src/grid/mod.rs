//! Layout store and its error taxonomy.
//!
//! # Responsibility
//! - Hold the single source of truth for unit placement.
//! - Reject every mutation that would break a layout invariant.
//!
//! # Invariants
//! - Mutations are all-or-nothing; errors imply no state change.
//! - Mutations take `&mut self`, so at most one is ever in flight.

pub mod error;
pub mod grid_model;

pub use error::{LayoutError, LayoutResult};
pub use grid_model::{GridModel, OccupancySummary};
