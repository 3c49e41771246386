//! Grid geometry primitives.
//!
//! # Responsibility
//! - Describe unit footprints as half-open fixed-point rectangles.
//! - Provide the collision and bounds predicates every mutation path uses.

pub mod collision;
pub mod rect;
