//! Deterministic demo layouts.
//!
//! # Responsibility
//! - Build a plausible multi-floor facility from a seed, for demos and tests.
//!
//! # Invariants
//! - Same seed and config always produce the same layout, ids included.
//! - Generated layouts satisfy every `GridModel` invariant.

pub mod demo_layout;

pub use demo_layout::{demo_layout, DemoLayoutConfig, StatusWeights};
