//! Flutter bridge for the floor-plan console.

pub mod api;
