//! Core use-case services.
//!
//! # Responsibility
//! - Compose model, viewport and placement into console-level entry points.
//! - Keep the FFI layer decoupled from engine internals.

pub mod facility_service;

pub use facility_service::{ConsoleError, ConsoleResult, FacilityConsole, NewUnitRequest};
