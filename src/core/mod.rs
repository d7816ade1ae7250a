//! Core logic layer
//!
//! This module contains the plate grid controller, the viewer state machine
//! and the application state that ties them to the frontend.
//! NO imports from frontend/ or rendering code.

pub mod app_core;
pub mod plate_grid;
pub mod text_well;
pub mod viewer;

pub use app_core::AppCore;
pub use plate_grid::{PlateGrid, WellInput};
pub use viewer::{MountPoint, PlateViewer};
