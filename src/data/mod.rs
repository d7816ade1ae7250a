//! Data layer - Pure state without UI coupling
//!
//! Plate layouts as they come off the wire and the positions used to address
//! wells. NO imports from frontend/ or any rendering code.

pub mod plate;

pub use plate::*;
