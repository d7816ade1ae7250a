//! Frontend abstraction layer
//!
//! This module defines the `Frontend` trait the terminal frontend implements.
//! It provides a unified interface for event polling, rendering, and cleanup.

pub mod events;
pub mod tui;

use crate::core::AppCore;
use anyhow::Result;
pub use events::FrontendEvent;
pub use tui::TuiFrontend;

/// Frontend trait
///
/// Separates rendering concerns from the plate logic in `core`.
pub trait Frontend {
    /// Poll for user input events
    ///
    /// Returns all pending events (keyboard, mouse, resize, etc.) converted to
    /// the frontend-agnostic `FrontendEvent` enum. Empty if nothing happened
    /// within the poll timeout.
    fn poll_events(&mut self) -> Result<Vec<FrontendEvent>>;

    /// Render the current application state
    fn render(&mut self, core: &AppCore) -> Result<()>;

    /// Restore the terminal before the application exits
    fn cleanup(&mut self) -> Result<()>;
}
