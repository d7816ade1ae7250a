use crate::config::Config;
use crate::core::plate_grid::{FocusSubscriber, PersistenceHook};
use crate::core::text_well::TextWell;
use crate::core::viewer::{MountPoint, PlateViewer};
use crate::data::WellPosition;
use crate::network::LayoutMessage;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Core application state (frontend-agnostic)
///
/// AppCore owns the viewer for the plate being shown and turns frontend key
/// presses into grid operations. Frontends read from it to render.
pub struct AppCore {
    /// Application configuration
    pub config: Config,

    /// The one plate viewer of this session
    pub viewer: PlateViewer<TextWell>,

    /// Application running flag
    pub running: bool,

    /// Set when state changed and the frontend should redraw
    pub needs_render: bool,

    /// Message for the footer line
    pub status: Option<String>,

    advance_key: (KeyCode, KeyModifiers),

    /// Focus channel the comment button reads from
    focus_rx: Option<FocusSubscriber>,
}

/// Persistence hook used by the binary. Edits are not stored anywhere yet,
/// they are only logged.
#[derive(Debug, Clone, Copy)]
pub struct LoggingPersistence {
    pub plate_id: u32,
}

impl PersistenceHook for LoggingPersistence {
    fn on_change(&mut self, pos: WellPosition, value: &str) {
        tracing::info!(
            plate_id = self.plate_id,
            row = pos.row,
            col = pos.col,
            value,
            "Well value changed"
        );
    }
}

impl AppCore {
    pub fn new(config: Config, plate_id: u32) -> Self {
        let mount = MountPoint::new(config.ui.mount.clone());
        let viewer =
            PlateViewer::new(plate_id, mount).with_persistence(LoggingPersistence { plate_id });
        let advance_key = config.advance_binding();

        Self {
            config,
            viewer,
            running: true,
            needs_render: true,
            status: None,
            advance_key,
            focus_rx: None,
        }
    }

    /// Apply the result of the layout fetch and put focus on the first well
    pub fn handle_layout_message(&mut self, msg: LayoutMessage) {
        if !self.viewer.is_loading() {
            tracing::warn!("Layout already applied, ignoring {:?}", msg);
            return;
        }
        self.viewer.apply(msg, |_| TextWell::new());

        self.focus_rx = self.viewer.subscribe_focus();
        if let Some(grid) = self.viewer.grid_mut() {
            if let Err(e) = grid.focus(WellPosition::default()) {
                tracing::warn!("Could not focus first well: {}", e);
            }
        }
        self.needs_render = true;
    }

    /// Focus a specific well (mouse click)
    pub fn focus_well(&mut self, pos: WellPosition) {
        if let Some(grid) = self.viewer.grid_mut() {
            if grid.focus(pos).is_ok() {
                self.needs_render = true;
            }
        }
    }

    /// Well the comment button would annotate, as last published by the grid
    pub fn comment_target(&self) -> Option<WellPosition> {
        self.focus_rx.as_ref().and_then(|rx| *rx.borrow())
    }

    fn activate_comment_button(&mut self) {
        let name = self.comment_target().and_then(|pos| {
            self.viewer
                .grid()
                .and_then(|grid| grid.well_name(pos))
        });
        self.status = Some(match name {
            Some(name) => format!("Comment on well {}", name),
            None => "Select a well to comment on".to_string(),
        });
        tracing::debug!("Comment button: {:?}", self.status);
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Esc => {
                self.quit();
                return;
            }
            KeyCode::Char('k') if ctrl => {
                self.activate_comment_button();
                self.needs_render = true;
                return;
            }
            _ => {}
        }

        let advance_key = self.advance_key;
        let Some(grid) = self.viewer.grid_mut() else {
            // Nothing to navigate until the layout arrives
            return;
        };

        if (code, modifiers) == advance_key {
            grid.advance_focus();
        } else if code == KeyCode::BackTab
            || (code == KeyCode::Tab && modifiers.contains(KeyModifiers::SHIFT))
        {
            grid.focus_prev();
        } else if code == KeyCode::Tab {
            grid.focus_next();
        } else {
            grid.input(KeyEvent::new(code, modifiers));
        }
        self.needs_render = true;
    }

    /// Stop the event loop, reporting a pending edit first
    pub fn quit(&mut self) {
        if let Some(grid) = self.viewer.grid_mut() {
            grid.blur();
        }
        self.running = false;
    }
}
