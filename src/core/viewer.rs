//! Plate viewer - one plate shown in one mount point
//!
//! A viewer starts out loading, and moves exactly once to either a ready grid
//! or a failure. Neither of those is ever left again.

use super::plate_grid::{
    FocusSubscriber, NoopPersistence, PersistenceHook, PlateGrid, WellInput,
};
use crate::data::WellPosition;
use crate::network::LayoutMessage;

/// Named render target the viewer draws into and owns completely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    pub name: String,
}

impl MountPoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub enum ViewerState<W: WellInput> {
    /// Layout requested, nothing to interact with yet
    Loading,
    Ready(PlateGrid<W>),
    /// Failure detail to show in place of the plate
    Failed(String),
}

pub struct PlateViewer<W: WellInput> {
    plate_id: u32,
    mount: MountPoint,
    state: ViewerState<W>,
    persistence: Option<Box<dyn PersistenceHook>>,
}

impl<W: WellInput> PlateViewer<W> {
    pub fn new(plate_id: u32, mount: MountPoint) -> Self {
        Self {
            plate_id,
            mount,
            state: ViewerState::Loading,
            persistence: None,
        }
    }

    /// Hook handed to the grid once it is built
    pub fn with_persistence(mut self, hook: impl PersistenceHook + 'static) -> Self {
        self.persistence = Some(Box::new(hook));
        self
    }

    pub fn plate_id(&self) -> u32 {
        self.plate_id
    }

    pub fn mount(&self) -> &MountPoint {
        &self.mount
    }

    pub fn state(&self) -> &ViewerState<W> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewerState::Loading)
    }

    pub fn grid(&self) -> Option<&PlateGrid<W>> {
        match &self.state {
            ViewerState::Ready(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn grid_mut(&mut self) -> Option<&mut PlateGrid<W>> {
        match &mut self.state {
            ViewerState::Ready(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            ViewerState::Failed(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn subscribe_focus(&self) -> Option<FocusSubscriber> {
        self.grid().map(PlateGrid::subscribe_focus)
    }

    pub fn focused(&self) -> Option<WellPosition> {
        self.grid().and_then(PlateGrid::focused)
    }

    /// Apply the outcome of the layout fetch. Only the first outcome counts.
    pub fn apply(&mut self, message: LayoutMessage, make_well: impl FnMut(WellPosition) -> W) {
        if !self.is_loading() {
            tracing::warn!(
                "Ignoring layout message for plate {}, viewer already settled",
                self.plate_id
            );
            return;
        }

        self.state = match message {
            LayoutMessage::Loaded(layout) => match PlateGrid::build(&layout, make_well) {
                Ok(grid) => {
                    let hook = self
                        .persistence
                        .take()
                        .unwrap_or_else(|| Box::new(NoopPersistence));
                    ViewerState::Ready(grid.with_persistence(BoxedHook(hook)))
                }
                Err(e) => {
                    tracing::error!("Rejected layout for plate {}: {}", self.plate_id, e);
                    ViewerState::Failed(e.to_string())
                }
            },
            LayoutMessage::Failed(detail) => ViewerState::Failed(detail),
        };
    }
}

struct BoxedHook(Box<dyn PersistenceHook>);

impl PersistenceHook for BoxedHook {
    fn on_change(&mut self, pos: WellPosition, value: &str) {
        self.0.on_change(pos, value)
    }
}
