//! Plate grid controller
//!
//! Owns the addressable collection of well inputs for one plate, the row and
//! column headers, and the keyboard focus. Rendering is left to the frontend:
//! the grid only talks to wells through [`WellInput`].

use crate::data::{PlateLayout, WellPosition};
use crate::labels::RowLabels;
use thiserror::Error;
use tokio::sync::watch;

/// Input surface of a single well.
///
/// Focus transfer is a capability of the well itself, so the grid never
/// needs to know how a well is drawn.
pub trait WellInput {
    /// Edit input understood by this well (a key press for the TUI).
    type Key;

    fn focus(&mut self);
    fn blur(&mut self);
    fn is_focused(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;

    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);

    /// Apply an edit. Returns true if the value changed.
    fn input(&mut self, key: Self::Key) -> bool;
}

/// Receives edited well values. What happens to them is up to the implementor.
pub trait PersistenceHook {
    fn on_change(&mut self, pos: WellPosition, value: &str);
}

/// Hook that drops every change
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPersistence;

impl PersistenceHook for NoopPersistence {
    fn on_change(&mut self, _pos: WellPosition, _value: &str) {}
}

impl<F> PersistenceHook for F
where
    F: FnMut(WellPosition, &str),
{
    fn on_change(&mut self, pos: WellPosition, value: &str) {
        (self)(pos, value)
    }
}

/// Largest plate the grid will allocate wells for
pub const MAX_WELLS: usize = 1 << 22;

/// Read side of the focus channel, for widgets that annotate the focused well.
pub type FocusSubscriber = watch::Receiver<Option<WellPosition>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("plate must have at least one row and one column, got {rows}x{cols}")]
    InvalidShape { rows: usize, cols: usize },

    #[error("plate of {rows}x{cols} wells exceeds the limit of {max} wells")]
    TooLarge { rows: usize, cols: usize, max: usize },

    #[error("well {pos} is outside the {rows}x{cols} plate")]
    OutOfBounds {
        pos: WellPosition,
        rows: usize,
        cols: usize,
    },
}

/// Next well when moving down a column: bottom of a column continues at the
/// top of the next column, and the last column wraps back to the first.
pub fn advance(pos: WellPosition, rows: usize, cols: usize) -> WellPosition {
    let mut row = pos.row + 1;
    let mut col = pos.col;
    if row == rows {
        row = 0;
        col += 1;
        if col == cols {
            col = 0;
        }
    }
    WellPosition { row, col }
}

/// Next well in reading order (across a row, then down), wrapping at the end.
pub fn tab_next(pos: WellPosition, rows: usize, cols: usize) -> WellPosition {
    let index = (pos.row * cols + pos.col + 1) % (rows * cols);
    WellPosition::new(index / cols, index % cols)
}

/// Previous well in reading order, wrapping at the start.
pub fn tab_prev(pos: WellPosition, rows: usize, cols: usize) -> WellPosition {
    let total = rows * cols;
    let index = (pos.row * cols + pos.col + total - 1) % total;
    WellPosition::new(index / cols, index % cols)
}

pub struct PlateGrid<W: WellInput> {
    rows: usize,
    cols: usize,
    editable: bool,
    name: Option<String>,
    /// Row-major arena, `rows * cols` entries
    wells: Vec<W>,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    focused: Option<WellPosition>,
    /// Value of the focused well when it gained focus
    value_on_focus: String,
    focus_tx: watch::Sender<Option<WellPosition>>,
    persistence: Box<dyn PersistenceHook>,
}

impl<W: WellInput> PlateGrid<W> {
    /// Build the grid for `layout`, creating one input per well with `make_well`.
    pub fn build(
        layout: &PlateLayout,
        mut make_well: impl FnMut(WellPosition) -> W,
    ) -> Result<Self, GridError> {
        let (rows, cols) = (layout.rows, layout.cols);
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidShape { rows, cols });
        }
        let too_large = GridError::TooLarge {
            rows,
            cols,
            max: MAX_WELLS,
        };
        let total = match rows.checked_mul(cols) {
            Some(total) if total <= MAX_WELLS => total,
            _ => return Err(too_large),
        };

        if let Some(well) = layout
            .wells
            .iter()
            .find(|w| w.row >= rows || w.col >= cols)
        {
            return Err(GridError::OutOfBounds {
                pos: WellPosition::new(well.row, well.col),
                rows,
                cols,
            });
        }

        let mut wells = Vec::new();
        wells.try_reserve_exact(total).map_err(|_| too_large)?;
        for row in 0..rows {
            for col in 0..cols {
                let mut well = make_well(WellPosition::new(row, col));
                well.set_enabled(layout.editable);
                wells.push(well);
            }
        }
        for initial in &layout.wells {
            wells[initial.row * cols + initial.col].set_value(&initial.value);
        }

        let row_labels: Vec<String> = RowLabels::new().take(rows).collect();
        let col_labels: Vec<String> = (1..=cols).map(|c| c.to_string()).collect();

        let (focus_tx, _) = watch::channel(None);

        tracing::info!(rows, cols, editable = layout.editable, "Built plate grid");

        Ok(Self {
            rows,
            cols,
            editable: layout.editable,
            name: layout.name.clone(),
            wells,
            row_labels,
            col_labels,
            focused: None,
            value_on_focus: String::new(),
            focus_tx,
            persistence: Box::new(NoopPersistence),
        })
    }

    /// Install the hook that receives edited values
    pub fn with_persistence(mut self, hook: impl PersistenceHook + 'static) -> Self {
        self.persistence = Box::new(hook);
        self
    }

    /// Subscribe to focus changes. The value is updated synchronously on every
    /// focus event; only the latest position is kept.
    pub fn subscribe_focus(&self) -> FocusSubscriber {
        self.focus_tx.subscribe()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn editable(&self) -> bool {
        self.editable
    }

    /// Display name of the plate, if the layout carried one
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.row_labels.get(row).map(String::as_str)
    }

    pub fn col_label(&self, col: usize) -> Option<&str> {
        self.col_labels.get(col).map(String::as_str)
    }

    /// Human readable well name, row label then column number (`B3`)
    pub fn well_name(&self, pos: WellPosition) -> Option<String> {
        Some(format!("{}{}", self.row_label(pos.row)?, self.col_label(pos.col)?))
    }

    fn index(&self, pos: WellPosition) -> Option<usize> {
        (pos.row < self.rows && pos.col < self.cols).then(|| pos.row * self.cols + pos.col)
    }

    pub fn well(&self, pos: WellPosition) -> Option<&W> {
        self.index(pos).map(|i| &self.wells[i])
    }

    pub fn well_mut(&mut self, pos: WellPosition) -> Option<&mut W> {
        self.index(pos).map(|i| &mut self.wells[i])
    }

    /// All wells in row-major order with their positions
    pub fn iter(&self) -> impl Iterator<Item = (WellPosition, &W)> + '_ {
        let cols = self.cols;
        self.wells
            .iter()
            .enumerate()
            .map(move |(i, w)| (WellPosition::new(i / cols, i % cols), w))
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn focused(&self) -> Option<WellPosition> {
        self.focused
    }

    pub fn focused_well(&self) -> Option<&W> {
        self.focused.and_then(|pos| self.well(pos))
    }

    /// Move input focus to `pos`, whether or not that well is enabled.
    pub fn focus(&mut self, pos: WellPosition) -> Result<(), GridError> {
        let index = self.index(pos).ok_or(GridError::OutOfBounds {
            pos,
            rows: self.rows,
            cols: self.cols,
        })?;

        if self.focused == Some(pos) {
            return Ok(());
        }
        self.release_focus();

        let well = &mut self.wells[index];
        well.focus();
        self.value_on_focus = well.value();
        self.focused = Some(pos);
        self.focus_tx.send_replace(Some(pos));
        tracing::debug!(row = pos.row, col = pos.col, "Well focused");
        Ok(())
    }

    /// Drop focus from the current well, reporting its value if it changed
    pub fn blur(&mut self) {
        self.release_focus();
        self.focus_tx.send_replace(None);
    }

    fn release_focus(&mut self) {
        let Some(pos) = self.focused.take() else {
            return;
        };
        let Some(index) = self.index(pos) else {
            return;
        };
        let well = &mut self.wells[index];
        well.blur();
        let value = well.value();
        if value != self.value_on_focus {
            self.persistence.on_change(pos, &value);
        }
    }

    /// Handle the "next field" key: move focus one well down with wraparound.
    /// Does nothing when no well has focus.
    pub fn advance_focus(&mut self) -> Option<WellPosition> {
        let next = advance(self.focused?, self.rows, self.cols);
        self.focus(next).ok()?;
        Some(next)
    }

    /// Focus the next well in reading order, or the first one if none is focused
    pub fn focus_next(&mut self) -> Option<WellPosition> {
        let next = match self.focused {
            Some(pos) => tab_next(pos, self.rows, self.cols),
            None => WellPosition::default(),
        };
        self.focus(next).ok()?;
        Some(next)
    }

    /// Focus the previous well in reading order, or the last one if none is focused
    pub fn focus_prev(&mut self) -> Option<WellPosition> {
        let prev = match self.focused {
            Some(pos) => tab_prev(pos, self.rows, self.cols),
            None => WellPosition::new(self.rows - 1, self.cols - 1),
        };
        self.focus(prev).ok()?;
        Some(prev)
    }

    /// Forward an edit to the focused well. Disabled wells ignore edits.
    pub fn input(&mut self, key: W::Key) -> bool {
        let Some(index) = self.focused.and_then(|pos| self.index(pos)) else {
            return false;
        };
        let well = &mut self.wells[index];
        if !well.is_enabled() {
            return false;
        }
        well.input(key)
    }
}
