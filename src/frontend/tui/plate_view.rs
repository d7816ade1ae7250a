//! Plate view - renders the viewer into its mount area
//!
//! Layout inside the bordered mount block:
//! ```text
//!      1    2    3
//!   A  ...  ...  ...
//!   B  ...  ...  ...
//!   <footer>
//! ```
//! Only the part of the plate that fits is drawn; the viewport follows the
//! focused well.

use crate::core::plate_grid::{PlateGrid, WellInput};
use crate::core::text_well::TextWell;
use crate::core::viewer::ViewerState;
use crate::core::AppCore;
use crate::data::WellPosition;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, StatefulWidget, Widget, Wrap},
};

/// Widest well input drawn, whatever `ui.cell_width` says
const MAX_CELL_WIDTH: u16 = 256;

/// Scroll position of the grid plus the geometry of the last frame, used to
/// map mouse clicks back to wells.
#[derive(Debug, Default, Clone)]
pub struct GridViewport {
    pub row_offset: usize,
    pub col_offset: usize,
    geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Copy)]
struct Geometry {
    /// Top-left corner of the first visible well
    x: u16,
    y: u16,
    /// Horizontal distance between wells (input width plus a gap)
    col_stride: u16,
    visible_rows: usize,
    visible_cols: usize,
    row_offset: usize,
    col_offset: usize,
}

impl GridViewport {
    /// Scroll just enough to bring `pos` into view
    fn follow(&mut self, pos: WellPosition, visible_rows: usize, visible_cols: usize) {
        if pos.row < self.row_offset {
            self.row_offset = pos.row;
        } else if visible_rows > 0 && pos.row >= self.row_offset + visible_rows {
            self.row_offset = pos.row + 1 - visible_rows;
        }
        if pos.col < self.col_offset {
            self.col_offset = pos.col;
        } else if visible_cols > 0 && pos.col >= self.col_offset + visible_cols {
            self.col_offset = pos.col + 1 - visible_cols;
        }
    }

    /// Well drawn at terminal cell `(x, y)` in the last frame, if any
    pub fn hit_test(&self, x: u16, y: u16) -> Option<WellPosition> {
        let g = self.geometry?;
        if x < g.x || y < g.y {
            return None;
        }
        let row = (y - g.y) as usize;
        let col = ((x - g.x) / g.col_stride) as usize;
        let within_input = (x - g.x) % g.col_stride < g.col_stride - 1;
        if row >= g.visible_rows || col >= g.visible_cols || !within_input {
            return None;
        }
        Some(WellPosition::new(g.row_offset + row, g.col_offset + col))
    }
}

pub struct PlateView<'a> {
    core: &'a AppCore,
}

impl<'a> PlateView<'a> {
    pub fn new(core: &'a AppCore) -> Self {
        Self { core }
    }

    fn render_grid(
        grid: &PlateGrid<TextWell>,
        cell_width: u16,
        area: Rect,
        buf: &mut Buffer,
        state: &mut GridViewport,
    ) {
        state.geometry = None;
        if area.height < 2 || area.width == 0 {
            return;
        }

        // Labels only grow, so the last one is the widest
        let label_width = grid
            .row_label(grid.rows() - 1)
            .map(|l| l.len() as u16)
            .unwrap_or(1)
            + 1;
        let cell_width = cell_width.clamp(1, MAX_CELL_WIDTH);
        let col_stride = cell_width + 1;

        let visible_rows = ((area.height - 1) as usize).min(grid.rows());
        let visible_cols =
            ((area.width.saturating_sub(label_width) / col_stride) as usize).min(grid.cols());
        if visible_rows == 0 || visible_cols == 0 {
            return;
        }

        if let Some(pos) = grid.focused() {
            state.follow(pos, visible_rows, visible_cols);
        }
        // Keep the viewport inside the plate
        state.row_offset = state.row_offset.min(grid.rows() - visible_rows);
        state.col_offset = state.col_offset.min(grid.cols() - visible_cols);

        let header_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let x0 = area.x + label_width;
        let y0 = area.y + 1;

        for c in 0..visible_cols {
            let col = state.col_offset + c;
            let label = grid.col_label(col).unwrap_or_default();
            let text = format!("{:^width$}", label, width = cell_width as usize);
            buf.set_stringn(
                x0 + c as u16 * col_stride,
                area.y,
                text,
                cell_width as usize,
                header_style,
            );
        }

        for r in 0..visible_rows {
            let row = state.row_offset + r;
            let y = y0 + r as u16;
            let label = grid.row_label(row).unwrap_or_default();
            buf.set_stringn(area.x, y, label, label_width as usize, header_style);

            for c in 0..visible_cols {
                let pos = WellPosition::new(row, state.col_offset + c);
                let Some(well) = grid.well(pos) else {
                    continue;
                };
                let rect = Rect::new(x0 + c as u16 * col_stride, y, cell_width, 1);
                let bg = if well.is_focused() {
                    Color::Blue
                } else {
                    Color::Black
                };
                buf.set_style(rect, Style::default().bg(bg));
                well.textarea().render(rect, buf);
            }
        }

        state.geometry = Some(Geometry {
            x: x0,
            y: y0,
            col_stride,
            visible_rows,
            visible_cols,
            row_offset: state.row_offset,
            col_offset: state.col_offset,
        });
    }

    fn footer(&self) -> Line<'static> {
        let mut spans = Vec::new();

        if let Some(grid) = self.core.viewer.grid() {
            if let Some(pos) = grid.focused() {
                let name = grid.well_name(pos).unwrap_or_default();
                spans.push(Span::styled(
                    format!("{} {} ", name, pos),
                    Style::default().fg(Color::Green),
                ));
            }
            if !grid.editable() {
                spans.push(Span::styled(
                    "[read-only] ",
                    Style::default().fg(Color::Yellow),
                ));
            }
        }

        if let Some(status) = &self.core.status {
            spans.push(Span::raw(format!("{} ", status)));
        }

        spans.push(Span::styled(
            format!(
                "| {}: next well  Tab: next in row  Ctrl+K: comment  Esc: quit",
                self.core.config.ui.advance_key
            ),
            Style::default().fg(Color::DarkGray),
        ));
        Line::from(spans)
    }
}

impl StatefulWidget for PlateView<'_> {
    type State = GridViewport;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut GridViewport) {
        let viewer = &self.core.viewer;
        let title = match viewer.grid().and_then(|grid| grid.name()) {
            Some(name) => format!(
                " {} - plate {} ({}) ",
                viewer.mount().name,
                viewer.plate_id(),
                name
            ),
            None => format!(" {} - plate {} ", viewer.mount().name, viewer.plate_id()),
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        match viewer.state() {
            ViewerState::Loading => {
                state.geometry = None;
                Paragraph::new(format!("Loading plate {}...", viewer.plate_id()))
                    .style(Style::default().fg(Color::DarkGray))
                    .render(inner, buf);
            }
            ViewerState::Failed(detail) => {
                state.geometry = None;
                // Shown exactly as received
                Paragraph::new(detail.as_str())
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: false })
                    .render(inner, buf);
            }
            ViewerState::Ready(grid) => {
                let grid_area = Rect {
                    height: inner.height.saturating_sub(1),
                    ..inner
                };
                Self::render_grid(grid, self.core.config.ui.cell_width, grid_area, buf, state);

                if inner.height > 0 {
                    let footer_area = Rect::new(
                        inner.x,
                        inner.y + inner.height - 1,
                        inner.width,
                        1,
                    );
                    Paragraph::new(self.footer()).render(footer_area, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::PlateLayout;
    use crate::network::LayoutMessage;

    fn core_with(layout: PlateLayout) -> AppCore {
        let mut config = Config::default();
        config.ui.cell_width = 4;
        let mut core = AppCore::new(config, 1);
        core.handle_layout_message(LayoutMessage::Loaded(layout));
        core
    }

    fn line(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.x + buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect()
    }

    fn render(core: &AppCore, width: u16, height: u16, state: &mut GridViewport) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        PlateView::new(core).render(area, &mut buf, state);
        buf
    }

    #[test]
    fn test_headers_are_drawn() {
        let core = core_with(PlateLayout::new(8, 12, true));
        let mut state = GridViewport::default();
        let buf = render(&core, 80, 12, &mut state);

        assert!(line(&buf, 0).contains("plate-viewer - plate 1"));
        let header = line(&buf, 1);
        assert!(header.contains(" 1 "));
        assert!(header.contains(" 12 "));
        assert!(line(&buf, 2).starts_with("│A"));
        assert!(line(&buf, 9).starts_with("│H"));
    }

    #[test]
    fn test_viewport_follows_focus() {
        let mut core = core_with(PlateLayout::new(30, 2, true));
        let mut state = GridViewport::default();
        // 10 rows tall: border, header, footer leave 6 well rows
        render(&core, 40, 10, &mut state);
        assert_eq!(state.row_offset, 0);

        core.focus_well(WellPosition::new(29, 1));
        let buf = render(&core, 40, 10, &mut state);
        assert_eq!(state.row_offset, 24);
        assert!(line(&buf, 7).starts_with("│AD"));
    }

    #[test]
    fn test_hit_test_maps_clicks_to_wells() {
        let core = core_with(PlateLayout::new(8, 12, true));
        let mut state = GridViewport::default();
        render(&core, 80, 12, &mut state);

        // Border 1 + label width 2, stride 5
        assert_eq!(state.hit_test(3, 2), Some(WellPosition::new(0, 0)));
        assert_eq!(state.hit_test(3 + 5 * 2 + 1, 3), Some(WellPosition::new(1, 2)));
        // Gap between two wells
        assert_eq!(state.hit_test(3 + 4, 2), None);
        // Row label column
        assert_eq!(state.hit_test(1, 2), None);
    }

    #[test]
    fn test_title_shows_plate_name() {
        let mut layout = PlateLayout::new(8, 12, true);
        layout.name = Some("AG110".to_string());
        let core = core_with(layout);
        let mut state = GridViewport::default();
        let buf = render(&core, 80, 12, &mut state);
        assert!(line(&buf, 0).contains("plate-viewer - plate 1 (AG110)"));
    }

    #[test]
    fn test_huge_cell_width_is_clamped() {
        let config = Config::from_toml_str("[ui]\ncell_width = 65535\n").unwrap();
        let mut core = AppCore::new(config, 1);
        core.handle_layout_message(LayoutMessage::Loaded(PlateLayout::new(8, 12, true)));
        let mut state = GridViewport::default();

        // Too narrow for even one well: no grid, no hit targets
        let buf = render(&core, 80, 12, &mut state);
        assert!(line(&buf, 0).contains("plate-viewer - plate 1"));
        assert_eq!(state.hit_test(3, 2), None);

        // Wide enough for one clamped well
        let buf = render(&core, 300, 12, &mut state);
        assert!(line(&buf, 2).starts_with("│A"));
        assert_eq!(state.hit_test(3, 2), Some(WellPosition::new(0, 0)));
        assert_eq!(state.hit_test(3 + MAX_CELL_WIDTH, 2), None);
    }

    #[test]
    fn test_failure_detail_is_shown() {
        let mut core = AppCore::new(Config::default(), 5);
        core.handle_layout_message(LayoutMessage::Failed("Plate 5 does not exist".to_string()));
        let mut state = GridViewport::default();
        let buf = render(&core, 60, 6, &mut state);

        assert!(line(&buf, 1).contains("Plate 5 does not exist"));
        assert_eq!(state.hit_test(3, 2), None);
    }

    #[test]
    fn test_loading_message() {
        let core = AppCore::new(Config::default(), 3);
        let mut state = GridViewport::default();
        let buf = render(&core, 60, 6, &mut state);
        assert!(line(&buf, 1).contains("Loading plate 3..."));
    }
}
