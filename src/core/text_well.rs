//! Single-line text input backing one well in the terminal frontend

use super::plate_grid::WellInput;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use tui_textarea::{CursorMove, TextArea};

pub struct TextWell {
    textarea: TextArea<'static>,
    enabled: bool,
    focused: bool,
}

impl TextWell {
    pub fn new() -> Self {
        let mut well = Self {
            textarea: TextArea::default(),
            enabled: true,
            focused: false,
        };
        well.restyle();
        well
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    fn restyle(&mut self) {
        // No underlined cursor line in a one-line field
        self.textarea.set_cursor_line_style(Style::default());

        let cursor = if self.focused && self.enabled {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.textarea.set_cursor_style(cursor);

        let text = if self.enabled {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        self.textarea.set_style(text);
    }
}

impl Default for TextWell {
    fn default() -> Self {
        Self::new()
    }
}

impl WellInput for TextWell {
    type Key = KeyEvent;

    fn focus(&mut self) {
        self.focused = true;
        self.restyle();
    }

    fn blur(&mut self) {
        self.focused = false;
        self.restyle();
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.restyle();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn value(&self) -> String {
        self.textarea.lines().concat()
    }

    fn set_value(&mut self, value: &str) {
        self.textarea = TextArea::new(vec![value.to_string()]);
        self.textarea.move_cursor(CursorMove::End);
        self.restyle();
    }

    fn input(&mut self, key: KeyEvent) -> bool {
        // Keep the field on one line
        let newline = matches!(key.code, KeyCode::Enter)
            || (key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('m') | KeyCode::Char('j')));
        if newline {
            return false;
        }
        self.textarea.input(key)
    }
}
