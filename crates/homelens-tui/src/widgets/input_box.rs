//! Message input with a send button

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line text input followed by a send button
#[derive(Debug)]
pub struct InputBox {
    chars: Vec<char>,
    /// Cursor position as a char index
    cursor: usize,
    /// First visible char
    offset: usize,
    placeholder: String,
    button_label: String,
    focused: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self {
            chars: Vec::new(),
            cursor: 0,
            offset: 0,
            placeholder: String::new(),
            button_label: "Send".to_string(),
            focused: true,
        }
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_button_label(mut self, label: impl Into<String>) -> Self {
        self.button_label = label.into();
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn content(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
        self.offset = 0;
    }

    /// Return the current text and clear the box
    pub fn take(&mut self) -> String {
        let content = self.content();
        self.clear();
        content
    }

    /// Apply an editing action. Returns true if the content or cursor changed.
    pub fn handle_action(&mut self, action: &Action) -> bool {
        match action {
            Action::Char(c) => {
                self.insert(*c);
                true
            }
            Action::Paste(text) => {
                for c in text.chars() {
                    match c {
                        '\r' => {}
                        '\n' => self.insert(' '),
                        c => self.insert(c),
                    }
                }
                true
            }
            Action::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.chars.remove(self.cursor);
                true
            }
            Action::Delete if self.cursor < self.chars.len() => {
                self.chars.remove(self.cursor);
                true
            }
            Action::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Action::Right if self.cursor < self.chars.len() => {
                self.cursor += 1;
                true
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = self.chars.len();
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            _ => false,
        }
    }

    fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn char_width(c: char) -> usize {
        c.width().unwrap_or(0)
    }

    /// Keep the cursor inside a field `visible` columns wide
    fn scroll_into_view(&mut self, visible: usize) {
        if self.cursor < self.offset {
            self.offset = self.cursor;
        }
        let width_to = |from: usize, to: usize, chars: &[char]| -> usize {
            chars[from..to].iter().map(|c| Self::char_width(*c)).sum()
        };
        while self.offset < self.cursor && width_to(self.offset, self.cursor, &self.chars) >= visible
        {
            self.offset += 1;
        }
    }

    /// Render the input box
    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let button_width = self.button_label.chars().map(Self::char_width).sum::<usize>() as u16 + 4;
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(button_width)])
            .split(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.accent_style()
            } else {
                theme.border_style()
            });
        let inner = block.inner(chunks[0]);
        block.render(chunks[0], buf);

        let visible = inner.width as usize;
        self.scroll_into_view(visible);

        if self.chars.is_empty() {
            Paragraph::new(self.placeholder.as_str())
                .style(theme.dim_style())
                .render(inner, buf);
        } else {
            let mut shown = String::new();
            let mut used = 0;
            for c in &self.chars[self.offset..] {
                let w = Self::char_width(*c);
                if used + w > visible {
                    break;
                }
                shown.push(*c);
                used += w;
            }
            Paragraph::new(shown)
                .style(theme.base_style())
                .render(inner, buf);
        }

        if self.focused && inner.width > 0 {
            let cursor_x: usize = self.chars[self.offset..self.cursor]
                .iter()
                .map(|c| Self::char_width(*c))
                .sum();
            if cursor_x < visible {
                if let Some(cell) = buf.cell_mut((inner.x + cursor_x as u16, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }

        let button = Paragraph::new(self.button_label.as_str())
            .style(theme.user_bubble_style().add_modifier(Modifier::BOLD))
            .centered()
            .block(Block::default().borders(Borders::ALL).border_style(theme.accent_style()));
        button.render(chunks[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_action(&Action::Char(c));
        }
        input
    }

    #[test]
    fn test_typing_and_take() {
        let mut input = typed("전세 매물");
        assert_eq!(input.content(), "전세 매물");
        assert_eq!(input.take(), "전세 매물");
        assert!(input.is_empty());
    }

    #[test]
    fn test_backspace_multibyte() {
        let mut input = typed("집값");
        input.handle_action(&Action::Backspace);
        assert_eq!(input.content(), "집");
    }

    #[test]
    fn test_insert_in_middle() {
        let mut input = typed("ac");
        input.handle_action(&Action::Left);
        input.handle_action(&Action::Char('b'));
        assert_eq!(input.content(), "abc");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("line1\r\nline2".into()));
        assert_eq!(input.content(), "line1 line2");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut input = InputBox::new();
        assert!(!input.handle_action(&Action::Backspace));
    }

    #[test]
    fn test_scroll_keeps_cursor_visible() {
        let mut input = typed("0123456789");
        input.scroll_into_view(4);
        assert!(input.offset > 0);
        input.handle_action(&Action::Home);
        input.scroll_into_view(4);
        assert_eq!(input.offset, 0);
    }
}
