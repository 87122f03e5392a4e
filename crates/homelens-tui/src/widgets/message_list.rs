//! Message list widget: chat bubbles, user on the right, bot on the left

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Who a bubble belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

/// A single bubble in the chat
#[derive(Debug, Clone)]
pub struct ChatBubble {
    pub speaker: Speaker,
    pub text: String,
    /// Rendered with the error color
    pub is_error: bool,
}

impl ChatBubble {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            is_error: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
            is_error: true,
        }
    }
}

/// Widest a bubble may get, as a share of the list width
const MAX_BUBBLE_PERCENT: usize = 80;

fn bubble_style(bubble: &ChatBubble, theme: &Theme) -> Style {
    match bubble.speaker {
        Speaker::User => theme.user_bubble_style(),
        Speaker::Bot if bubble.is_error => theme.error_style().bg(theme.bot_bubble),
        Speaker::Bot => theme.bot_bubble_style(),
    }
}

/// Wrap a bubble's text for a list of the given width
fn wrap_bubble(text: &str, width: usize) -> Vec<String> {
    let max_bubble = (width * MAX_BUBBLE_PERCENT / 100).max(4);
    let text_width = max_bubble.saturating_sub(2).max(1);
    let wrapped: Vec<String> = text
        .lines()
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, text_width)
                    .into_iter()
                    .map(|l| l.into_owned())
                    .collect()
            }
        })
        .collect();
    if wrapped.is_empty() {
        vec![String::new()]
    } else {
        wrapped
    }
}

fn bubble_lines(bubble: &ChatBubble, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let wrapped = wrap_bubble(&bubble.text, width);
    let text_width = wrapped.iter().map(|l| l.width()).max().unwrap_or(0);
    let bubble_width = text_width + 2;
    let style = bubble_style(bubble, theme);

    let mut lines: Vec<Line<'static>> = wrapped
        .into_iter()
        .map(|text| {
            let fill = text_width - text.width();
            let body = Span::styled(format!(" {}{} ", text, " ".repeat(fill)), style);
            match bubble.speaker {
                Speaker::User => {
                    let pad = width.saturating_sub(bubble_width);
                    Line::from(vec![Span::raw(" ".repeat(pad)), body])
                }
                Speaker::Bot => Line::from(body),
            }
        })
        .collect();

    lines.push(Line::from(""));
    lines
}

/// Widget for displaying the conversation
pub struct MessageList<'a> {
    bubbles: &'a [ChatBubble],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(bubbles: &'a [ChatBubble], theme: &'a Theme) -> Self {
        Self {
            bubbles,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset in lines
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let visible: Vec<Line> = self
            .bubbles
            .iter()
            .flat_map(|b| bubble_lines(b, self.theme, width))
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Total rendered height of the conversation, in lines
pub fn content_height(bubbles: &[ChatBubble], width: usize) -> usize {
    bubbles
        .iter()
        .map(|b| wrap_bubble(&b.text, width).len() + 1)
        .sum()
}

/// Scroll offset that shows the last line at the bottom of the viewport
pub fn bottom_scroll(bubbles: &[ChatBubble], width: usize, height: usize) -> usize {
    content_height(bubbles, width).saturating_sub(height)
}
