//! Color theme support

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the chat screen
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary text color
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (title, focused input, send button)
    pub accent: Color,
    /// Error color
    pub error: Color,
    /// Border color
    pub border: Color,
    /// User bubble background
    pub user_bubble: Color,
    /// User bubble text
    pub user_text: Color,
    /// Bot bubble background
    pub bot_bubble: Color,
    /// Bot bubble text
    pub bot_text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    /// Light theme (default), blue user bubbles on grey bot bubbles
    pub fn light() -> Self {
        Self {
            fg: Color::Rgb(51, 51, 51),
            dim: Color::Gray,
            accent: Color::Rgb(41, 121, 255),
            error: Color::Red,
            border: Color::Gray,
            user_bubble: Color::Rgb(41, 121, 255),
            user_text: Color::White,
            bot_bubble: Color::Rgb(240, 240, 240),
            bot_text: Color::Rgb(51, 51, 51),
        }
    }

    /// Dark theme for dark terminals
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            error: Color::Red,
            border: Color::DarkGray,
            user_bubble: Color::Blue,
            user_text: Color::White,
            bot_bubble: Color::DarkGray,
            bot_text: Color::White,
        }
    }

    /// Look a theme up by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "light" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn user_bubble_style(&self) -> Style {
        Style::default().fg(self.user_text).bg(self.user_bubble)
    }

    pub fn bot_bubble_style(&self) -> Style {
        Style::default().fg(self.bot_text).bg(self.bot_bubble)
    }
}
