//! homelens-tui: Terminal UI components
//!
//! Chat bubbles, the message input and the loading indicator, built on
//! ratatui and crossterm.

pub mod input;
pub mod terminal;
pub mod theme;
pub mod widgets;

pub use terminal::TerminalGuard;
pub use theme::Theme;
