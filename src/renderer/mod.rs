//! Renderer - Terminal output for the visual tree.
//!
//! - [`outline`] - Plain text outline, also handy in tests and logs
//! - [`TerminalRenderer`] - Fullscreen output through crossterm

mod outline;
mod terminal;

pub use outline::{outline, outline_from};
pub use terminal::TerminalRenderer;
