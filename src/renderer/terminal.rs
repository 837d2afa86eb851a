//! Terminal renderer - Writes the tree outline to a terminal.
//!
//! Every frame clears the screen and prints the outline from the top-left
//! corner inside a synchronized update. Frames identical to the previous one
//! are skipped.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::Print;
use crossterm::terminal::{
    BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::outline;
use crate::engine::VisualTree;

pub struct TerminalRenderer<W: Write> {
    out: W,
    previous: Option<String>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, previous: None }
    }

    /// Render a frame. Returns false when it matched the previous one.
    pub fn render(&mut self, tree: &VisualTree) -> io::Result<bool> {
        let frame = outline(tree);
        if self.previous.as_deref() == Some(frame.as_str()) {
            return Ok(false);
        }

        queue!(self.out, BeginSynchronizedUpdate, Clear(ClearType::All), MoveTo(0, 0))?;
        for (row, line) in frame.lines().enumerate() {
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            queue!(self.out, MoveTo(0, row), Print(line))?;
        }
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;

        self.previous = Some(frame);
        Ok(true)
    }

    /// Next render redraws even if nothing changed.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn enter_fullscreen(&mut self) -> io::Result<()> {
        execute!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        self.invalidate();
        Ok(())
    }

    pub fn exit_fullscreen(&mut self) -> io::Result<()> {
        execute!(self.out, Show, LeaveAlternateScreen)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_frame_is_skipped() {
        let mut tree = VisualTree::new();
        tree.create_root("section", "trip-events");
        let mut renderer = TerminalRenderer::new(Vec::new());

        assert!(renderer.render(&tree).expect("first frame"));
        assert!(!renderer.render(&tree).expect("same frame"));
        renderer.invalidate();
        assert!(renderer.render(&tree).expect("after invalidate"));

        let bytes = renderer.into_inner();
        let written = String::from_utf8_lossy(&bytes);
        assert!(written.contains("section.trip-events"), "outline must reach the writer");
    }
}
