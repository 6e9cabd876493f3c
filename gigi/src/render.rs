//! Drawing backend contract.
//!
//! The core never draws by itself. During the render pass each visible
//! window's `Wnd::render` receives a `Renderer` and its current absolute
//! rectangle and issues draw calls within it. Clipping is not pre-applied.

use crate::primitives::{Clr, Pt, Rect};

/// Sink for draw calls issued by windows.
pub trait Renderer {
    fn fill_rect(&mut self, rect: Rect, color: Clr);

    fn stroke_rect(&mut self, rect: Rect, color: Clr);

    fn text(&mut self, origin: Pt, text: &str, color: Clr);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    Fill(Rect, Clr),
    Stroke(Rect, Clr),
    Text(Pt, String, Clr),
}

impl DrawCommand {
    /// The rectangle or origin this command draws at.
    pub fn anchor(&self) -> Pt {
        match self {
            DrawCommand::Fill(rect, _) | DrawCommand::Stroke(rect, _) => rect.ul,
            DrawCommand::Text(origin, _, _) => *origin,
        }
    }
}

/// Renderer that records every call, for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// All text strings drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text(_, text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn fill_rect(&mut self, rect: Rect, color: Clr) {
        self.commands.push(DrawCommand::Fill(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Clr) {
        self.commands.push(DrawCommand::Stroke(rect, color));
    }

    fn text(&mut self, origin: Pt, text: &str, color: Clr) {
        self.commands
            .push(DrawCommand::Text(origin, text.to_string(), color));
    }
}
