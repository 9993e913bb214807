//! Screen descriptions handed to the presentation layer

use serde::Serialize;

use crate::types::FormattedRow;

/// Colour hint for a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    /// Fresh data from this session
    Live,
    /// Waiting for data, or showing nothing yet
    Waiting,
    /// Something failed
    Alert,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Screen {
    /// Tracked drivers' latest laps, with optional event info lines below
    Home { rows: Vec<FormattedRow>, info: Vec<String>, tone: Tone },
    /// Single-column chooser; `window` is the first visible item
    Picker { title: String, items: Vec<String>, cursor: usize, window: usize },
    /// Paged standings; an empty list is drawn as "No data"
    List { title: String, rows: Vec<FormattedRow>, window: usize },
    /// Plain status lines
    Message { lines: Vec<String>, tone: Tone },
}

impl Screen {
    pub fn message<I, S>(lines: I, tone: Tone) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Screen::Message { lines: lines.into_iter().map(Into::into).collect(), tone }
    }
}

/// Presentation sink. Rendering is synchronous and assumed expensive.
pub trait Display: Send {
    fn render(&mut self, screen: &Screen);
}
