use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Palette cycled through by [`Segment::palette`].
pub const PALETTE: [u32; 4] = [0xF5ABBAFF, 0x5ACFFAFF, 0xF5ABBAFF, 0xFFFFFFFF];

static PALETTE_INDEX: AtomicUsize = AtomicUsize::new(0);

/// A coloured byte range inside a [`RichText`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    /// 32-bit RGBA.
    pub color: u32,
}

impl Segment {
    /// Colour the whole of `text` with a 24-bit RGB colour (alpha forced opaque).
    pub fn colored(text: &str, rgb: u32) -> Self {
        Self {
            start: 0,
            end: text.len(),
            color: (rgb & 0x00FF_FFFF) << 8 | 0xFF,
        }
    }

    /// Colour the whole of `text` with the next palette entry.
    pub fn palette(text: &str) -> Self {
        let i = PALETTE_INDEX.fetch_add(1, Ordering::Relaxed).wrapping_add(1) % PALETTE.len();
        Self {
            start: 0,
            end: text.len(),
            color: PALETTE[i],
        }
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

/// Display text with optional colour segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<Segment>,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            segments: Vec::new(),
        }
    }

    /// Text coloured entirely with one 24-bit RGB colour.
    pub fn colored(content: impl Into<String>, rgb: u32) -> Self {
        let content = content.into();
        let segment = Segment::colored(&content, rgb);
        Self {
            content,
            segments: vec![segment],
        }
    }

    /// Text coloured with the next entry of the rotating palette.
    pub fn palette(content: impl Into<String>) -> Self {
        let content = content.into();
        let segment = Segment::palette(&content);
        Self {
            content,
            segments: vec![segment],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl From<&str> for RichText {
    fn from(s: &str) -> Self {
        Self::plain(s)
    }
}
