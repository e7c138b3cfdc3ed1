//! Terminal geometry shared across the channel boundary.

use serde::{Deserialize, Serialize};

/// Terminal dimensions of a session.
///
/// Pixel dimensions are 0 when unknown, which is what most transports
/// report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSize {
    /// Width in character cells.
    pub cols: u16,

    /// Height in character cells.
    pub rows: u16,

    /// Width in pixels, 0 if unknown.
    pub pixel_width: u16,

    /// Height in pixels, 0 if unknown.
    pub pixel_height: u16,
}

impl TermSize {
    /// Creates a size with the given cell dimensions and unknown pixel
    /// dimensions.
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            pixel_width: 0,
            pixel_height: 0,
        }
    }
}

impl Default for TermSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}
