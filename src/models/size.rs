//! Window size in character cells

use portable_pty::PtySize;

/// Rows and columns of a terminal or PTY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
}

impl WindowSize {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Same width, different height
    pub fn with_rows(self, rows: u16) -> Self {
        Self { rows, ..self }
    }
}

/// Fallback when the controlling terminal cannot be queried
impl Default for WindowSize {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

impl From<WindowSize> for PtySize {
    fn from(size: WindowSize) -> Self {
        PtySize {
            rows: size.rows,
            cols: size.cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }
}
