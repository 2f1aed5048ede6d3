//! Command mode status line, drawn over the bottom row of the real terminal.

use std::io::{self, Write};
use std::sync::Arc;

use crossterm::{
    cursor::{MoveTo, RestorePosition, SavePosition},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use tracing::debug;

use crate::input::EntryError;
use crate::models::{EntryMode, HeightSnapshot, HeightSource, WindowSize};
use crate::pty::TerminalSize;

/// Everything the status line shows
#[derive(Debug, Clone, Copy)]
pub struct StatusView<'a> {
    pub snapshot: HeightSnapshot,
    pub real: WindowSize,
    pub entry: EntryMode,
    pub text: &'a str,
    pub error: Option<&'a EntryError>,
}

impl StatusView<'_> {
    pub fn render(&self) -> String {
        let rows = self.snapshot.effective_height(self.real.rows);
        let source = match self.snapshot.source() {
            HeightSource::Real => "real".to_string(),
            HeightSource::Delta(delta) => format!("delta {:+}", delta),
            HeightSource::Fixed(_) => "fixed".to_string(),
        };
        let head = format!(" tallpty | rows {} ({})", rows, source);

        let mut line = if self.entry.is_active() {
            format!("{} | {}: {}_  Enter set  Esc cancel", head, self.entry.prompt(), self.text)
        } else {
            format!(
                "{} | space real  n height  d delta  r reset  \u{2191}\u{2193} step  Esc exit",
                head
            )
        };
        if let Some(error) = self.error {
            line.push_str(&format!(" | {}", error));
        }
        line
    }
}

/// Cut `line` to at most `cols` characters
fn fit(line: &str, cols: u16) -> &str {
    match line.char_indices().nth(usize::from(cols)) {
        Some((end, _)) => &line[..end],
        None => line,
    }
}

/// Draw `line` in reverse video on the bottom row, leaving the cursor where it was.
pub fn draw_line<W: Write>(out: &mut W, line: &str, real: WindowSize) -> io::Result<()> {
    queue!(
        out,
        SavePosition,
        MoveTo(0, real.rows.saturating_sub(1)),
        Clear(ClearType::CurrentLine),
        SetAttribute(Attribute::Reverse),
        Print(fit(line, real.cols)),
        SetAttribute(Attribute::Reset),
        RestorePosition
    )?;
    out.flush()
}

/// Blank the bottom row, leaving the cursor where it was.
pub fn clear_line<W: Write>(out: &mut W, real: WindowSize) -> io::Result<()> {
    queue!(
        out,
        SavePosition,
        MoveTo(0, real.rows.saturating_sub(1)),
        Clear(ClearType::CurrentLine),
        RestorePosition
    )?;
    out.flush()
}

/// Status line writer for the controlling terminal's stdout
pub struct StatusLine {
    terminal: Arc<dyn TerminalSize>,
}

impl StatusLine {
    pub fn new(terminal: Arc<dyn TerminalSize>) -> Self {
        Self { terminal }
    }

    pub fn show(
        &self,
        snapshot: HeightSnapshot,
        entry: EntryMode,
        text: &str,
        error: Option<&EntryError>,
    ) {
        let real = self.terminal.size();
        let view = StatusView {
            snapshot,
            real,
            entry,
            text,
            error,
        };
        let mut out = io::stdout().lock();
        if let Err(e) = draw_line(&mut out, &view.render(), real) {
            debug!(error = %e, "failed to draw status line");
        }
    }

    pub fn clear(&self) {
        let mut out = io::stdout().lock();
        if let Err(e) = clear_line(&mut out, self.terminal.size()) {
            debug!(error = %e, "failed to clear status line");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view<'a>(snapshot: HeightSnapshot, entry: EntryMode, text: &'a str) -> StatusView<'a> {
        StatusView {
            snapshot,
            real: WindowSize::new(24, 80),
            entry,
            text,
            error: None,
        }
    }

    const FIXED: HeightSnapshot = HeightSnapshot {
        absolute: 1000,
        delta: 0,
        use_real_size: false,
    };

    #[test]
    fn test_render_fixed_height() {
        let line = view(FIXED, EntryMode::None, "").render();
        assert!(line.starts_with(" tallpty | rows 1000 (fixed) | space real"));
    }

    #[test]
    fn test_render_delta_and_real() {
        let delta = HeightSnapshot { delta: -4, ..FIXED };
        assert!(view(delta, EntryMode::None, "").render().contains("rows 20 (delta -4)"));
        let real = HeightSnapshot {
            use_real_size: true,
            ..delta
        };
        assert!(view(real, EntryMode::None, "").render().contains("rows 24 (real)"));
    }

    #[test]
    fn test_render_entry_and_error() {
        let error = EntryError::MissingSign;
        let status = StatusView {
            error: Some(&error),
            ..view(FIXED, EntryMode::EnteringDelta, "5")
        };
        let line = status.render();
        assert!(line.contains("delta (+/-): 5_"));
        assert!(line.ends_with("| delta needs a leading + or -"));
    }

    #[test]
    fn test_fit_truncates_on_char_boundary() {
        assert_eq!(fit("abc", 10), "abc");
        assert_eq!(fit("abcdef", 3), "abc");
        assert_eq!(fit("\u{2191}\u{2193}x", 2), "\u{2191}\u{2193}");
        assert_eq!(fit("abc", 0), "");
    }

    #[test]
    fn test_draw_line_targets_bottom_row() {
        let mut out = Vec::new();
        draw_line(&mut out, "hello", WindowSize::new(24, 80)).unwrap();
        let written = String::from_utf8(out).unwrap();
        // MoveTo is 1-based on the wire
        assert!(written.contains("\x1b[24;1H"));
        assert!(written.contains("hello"));
    }

    #[test]
    fn test_draw_line_truncates_to_width() {
        let mut out = Vec::new();
        draw_line(&mut out, "0123456789", WindowSize::new(5, 4)).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("0123"));
        assert!(!written.contains("01234"));
    }

    #[test]
    fn test_clear_line_writes_no_text() {
        let mut out = Vec::new();
        clear_line(&mut out, WindowSize::new(10, 80)).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[10;1H"));
        assert!(written.contains("\x1b[2K"));
    }
}
