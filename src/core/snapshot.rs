//! Deterministic snapshot generation
//!
//! Snapshots capture the complete screen state in a serializable format
//! for testing and debugging. Given the same byte stream, the screen
//! must produce identical snapshots.

use serde::{Deserialize, Serialize};

use super::cell::{Attrs, Cell, Pen};
use super::screen::ScreenBuffer;

/// A complete snapshot of the screen state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub cols: usize,
    pub rows: usize,
    /// Row text with trailing blanks trimmed
    pub lines: Vec<String>,
    /// Cells whose styling differs from the default pen
    pub styled: Vec<StyledCell>,
    /// Cursor state
    pub cursor: CursorSnapshot,
    /// Pen in effect when the snapshot was taken
    pub pen: Pen,
}

/// A non-default cell, addressed by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledCell {
    pub col: usize,
    pub row: usize,
    pub ch: char,
    pub fg: u8,
    pub bg: u8,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

/// Snapshot of cursor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub col: usize,
    pub row: usize,
    pub visible: bool,
}

impl Snapshot {
    /// Capture the state of a screen
    pub fn from_screen(screen: &ScreenBuffer) -> Self {
        let default_pen = Pen::default();
        let mut styled = Vec::new();

        for row in 0..screen.rows() {
            let Some(cells) = screen.row_cells(row) else {
                continue;
            };
            for (col, cell) in cells.iter().enumerate() {
                if !has_default_style(cell, &default_pen) {
                    styled.push(StyledCell {
                        col,
                        row,
                        ch: cell.as_char(),
                        fg: cell.fg.index(),
                        bg: cell.bg.index(),
                        attrs: cell.attrs,
                    });
                }
            }
        }

        let cursor = screen.cursor();
        Self {
            cols: screen.cols(),
            rows: screen.rows(),
            lines: (0..screen.rows()).map(|row| screen.row_text(row)).collect(),
            styled,
            cursor: CursorSnapshot {
                col: cursor.col,
                row: cursor.row,
                visible: cursor.visible,
            },
            pen: *screen.pen(),
        }
    }

    /// Render the snapshot as plain text, one line per row
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn has_default_style(cell: &Cell, pen: &Pen) -> bool {
    cell.fg == pen.fg && cell.bg == pen.bg && cell.attrs == pen.attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;

    #[test]
    fn test_snapshot_plain_text() {
        let mut screen = ScreenBuffer::new(10, 3);
        for b in b"Hi" {
            screen.put_char(*b);
        }

        let snapshot = Snapshot::from_screen(&screen);
        assert_eq!(snapshot.lines, vec!["Hi", "", ""]);
        assert!(snapshot.styled.is_empty());
        assert_eq!(snapshot.cursor.col, 2);
        assert_eq!(snapshot.to_text(), "Hi\n\n");
    }

    #[test]
    fn test_snapshot_records_styled_cells() {
        let mut screen = ScreenBuffer::new(10, 1);
        screen.pen_mut().fg = Color::RED;
        screen.pen_mut().attrs = Attrs::BOLD;
        screen.put_char(b'R');

        let snapshot = Snapshot::from_screen(&screen);
        assert_eq!(snapshot.styled.len(), 1);
        let cell = snapshot.styled[0];
        assert_eq!((cell.col, cell.row, cell.ch), (0, 0, 'R'));
        assert_eq!(cell.fg, 1);
        assert_eq!(cell.attrs, Attrs::BOLD);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut screen = ScreenBuffer::new(4, 2);
        screen.pen_mut().bg = Color::BLUE;
        screen.put_char(b'x');
        screen.set_cursor_visible(false);

        let snapshot = Snapshot::from_screen(&screen);
        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();
        assert_eq!(snapshot, restored);
    }

    #[test]
    fn test_snapshot_deterministic() {
        let build = || {
            let mut screen = ScreenBuffer::new(8, 2);
            for b in b"abc\tdef" {
                match b {
                    b'\t' => screen.tab(),
                    _ => screen.put_char(*b),
                }
            }
            Snapshot::from_screen(&screen)
        };
        assert_eq!(build(), build());
    }
}
