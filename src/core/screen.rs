//! Screen Buffer
//!
//! A fixed-size grid of cells plus cursor and pen state. The grid is
//! allocated once; its dimensions never change for the lifetime of the
//! buffer. Scrolling off the top is the only way content is discarded,
//! there is no scrollback.

use super::cell::{Cell, Pen};
use super::cursor::{Cursor, SavedCursor};

/// Tab stops are fixed every 8 columns
pub const TAB_WIDTH: usize = 8;

/// Erase-in-display / erase-in-line region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    /// From the cursor to the end (mode 0)
    ToEnd,
    /// From the start to the cursor, inclusive (mode 1)
    ToBeginning,
    /// The whole region (mode 2)
    All,
}

impl EraseMode {
    /// Map a CSI J/K parameter to a mode; unknown modes are ignored
    pub fn from_param(param: u16) -> Option<Self> {
        match param {
            0 => Some(EraseMode::ToEnd),
            1 => Some(EraseMode::ToBeginning),
            2 => Some(EraseMode::All),
            _ => None,
        }
    }
}

/// The character grid sampled by the renderer
#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    cols: usize,
    rows: usize,
    /// Row-major cells, `rows * cols` long
    cells: Vec<Cell>,
    cursor: Cursor,
    saved_cursor: SavedCursor,
    pen: Pen,
}

impl ScreenBuffer {
    /// Create a blank screen. Zero dimensions are raised to 1.
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols * rows],
            cursor: Cursor::new(),
            saved_cursor: SavedCursor::default(),
            pen: Pen::default(),
        }
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor.visible
    }

    pub fn saved_cursor(&self) -> &SavedCursor {
        &self.saved_cursor
    }

    pub fn pen(&self) -> &Pen {
        &self.pen
    }

    pub fn pen_mut(&mut self) -> &mut Pen {
        &mut self.pen
    }

    pub fn reset_pen(&mut self) {
        self.pen.reset();
    }

    /// Get a cell at the given position
    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Get all cells of a row
    pub fn row_cells(&self, row: usize) -> Option<&[Cell]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.cells[start..start + self.cols])
    }

    /// Text of a row with trailing blanks removed
    pub fn row_text(&self, row: usize) -> String {
        self.row_cells(row)
            .map(|cells| {
                let text: String = cells.iter().map(Cell::as_char).collect();
                text.trim_end().to_string()
            })
            .unwrap_or_default()
    }

    /// All rows joined with newlines
    pub fn text(&self) -> String {
        (0..self.rows)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any single row contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        (0..self.rows).any(|row| self.row_text(row).contains(needle))
    }

    /// Write a byte with the current pen and advance, wrapping at the edge
    pub fn put_char(&mut self, ch: u8) {
        if self.cursor.col >= self.cols {
            self.cursor.col = 0;
            self.newline();
        }

        let idx = self.index(self.cursor.col, self.cursor.row);
        self.cells[idx] = Cell::new(ch, self.pen);
        self.cursor.col += 1;

        if self.cursor.col >= self.cols {
            self.cursor.col = 0;
            self.newline();
        }
    }

    /// Move down a row, scrolling when already on the last row
    pub fn newline(&mut self) {
        if self.cursor.row + 1 >= self.rows {
            self.scroll_up();
            self.cursor.row = self.rows - 1;
        } else {
            self.cursor.row += 1;
        }
    }

    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// Move left one column without erasing
    pub fn backspace(&mut self) {
        self.cursor.move_left(1);
    }

    /// Advance to the next tab stop, wrapping to a new line past the edge
    pub fn tab(&mut self) {
        let next = (self.cursor.col / TAB_WIDTH + 1) * TAB_WIDTH;
        if next >= self.cols {
            self.cursor.col = 0;
            self.newline();
        } else {
            self.cursor.col = next;
        }
    }

    /// Scroll content up one row; the new bottom row is blank in the pen's colors
    pub fn scroll_up(&mut self) {
        let cols = self.cols;
        self.cells.copy_within(cols.., 0);
        let blank = Cell::blank(self.pen);
        let last = (self.rows - 1) * cols;
        self.cells[last..].fill(blank);
    }

    /// Erase in display
    pub fn clear(&mut self, mode: EraseMode) {
        let cursor = self.index(self.cursor.col, self.cursor.row);
        let blank = Cell::blank(self.pen);

        match mode {
            EraseMode::ToEnd => self.cells[cursor..].fill(blank),
            EraseMode::ToBeginning => self.cells[..=cursor].fill(blank),
            EraseMode::All => {
                self.cells.fill(blank);
                self.cursor.home();
            }
        }
    }

    /// Erase in line (cursor row only, cursor does not move)
    pub fn clear_line(&mut self, mode: EraseMode) {
        let start = self.cursor.row * self.cols;
        let cursor = start + self.cursor.col;
        let end = start + self.cols;
        let blank = Cell::blank(self.pen);

        match mode {
            EraseMode::ToEnd => self.cells[cursor..end].fill(blank),
            EraseMode::ToBeginning => self.cells[start..=cursor].fill(blank),
            EraseMode::All => self.cells[start..end].fill(blank),
        }
    }

    /// Move cursor to a 0-based position, clamped to the grid
    pub fn move_cursor_to(&mut self, row: usize, col: usize) {
        self.cursor.move_to(col, row, self.cols, self.rows);
    }

    pub fn move_cursor_up(&mut self, n: usize) {
        self.cursor.move_up(n);
    }

    pub fn move_cursor_down(&mut self, n: usize) {
        self.cursor.move_down(n, self.rows);
    }

    pub fn move_cursor_forward(&mut self, n: usize) {
        self.cursor.move_right(n, self.cols);
    }

    pub fn move_cursor_backward(&mut self, n: usize) {
        self.cursor.move_left(n);
    }

    pub fn save_cursor(&mut self) {
        self.saved_cursor = self.cursor.save();
    }

    pub fn restore_cursor(&mut self) {
        let saved = self.saved_cursor;
        self.cursor.restore(&saved, self.cols, self.rows);
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor.visible = visible;
    }

    /// Soft reset: blank grid, default pen, cursor home and visible
    pub fn reset(&mut self) {
        self.pen.reset();
        self.cells.fill(Cell::default());
        self.cursor.reset();
        self.saved_cursor = SavedCursor::default();
    }

    fn index(&self, col: usize, row: usize) -> usize {
        row.min(self.rows - 1) * self.cols + col.min(self.cols - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attrs, Color};

    fn write_str(screen: &mut ScreenBuffer, s: &str) {
        for b in s.bytes() {
            screen.put_char(b);
        }
    }

    #[test]
    fn test_screen_new() {
        let screen = ScreenBuffer::new(80, 24);
        assert_eq!(screen.cols(), 80);
        assert_eq!(screen.rows(), 24);
        assert_eq!(screen.cursor().col, 0);
        assert_eq!(screen.cursor().row, 0);
        assert!(screen.cursor_visible());
        assert!(screen.cell(79, 23).is_some_and(Cell::is_blank));
        assert!(screen.cell(80, 0).is_none());
    }

    #[test]
    fn test_screen_zero_dimensions() {
        let screen = ScreenBuffer::new(0, 0);
        assert_eq!(screen.cols(), 1);
        assert_eq!(screen.rows(), 1);
    }

    #[test]
    fn test_put_char() {
        let mut screen = ScreenBuffer::new(80, 24);
        write_str(&mut screen, "Hello");
        assert_eq!(screen.row_text(0), "Hello");
        assert_eq!(screen.cursor().col, 5);
    }

    #[test]
    fn test_put_char_wraps_at_edge() {
        let mut screen = ScreenBuffer::new(5, 3);
        write_str(&mut screen, "HelloWorld");
        assert_eq!(screen.row_text(0), "Hello");
        assert_eq!(screen.row_text(1), "World");
        assert_eq!((screen.cursor().col, screen.cursor().row), (0, 2));
    }

    #[test]
    fn test_newline_scrolls_at_bottom() {
        let mut screen = ScreenBuffer::new(10, 3);
        for line in ["1", "2", "3", "4"] {
            write_str(&mut screen, line);
            screen.carriage_return();
            screen.newline();
        }
        assert_eq!(screen.row_text(0), "3");
        assert_eq!(screen.row_text(1), "4");
        assert_eq!(screen.row_text(2), "");
        assert_eq!(screen.cursor().row, 2);
    }

    #[test]
    fn test_scroll_up_fills_with_pen() {
        let mut screen = ScreenBuffer::new(4, 2);
        screen.pen_mut().bg = Color::BLUE;
        screen.scroll_up();
        let cell = screen.cell(0, 1).copied().unwrap_or_default();
        assert!(cell.is_blank());
        assert_eq!(cell.bg, Color::BLUE);
    }

    #[test]
    fn test_backspace_does_not_erase() {
        let mut screen = ScreenBuffer::new(10, 1);
        write_str(&mut screen, "ab");
        screen.backspace();
        assert_eq!(screen.cursor().col, 1);
        assert_eq!(screen.row_text(0), "ab");

        screen.carriage_return();
        screen.backspace();
        assert_eq!(screen.cursor().col, 0);
    }

    #[test]
    fn test_tab_stops() {
        let mut screen = ScreenBuffer::new(20, 3);
        screen.tab();
        assert_eq!(screen.cursor().col, 8);
        screen.put_char(b'x');
        screen.tab();
        assert_eq!(screen.cursor().col, 16);
        screen.tab();
        assert_eq!((screen.cursor().col, screen.cursor().row), (0, 1));
    }

    #[test]
    fn test_erase_in_display_to_end() {
        let mut screen = ScreenBuffer::new(10, 3);
        write_str(&mut screen, &"X".repeat(29));
        screen.move_cursor_to(1, 5);
        screen.clear(EraseMode::ToEnd);

        assert_eq!(screen.row_text(0), "XXXXXXXXXX");
        assert_eq!(screen.row_text(1), "XXXXX");
        assert_eq!(screen.row_text(2), "");
        assert_eq!((screen.cursor().col, screen.cursor().row), (5, 1));
    }

    #[test]
    fn test_erase_in_display_to_beginning() {
        let mut screen = ScreenBuffer::new(10, 3);
        write_str(&mut screen, &"X".repeat(29));
        screen.move_cursor_to(1, 5);
        screen.clear(EraseMode::ToBeginning);

        assert_eq!(screen.row_text(0), "");
        assert_eq!(screen.row_text(1), "      XXXX");
        assert_eq!(screen.row_text(2), "XXXXXXXXX");
    }

    #[test]
    fn test_erase_in_display_all_homes_cursor() {
        let mut screen = ScreenBuffer::new(10, 3);
        write_str(&mut screen, "garbage");
        screen.move_cursor_to(2, 4);
        screen.clear(EraseMode::All);

        assert_eq!(screen.text(), "\n\n");
        assert_eq!((screen.cursor().col, screen.cursor().row), (0, 0));
    }

    #[test]
    fn test_erase_in_line() {
        let mut screen = ScreenBuffer::new(10, 2);
        write_str(&mut screen, "ABCDEFGHIJKLMN");
        screen.move_cursor_to(0, 5);

        let mut to_end = screen.clone();
        to_end.clear_line(EraseMode::ToEnd);
        assert_eq!(to_end.row_text(0), "ABCDE");
        assert_eq!(to_end.row_text(1), "KLMN");

        let mut to_start = screen.clone();
        to_start.clear_line(EraseMode::ToBeginning);
        assert_eq!(to_start.row_text(0), "      GHIJ");

        screen.clear_line(EraseMode::All);
        assert_eq!(screen.row_text(0), "");
        assert_eq!(screen.row_text(1), "KLMN");
        assert_eq!(screen.cursor().col, 5);
    }

    #[test]
    fn test_erase_mode_from_param() {
        assert_eq!(EraseMode::from_param(0), Some(EraseMode::ToEnd));
        assert_eq!(EraseMode::from_param(1), Some(EraseMode::ToBeginning));
        assert_eq!(EraseMode::from_param(2), Some(EraseMode::All));
        assert_eq!(EraseMode::from_param(3), None);
    }

    #[test]
    fn test_save_restore_cursor() {
        let mut screen = ScreenBuffer::new(80, 24);
        screen.move_cursor_to(7, 12);
        screen.save_cursor();
        screen.move_cursor_to(0, 0);
        screen.restore_cursor();
        assert_eq!((screen.cursor().col, screen.cursor().row), (12, 7));
    }

    #[test]
    fn test_pen_applies_to_new_cells() {
        let mut screen = ScreenBuffer::new(10, 1);
        screen.pen_mut().fg = Color::RED;
        screen.pen_mut().attrs.insert(Attrs::UNDERLINE);
        screen.put_char(b'A');
        screen.reset_pen();
        screen.put_char(b'B');

        let a = screen.cell(0, 0).copied().unwrap_or_default();
        let b = screen.cell(1, 0).copied().unwrap_or_default();
        assert_eq!(a.fg, Color::RED);
        assert!(a.underline());
        assert_eq!(b.fg, Color::WHITE);
        assert!(b.attrs.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut screen = ScreenBuffer::new(10, 2);
        screen.pen_mut().fg = Color::GREEN;
        write_str(&mut screen, "hi");
        screen.set_cursor_visible(false);
        screen.save_cursor();
        screen.reset();

        assert_eq!(screen.text(), "\n");
        assert_eq!(*screen.cursor(), Cursor::default());
        assert_eq!(*screen.pen(), Pen::default());
        assert_eq!(*screen.saved_cursor(), SavedCursor::default());
    }

    #[test]
    fn test_contains() {
        let mut screen = ScreenBuffer::new(10, 2);
        write_str(&mut screen, "echo hi");
        assert!(screen.contains("hi"));
        assert!(!screen.contains("bye"));
    }
}
