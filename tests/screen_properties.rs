//! Property tests for the parser and screen buffer
//!
//! Bytes are fed straight into a terminal with no child process attached.

use cabinet_term::core::Color;
use cabinet_term::pty::ScriptedSession;
use cabinet_term::Terminal;
use proptest::prelude::*;

fn terminal(cols: usize, rows: usize) -> Terminal<ScriptedSession> {
    Terminal::with_session(cols, rows, ScriptedSession::new())
}

fn printable(max: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0x20u8..0x7F, 0..max)
}

/// Columns together with a printable run strictly shorter than them
fn short_run() -> impl Strategy<Value = (usize, Vec<u8>)> {
    (2usize..100).prop_flat_map(|cols| (Just(cols), proptest::collection::vec(0x20u8..0x7F, 0..cols)))
}

proptest! {
    /// Printable text shorter than a row lands on row 0 in order.
    #[test]
    fn printable_run_reads_back((cols, text) in short_run()) {
        let mut term = terminal(cols, 5);
        term.feed(&text);

        let screen = term.screen();
        prop_assert_eq!(screen.cursor().col, text.len());
        prop_assert_eq!(screen.cursor().row, 0);
        let row: Vec<u8> = (0..text.len()).map(|c| screen.cell(c, 0).unwrap().ch).collect();
        prop_assert_eq!(row, text);
    }

    /// A full row of text wraps without an explicit newline.
    #[test]
    fn full_row_wraps(cols in 1usize..120, ch in 0x21u8..0x7F) {
        let mut term = terminal(cols, 4);
        term.feed(&vec![ch; cols]);

        prop_assert_eq!(term.screen().cursor().col, 0);
        prop_assert_eq!(term.screen().cursor().row, 1);
        prop_assert!(term.screen().row_cells(0).unwrap().iter().all(|c| c.ch == ch));
    }

    /// More lines than rows keeps only the newest ones, oldest first.
    #[test]
    fn scrolling_discards_oldest(rows in 2usize..30, extra in 1usize..20) {
        let lines = rows + extra;
        let mut term = terminal(16, rows);
        for i in 0..lines {
            term.feed(format!("line{}\r\n", i).as_bytes());
        }

        let screen = term.screen();
        prop_assert_eq!(screen.cursor().row, rows - 1);
        // The trailing newline leaves a blank bottom row
        let first_visible = lines - (rows - 1);
        for r in 0..rows - 1 {
            prop_assert_eq!(screen.row_text(r), format!("line{}", first_visible + r));
        }
        prop_assert_eq!(screen.row_text(rows - 1), "");
        prop_assert!((0..rows).all(|r| screen.row_text(r) != "line0"));
    }

    /// Erase-all leaves a blank grid with the cursor home.
    #[test]
    fn erase_all_blanks_grid(text in printable(300), cols in 1usize..40, rows in 1usize..12) {
        let mut term = terminal(cols, rows);
        term.feed(&text);
        term.feed(b"\x1b[2J");

        let screen = term.screen();
        prop_assert_eq!((screen.cursor().col, screen.cursor().row), (0, 0));
        for r in 0..rows {
            prop_assert!(screen.row_cells(r).unwrap().iter().all(|c| c.is_blank()));
        }

        term.feed(b"X");
        prop_assert_eq!(term.screen().cell(0, 0).unwrap().ch, b'X');
    }

    /// Save, move anywhere, restore returns to the saved position.
    #[test]
    fn save_restore_round_trip(
        row in 1u16..25,
        col in 1u16..81,
        moves in proptest::collection::vec((0u8..4, 0u16..100), 0..10),
    ) {
        let mut term = terminal(80, 24);
        term.feed(format!("\x1b[{};{}H\x1b[s", row, col).as_bytes());
        let saved = (term.screen().cursor().col, term.screen().cursor().row);

        for (dir, n) in moves {
            let final_byte = ['A', 'B', 'C', 'D'][dir as usize];
            term.feed(format!("\x1b[{}{}", n, final_byte).as_bytes());
        }
        term.feed(b"\x1b[u");

        prop_assert_eq!((term.screen().cursor().col, term.screen().cursor().row), saved);
    }

    /// Foreground color persists for every character until changed.
    #[test]
    fn sgr_color_persists(index in 0u8..8, text in proptest::collection::vec(0x21u8..0x7F, 1..40)) {
        let mut term = terminal(80, 4);
        term.feed(format!("\x1b[{}m", 30 + index).as_bytes());
        term.feed(&text);

        for col in 0..text.len() {
            prop_assert_eq!(term.screen().cell(col, 0).unwrap().fg, Color::ansi(index));
        }
    }

    /// Cursor visibility toggles change nothing else.
    #[test]
    fn cursor_visibility_is_isolated(text in printable(200)) {
        let mut term = terminal(30, 6);
        term.feed(&text);
        let before = term.snapshot();

        term.feed(b"\x1b[?25l");
        let mut hidden = term.snapshot();
        prop_assert!(!hidden.cursor.visible);
        hidden.cursor.visible = true;
        prop_assert_eq!(&hidden, &before);

        term.feed(b"\x1b[?25h");
        prop_assert_eq!(term.snapshot(), before);
    }

    /// Arbitrary bytes never push the cursor off the grid.
    #[test]
    fn arbitrary_bytes_stay_in_bounds(
        data in proptest::collection::vec(any::<u8>(), 0..2000),
        cols in 1usize..100,
        rows in 1usize..40,
    ) {
        let mut term = terminal(cols, rows);
        term.feed(&data);

        let cursor = term.screen().cursor();
        prop_assert!(cursor.col < cols);
        prop_assert!(cursor.row < rows);
    }

    /// How the stream is split across reads does not matter.
    #[test]
    fn chunking_is_invisible(
        data in proptest::collection::vec(
            prop_oneof![
                4 => 0x20u8..0x7F,
                1 => Just(0x1Bu8),
                1 => Just(b'['),
                1 => Just(b';'),
                1 => prop::sample::select(b"\r\n\t\x08?".to_vec()),
            ],
            0..400,
        ),
        split in 1usize..17,
    ) {
        let mut whole = terminal(24, 8);
        whole.feed(&data);

        let mut pieces = terminal(24, 8);
        for chunk in data.chunks(split) {
            pieces.feed(chunk);
        }

        prop_assert_eq!(pieces.snapshot(), whole.snapshot());
    }
}
