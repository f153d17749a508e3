//! Terminal Cell
//!
//! Represents a single cell in the terminal grid, containing a character
//! and the pen state it was written with.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A 16-color palette index (0-7 normal, 8-15 bright)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(u8);

impl Color {
    /// Standard ANSI colors (0-7)
    pub const BLACK: Color = Color(0);
    pub const RED: Color = Color(1);
    pub const GREEN: Color = Color(2);
    pub const YELLOW: Color = Color(3);
    pub const BLUE: Color = Color(4);
    pub const MAGENTA: Color = Color(5);
    pub const CYAN: Color = Color(6);
    pub const WHITE: Color = Color(7);

    /// Bright ANSI colors (8-15)
    pub const BRIGHT_BLACK: Color = Color(8);
    pub const BRIGHT_RED: Color = Color(9);
    pub const BRIGHT_GREEN: Color = Color(10);
    pub const BRIGHT_YELLOW: Color = Color(11);
    pub const BRIGHT_BLUE: Color = Color(12);
    pub const BRIGHT_MAGENTA: Color = Color(13);
    pub const BRIGHT_CYAN: Color = Color(14);
    pub const BRIGHT_WHITE: Color = Color(15);

    /// Create a color from a palette index, masked into 0-15
    pub const fn new(index: u8) -> Self {
        Color(index & 0x0F)
    }

    /// Normal color `n` (0-7), as selected by SGR 30-37 / 40-47
    pub const fn ansi(n: u8) -> Self {
        Color(n & 0x07)
    }

    /// Bright color `n` (0-7), as selected by SGR 90-97 / 100-107
    pub const fn bright(n: u8) -> Self {
        Color((n & 0x07) + 8)
    }

    /// The palette index
    pub const fn index(self) -> u8 {
        self.0
    }

    pub const fn is_bright(self) -> bool {
        self.0 >= 8
    }
}

bitflags! {
    /// Text attributes applied to a cell
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Attrs: u8 {
        const BOLD = 0b0000_0001;
        const UNDERLINE = 0b0000_0010;
    }
}

/// The pen: colors and attributes applied to newly written cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attrs,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            fg: Color::WHITE,
            bg: Color::BLACK,
            attrs: Attrs::empty(),
        }
    }
}

impl Pen {
    /// SGR 0
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The byte shown in this cell (printable ASCII)
    pub ch: u8,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text attributes
    pub attrs: Attrs,
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Pen::default())
    }
}

impl Cell {
    /// Create a cell holding `ch`, styled with `pen`
    pub fn new(ch: u8, pen: Pen) -> Self {
        Self {
            ch,
            fg: pen.fg,
            bg: pen.bg,
            attrs: pen.attrs,
        }
    }

    /// A space carrying the pen's colors (used by erase and scroll)
    pub fn blank(pen: Pen) -> Self {
        Self::new(b' ', pen)
    }

    /// Check if this cell shows nothing but its background
    pub fn is_blank(&self) -> bool {
        self.ch == b' '
    }

    /// The cell's character as a `char`
    pub fn as_char(&self) -> char {
        char::from(self.ch)
    }

    pub fn bold(&self) -> bool {
        self.attrs.contains(Attrs::BOLD)
    }

    pub fn underline(&self) -> bool {
        self.attrs.contains(Attrs::UNDERLINE)
    }
}
