//! Terminal Core Module
//!
//! Platform-independent screen state. This module contains:
//! - Cell representation with colors and attributes
//! - Cursor state and positioning
//! - The fixed-size screen buffer and its mutation primitives
//! - Deterministic snapshot generation
//!
//! The core is completely deterministic: given the same sequence of
//! mutations, it will always produce the same state.

mod cell;
mod cursor;
mod screen;
mod snapshot;

pub use cell::{Attrs, Cell, Color, Pen};
pub use cursor::{Cursor, SavedCursor};
pub use screen::{EraseMode, ScreenBuffer, TAB_WIDTH};
pub use snapshot::{CursorSnapshot, Snapshot, StyledCell};
