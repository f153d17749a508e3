//! Cabinet Terminal Library
//!
//! Virtual terminals for displays embedded in a game world. Each terminal
//! runs a real shell on a pseudoterminal, interprets the ANSI subset the
//! shell emits, and exposes a fixed character grid for the renderer to
//! sample every frame. Nothing here blocks: the host calls `update` once per
//! tick and the terminal consumes whatever output is ready.
//!
//! - `core`: Screen buffer, cells, cursor, snapshots
//! - `parser`: Escape sequence state machine
//! - `pty`: Process sessions (real PTY and scripted)
//! - `terminal`: Screen, parser and session composed into one unit
//! - `pool`: Fixed set of independent terminals
//! - `input`: Key events to shell bytes
//! - `app`: Configuration

pub mod app;
pub mod core;
pub mod input;
pub mod parser;
pub mod pool;
pub mod pty;
pub mod terminal;

pub use pool::SessionPool;
pub use terminal::{Terminal, TerminalState};
#[cfg(unix)]
pub use terminal::ShellTerminal;
