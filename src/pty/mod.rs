//! Process sessions
//!
//! A session owns a child shell attached to a pseudoterminal and moves
//! bytes to and from it without ever blocking. The terminal is generic
//! over the [`Session`] trait so the parser and screen can be driven by an
//! in-memory [`ScriptedSession`] in tests and headless runs.

mod scripted;
#[cfg(unix)]
mod unix;

pub use scripted::ScriptedSession;
#[cfg(unix)]
pub use unix::PtySession;

/// Error type for PTY operations
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("Session is already active")]
    AlreadyActive,

    #[error("Failed to open PTY master: {0}")]
    OpenMaster(#[source] nix::Error),

    #[error("Failed to grant PTY access: {0}")]
    GrantPty(#[source] nix::Error),

    #[error("Failed to unlock PTY: {0}")]
    UnlockPty(#[source] nix::Error),

    #[error("Failed to get PTY slave name: {0}")]
    PtsName(#[source] nix::Error),

    #[error("Failed to set window size: {0}")]
    SetWinsize(#[source] nix::Error),

    #[error("Failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("Failed to set non-blocking mode: {0}")]
    SetNonBlocking(#[source] nix::Error),

    #[error("Path or argument contains a NUL byte: {0:?}")]
    InvalidShellPath(String),

    #[error("Failed to write to PTY: {0}")]
    Write(#[source] nix::Error),

    #[error("Session refused to start: {0}")]
    Refused(String),
}

/// Result type for PTY operations
pub type PtyResult<T> = Result<T, PtyError>;

/// Outcome of a single non-blocking read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were placed at the front of the buffer
    Data(usize),
    /// Nothing available right now
    Empty,
    /// End of stream or a read error; the peer is gone
    Closed,
}

/// Operations a terminal needs from its child process
pub trait Session {
    /// Start the child. Fails with [`PtyError::AlreadyActive`] if running.
    fn spawn(&mut self) -> PtyResult<()>;

    /// Forward bytes to the child. Returns how many were accepted; a full
    /// buffer accepts fewer. Any other error closes the session.
    fn write(&mut self, data: &[u8]) -> PtyResult<usize>;

    /// One non-blocking read attempt
    fn read_available(&mut self, buf: &mut [u8]) -> ReadOutcome;

    /// Non-blocking check whether the child has exited
    fn poll_exit(&mut self) -> bool;

    /// Release the child and its descriptor. Idempotent.
    fn close(&mut self);

    fn is_active(&self) -> bool;
}

/// Window size for PTY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
    pub pixel_width: u16,
    pub pixel_height: u16,
}

impl WindowSize {
    /// Create a new window size with just rows and columns
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    /// Size a PTY to match a grid, saturating at `u16::MAX`
    pub fn for_grid(cols: usize, rows: usize) -> Self {
        let clamp = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
        Self::new(clamp(cols), clamp(rows))
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}
