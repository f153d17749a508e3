//! Terminal
//!
//! Ties together the parser, the screen buffer and a process session. The
//! host calls [`Terminal::update`] once per tick: it checks whether the child
//! is still alive, performs one non-blocking read and runs every byte through
//! the parser into the screen.

#[cfg(unix)]
use crate::app::TerminalConfig;
use crate::core::{Attrs, Color, EraseMode, ScreenBuffer, Snapshot};
use crate::parser::{Action, ControlCode, CsiAction, EscAction, Parser};
#[cfg(unix)]
use crate::pty::{PtySession, WindowSize};
use crate::pty::{PtyError, PtyResult, ReadOutcome, Session};

/// Bytes consumed from the session per `update`
pub const READ_BUFFER_SIZE: usize = 4096;

/// DEC private mode controlling cursor visibility
const DECTCEM: u16 = 25;

/// Whether a terminal has a live child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// No child process; the screen shows blank or last-known contents
    Inert,
    /// A child is attached and `update` pumps its output
    Active,
}

/// A terminal with a real shell behind it
#[cfg(unix)]
pub type ShellTerminal = Terminal<PtySession>;

/// One screen, one parser and one session, owned together
pub struct Terminal<S: Session> {
    executor: Executor,
    session: S,
    read_buf: [u8; READ_BUFFER_SIZE],
}

#[cfg(unix)]
impl Terminal<PtySession> {
    /// Create an inert terminal that will run the configured shell
    pub fn new(config: &TerminalConfig) -> Self {
        let screen = ScreenBuffer::new(config.cols, config.rows);
        let size = WindowSize::for_grid(screen.cols(), screen.rows());
        let session = PtySession::new(config.shell.clone(), size);
        Self::from_parts(screen, session)
    }
}

impl<S: Session> Terminal<S> {
    /// Create an inert terminal around an existing session
    pub fn with_session(cols: usize, rows: usize, session: S) -> Self {
        Self::from_parts(ScreenBuffer::new(cols, rows), session)
    }

    fn from_parts(screen: ScreenBuffer, session: S) -> Self {
        Self {
            executor: Executor {
                screen,
                parser: Parser::new(),
            },
            session,
            read_buf: [0; READ_BUFFER_SIZE],
        }
    }

    /// Return to a blank, inert terminal, closing any live session first
    pub fn init(&mut self) {
        self.close();
    }

    /// Start the child. Returns false if already active or if starting failed.
    pub fn spawn(&mut self) -> bool {
        match self.try_spawn() {
            Ok(()) => true,
            Err(PtyError::AlreadyActive) => {
                tracing::debug!("spawn ignored: session already active");
                false
            },
            Err(e) => {
                tracing::warn!("failed to spawn shell: {}", e);
                false
            },
        }
    }

    /// Start the child, reporting why it failed
    pub fn try_spawn(&mut self) -> PtyResult<()> {
        self.session.spawn()?;
        self.executor.parser.reset();
        Ok(())
    }

    /// Forward input bytes to the child. No-op while inert.
    pub fn write(&mut self, data: &[u8]) {
        if !self.session.is_active() {
            return;
        }

        match self.session.write(data) {
            Ok(n) if n < data.len() => {
                tracing::trace!(dropped = data.len() - n, "shell input buffer full");
            },
            Ok(_) => {},
            Err(e) => {
                tracing::warn!("shell input failed, closing session: {}", e);
                self.shut_down();
            },
        }
    }

    /// One non-blocking I/O and parse cycle
    pub fn update(&mut self) {
        if !self.session.is_active() {
            return;
        }

        if self.session.poll_exit() {
            self.shut_down();
            return;
        }

        match self.session.read_available(&mut self.read_buf) {
            ReadOutcome::Data(n) => self.executor.feed(&self.read_buf[..n]),
            ReadOutcome::Empty => {},
            ReadOutcome::Closed => {
                tracing::debug!("shell output closed");
                self.shut_down();
            },
        }
    }

    /// Terminate the child and blank the screen. Safe in any state.
    pub fn close(&mut self) {
        self.shut_down();
        self.executor.screen.reset();
    }

    /// Release the session but leave the last screen visible
    fn shut_down(&mut self) {
        self.session.close();
        self.executor.parser.reset();
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn state(&self) -> TerminalState {
        if self.is_active() {
            TerminalState::Active
        } else {
            TerminalState::Inert
        }
    }

    /// Parse bytes straight into the screen, bypassing the session
    pub fn feed(&mut self, data: &[u8]) {
        self.executor.feed(data);
    }

    /// Get a reference to the screen
    pub fn screen(&self) -> &ScreenBuffer {
        &self.executor.screen
    }

    pub fn parser(&self) -> &Parser {
        &self.executor.parser
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Capture the screen for serialization or comparison
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_screen(&self.executor.screen)
    }
}

/// Applies parsed actions to the screen
struct Executor {
    screen: ScreenBuffer,
    parser: Parser,
}

impl Executor {
    fn feed(&mut self, data: &[u8]) {
        for &byte in data {
            if let Some(action) = self.parser.advance(byte) {
                self.apply_action(action);
            }
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Print(ch) => self.screen.put_char(ch),
            Action::Control(code) => self.execute_control(code),
            Action::Csi(csi) => self.execute_csi(&csi),
            Action::Esc(esc) => self.execute_esc(esc),
        }
    }

    fn execute_control(&mut self, code: ControlCode) {
        match code {
            ControlCode::LineFeed => self.screen.newline(),
            ControlCode::CarriageReturn => self.screen.carriage_return(),
            ControlCode::Backspace => self.screen.backspace(),
            ControlCode::Tab => self.screen.tab(),
        }
    }

    fn execute_csi(&mut self, csi: &CsiAction) {
        match (csi.private, csi.final_byte) {
            (true, b'h') => self.set_private_mode(csi, true),
            (true, b'l') => self.set_private_mode(csi, false),
            // ANSI modes are not supported
            (false, b'h' | b'l') => {},

            (_, b'H' | b'f') => {
                // CUP - 1-based row;col
                let row = csi.param_or_default(0, 1) as usize - 1;
                let col = csi.param_or_default(1, 1) as usize - 1;
                self.screen.move_cursor_to(row, col);
            },
            (_, b'A') => {
                let n = csi.param_or_default(0, 1) as usize;
                self.screen.move_cursor_up(n);
            },
            (_, b'B') => {
                let n = csi.param_or_default(0, 1) as usize;
                self.screen.move_cursor_down(n);
            },
            (_, b'C') => {
                let n = csi.param_or_default(0, 1) as usize;
                self.screen.move_cursor_forward(n);
            },
            (_, b'D') => {
                let n = csi.param_or_default(0, 1) as usize;
                self.screen.move_cursor_backward(n);
            },
            (_, b'J') => {
                if let Some(mode) = EraseMode::from_param(csi.param(0, 0)) {
                    self.screen.clear(mode);
                }
            },
            (_, b'K') => {
                if let Some(mode) = EraseMode::from_param(csi.param(0, 0)) {
                    self.screen.clear_line(mode);
                }
            },
            (_, b'm') => self.execute_sgr(csi),
            (_, b's') => self.screen.save_cursor(),
            (_, b'u') => self.screen.restore_cursor(),
            (_, other) => {
                tracing::trace!(final_byte = %char::from(other), "unhandled CSI");
            },
        }
    }

    fn set_private_mode(&mut self, csi: &CsiAction, enable: bool) {
        // Only the leading parameter selects the mode
        match csi.params.get(0) {
            Some(DECTCEM) => self.screen.set_cursor_visible(enable),
            mode => tracing::trace!(?mode, enable, "unhandled private mode"),
        }
    }

    /// SGR - Select Graphic Rendition
    fn execute_sgr(&mut self, csi: &CsiAction) {
        if csi.params.is_empty() {
            self.screen.reset_pen();
            return;
        }

        for param in csi.params.iter() {
            let pen = self.screen.pen_mut();
            match param {
                0 => pen.reset(),
                1 => pen.attrs.insert(Attrs::BOLD),
                4 => pen.attrs.insert(Attrs::UNDERLINE),
                30..=37 => pen.fg = Color::ansi((param - 30) as u8),
                40..=47 => pen.bg = Color::ansi((param - 40) as u8),
                90..=97 => pen.fg = Color::bright((param - 90) as u8),
                100..=107 => pen.bg = Color::bright((param - 100) as u8),
                _ => tracing::trace!(param, "unhandled SGR"),
            }
        }
    }

    fn execute_esc(&mut self, esc: EscAction) {
        match esc {
            EscAction::FullReset => self.screen.reset(),
        }
    }
}
