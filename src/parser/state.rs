//! Parser State Machine
//!
//! A byte-at-a-time state machine for the subset of ANSI/VT100 output a
//! shell produces. It handles arbitrary chunk boundaries: a sequence split
//! across reads resumes where it left off.
//!
//! States:
//! - Normal: printable text and C0 controls
//! - Escape: after ESC, waiting for `[` or `c`
//! - CsiAccumulating: after `ESC [`, collecting the body until a letter

use super::action::{Action, ControlCode, CsiAction, EscAction};

/// Bytes of CSI body kept before further bytes are dropped
pub const CSI_BUFFER_CAPACITY: usize = 64;

const ESC: u8 = 0x1B;

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    Normal,
    Escape,
    CsiAccumulating,
}

/// The terminal parser
#[derive(Debug, Clone)]
pub struct Parser {
    state: ParserState,
    /// CSI body collected so far (without the final byte)
    csi_buffer: [u8; CSI_BUFFER_CAPACITY],
    csi_len: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the normal state
    pub fn new() -> Self {
        Self {
            state: ParserState::Normal,
            csi_buffer: [0; CSI_BUFFER_CAPACITY],
            csi_len: 0,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Drop any partial sequence and return to the normal state
    pub fn reset(&mut self) {
        self.state = ParserState::Normal;
        self.csi_len = 0;
    }

    /// Process a chunk of bytes, returning actions
    pub fn parse(&mut self, data: &[u8]) -> Vec<Action> {
        data.iter().filter_map(|&byte| self.advance(byte)).collect()
    }

    /// Process a single byte
    pub fn advance(&mut self, byte: u8) -> Option<Action> {
        match self.state {
            ParserState::Normal => self.process_normal(byte),
            ParserState::Escape => self.process_escape(byte),
            ParserState::CsiAccumulating => self.process_csi(byte),
        }
    }

    fn process_normal(&mut self, byte: u8) -> Option<Action> {
        match byte {
            ESC => {
                self.state = ParserState::Escape;
                None
            }
            0x20..=0x7E => Some(Action::Print(byte)),
            _ => ControlCode::from_byte(byte).map(Action::Control),
        }
    }

    fn process_escape(&mut self, byte: u8) -> Option<Action> {
        self.state = ParserState::Normal;
        match byte {
            b'[' => {
                self.state = ParserState::CsiAccumulating;
                self.csi_len = 0;
                None
            }
            b'c' => Some(Action::Esc(EscAction::FullReset)),
            _ => {
                tracing::trace!("ignoring ESC {:#04x}", byte);
                None
            }
        }
    }

    fn process_csi(&mut self, byte: u8) -> Option<Action> {
        if byte.is_ascii_alphabetic() {
            self.state = ParserState::Normal;
            let action = CsiAction::from_body(&self.csi_buffer[..self.csi_len], byte);
            self.csi_len = 0;
            return Some(Action::Csi(action));
        }

        if self.csi_len < CSI_BUFFER_CAPACITY {
            self.csi_buffer[self.csi_len] = byte;
            self.csi_len += 1;
        }
        None
    }
}
