//! Terminal Actions
//!
//! Semantic operations produced by the parser that should be applied to the screen.

use serde::{Deserialize, Serialize};

/// Maximum number of numeric CSI parameters kept per sequence
pub const MAX_PARAMS: usize = 16;

/// A terminal action produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Print a printable ASCII byte at the cursor
    Print(u8),

    /// Execute a C0 control character
    Control(ControlCode),

    /// Execute a CSI (Control Sequence Introducer) command
    Csi(CsiAction),

    /// Execute an ESC sequence (non-CSI)
    Esc(EscAction),
}

/// C0 control codes that affect the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCode {
    /// LF - Line Feed
    LineFeed,
    /// CR - Carriage Return
    CarriageReturn,
    /// BS - Backspace
    Backspace,
    /// HT - Horizontal Tab
    Tab,
}

impl ControlCode {
    /// Map a raw byte to a control code
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'\n' => Some(ControlCode::LineFeed),
            b'\r' => Some(ControlCode::CarriageReturn),
            0x08 => Some(ControlCode::Backspace),
            b'\t' => Some(ControlCode::Tab),
            _ => None,
        }
    }
}

/// ESC sequences other than CSI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscAction {
    /// RIS - ESC c
    FullReset,
}

/// Numeric CSI parameters, in source order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    values: [u16; MAX_PARAMS],
    len: usize,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse runs of decimal digits; any other byte separates runs.
    /// Values saturate at `u16::MAX`, runs past the 16th are dropped.
    pub fn parse(bytes: &[u8]) -> Self {
        let mut params = Self::new();
        let mut current: Option<u16> = None;

        for &byte in bytes {
            if byte.is_ascii_digit() {
                let digit = u16::from(byte - b'0');
                current = Some(
                    current
                        .unwrap_or(0)
                        .saturating_mul(10)
                        .saturating_add(digit),
                );
            } else if let Some(value) = current.take() {
                params.push(value);
            }
        }
        if let Some(value) = current {
            params.push(value);
        }

        params
    }

    /// Append a value; ignored once the list is full
    pub fn push(&mut self, value: u16) {
        if self.len < MAX_PARAMS {
            self.values[self.len] = value;
            self.len += 1;
        }
    }

    pub fn get(&self, index: usize) -> Option<u16> {
        self.as_slice().get(index).copied()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.values[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl From<&[u16]> for Params {
    fn from(values: &[u16]) -> Self {
        let mut params = Self::new();
        for &value in values {
            params.push(value);
        }
        params
    }
}

/// CSI (Control Sequence Introducer) actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiAction {
    /// Parameters parsed from the sequence body
    pub params: Params,
    /// Whether the body started with the `?` private marker
    pub private: bool,
    /// The final byte (A-Z, a-z) that identifies the command
    pub final_byte: u8,
}

impl CsiAction {
    pub fn new(final_byte: u8) -> Self {
        Self {
            params: Params::new(),
            private: false,
            final_byte,
        }
    }

    /// Build from the accumulated body (everything between `ESC [` and the final byte)
    pub fn from_body(body: &[u8], final_byte: u8) -> Self {
        let (private, digits) = match body.split_first() {
            Some((b'?', rest)) => (true, rest),
            _ => (false, body),
        };
        Self {
            params: Params::parse(digits),
            private,
            final_byte,
        }
    }

    /// Get parameter at index, or default value if not present
    pub fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get(index).unwrap_or(default)
    }

    /// Get parameter at index, treating 0 as default
    pub fn param_or_default(&self, index: usize, default: u16) -> u16 {
        match self.params.get(index) {
            Some(0) | None => default,
            Some(v) => v,
        }
    }
}
