//! Input Encoding
//!
//! Translates the host's key events into the bytes a shell expects on its
//! terminal. Printable text arrives separately as text-input events and is
//! forwarded unchanged.

/// Keys that produce control bytes or escape sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    Up,
    Down,
    Right,
    Left,
}

impl Key {
    /// All keys with an encoding
    pub const ALL: [Key; 7] = [
        Key::Enter,
        Key::Backspace,
        Key::Tab,
        Key::Up,
        Key::Down,
        Key::Right,
        Key::Left,
    ];
}

/// Encode a key press
pub fn encode_key(key: Key) -> &'static [u8] {
    match key {
        Key::Enter => b"\n",
        Key::Backspace => b"\x08",
        Key::Tab => b"\t",
        // Cursor keys (normal mode)
        Key::Up => b"\x1b[A",
        Key::Down => b"\x1b[B",
        Key::Right => b"\x1b[C",
        Key::Left => b"\x1b[D",
    }
}

/// Encode text input as UTF-8
pub fn encode_text(text: &str) -> &[u8] {
    text.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_keys() {
        assert_eq!(encode_key(Key::Enter), b"\n");
        assert_eq!(encode_key(Key::Backspace), b"\x08");
        assert_eq!(encode_key(Key::Tab), b"\t");
    }

    #[test]
    fn test_cursor_keys() {
        assert_eq!(encode_key(Key::Up), b"\x1b[A");
        assert_eq!(encode_key(Key::Down), b"\x1b[B");
        assert_eq!(encode_key(Key::Right), b"\x1b[C");
        assert_eq!(encode_key(Key::Left), b"\x1b[D");
    }

    #[test]
    fn test_every_key_encodes() {
        for key in Key::ALL {
            assert!(!encode_key(key).is_empty(), "{:?} has no encoding", key);
        }
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("ls -la"), b"ls -la");
        assert_eq!(encode_text("é"), &[0xC3, 0xA9]);
        assert!(encode_text("").is_empty());
    }
}
