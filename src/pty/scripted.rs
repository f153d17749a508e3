//! In-memory session
//!
//! Plays back queued output chunks and records everything written to it.
//! Used to drive a terminal without a child process: in tests, and by the
//! headless runner to replay captured byte streams.

use std::collections::VecDeque;

use super::{PtyError, PtyResult, ReadOutcome, Session};

/// A session whose "child" is a script of output chunks
#[derive(Debug, Default)]
pub struct ScriptedSession {
    active: bool,
    /// Chunks handed out one per read, in order
    output: VecDeque<Vec<u8>>,
    /// Everything written while active
    input: Vec<u8>,
    refuse_spawn: Option<String>,
    fail_writes: bool,
    /// Report child exit once the output queue is empty
    exit_when_drained: bool,
    /// Report EOF once the output queue is empty
    hang_up_when_drained: bool,
    spawns: usize,
    closes: usize,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that reads `data` in one chunk and then exits
    pub fn replay(data: impl Into<Vec<u8>>) -> Self {
        let mut session = Self::new();
        session.push_output(data);
        session.exit_when_drained = true;
        session
    }

    /// Queue a chunk for a later `read_available`
    pub fn push_output(&mut self, chunk: impl Into<Vec<u8>>) {
        let chunk = chunk.into();
        if !chunk.is_empty() {
            self.output.push_back(chunk);
        }
    }

    /// Make every `spawn` fail with `reason`
    pub fn refuse_spawn(&mut self, reason: impl Into<String>) {
        self.refuse_spawn = Some(reason.into());
    }

    /// Make writes fail as if the peer had gone away
    pub fn fail_writes(&mut self) {
        self.fail_writes = true;
    }

    pub fn exit_when_drained(&mut self) {
        self.exit_when_drained = true;
    }

    pub fn hang_up_when_drained(&mut self) {
        self.hang_up_when_drained = true;
    }

    /// Bytes written to the session so far
    pub fn written(&self) -> &[u8] {
        &self.input
    }

    pub fn pending_chunks(&self) -> usize {
        self.output.len()
    }

    pub fn spawn_count(&self) -> usize {
        self.spawns
    }

    pub fn close_count(&self) -> usize {
        self.closes
    }
}

impl Session for ScriptedSession {
    fn spawn(&mut self) -> PtyResult<()> {
        if self.active {
            return Err(PtyError::AlreadyActive);
        }
        if let Some(reason) = &self.refuse_spawn {
            return Err(PtyError::Refused(reason.clone()));
        }
        self.active = true;
        self.spawns += 1;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> PtyResult<usize> {
        if !self.active {
            return Ok(0);
        }
        if self.fail_writes {
            self.close();
            return Err(PtyError::Write(nix::Error::EIO));
        }
        self.input.extend_from_slice(data);
        Ok(data.len())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> ReadOutcome {
        if !self.active {
            return ReadOutcome::Closed;
        }

        let Some(chunk) = self.output.front_mut() else {
            return if self.hang_up_when_drained {
                ReadOutcome::Closed
            } else {
                ReadOutcome::Empty
            };
        };

        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n == chunk.len() {
            self.output.pop_front();
        } else {
            chunk.drain(..n);
        }
        ReadOutcome::Data(n)
    }

    fn poll_exit(&mut self) -> bool {
        !self.active || (self.exit_when_drained && self.output.is_empty())
    }

    fn close(&mut self) {
        if self.active {
            self.active = false;
            self.closes += 1;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reads_in_order() {
        let mut session = ScriptedSession::new();
        session.push_output(b"abc".to_vec());
        session.push_output(b"de".to_vec());
        session.spawn().unwrap();

        let mut buf = [0u8; 2];
        assert_eq!(session.read_available(&mut buf), ReadOutcome::Data(2));
        assert_eq!(&buf, b"ab");
        assert_eq!(session.read_available(&mut buf), ReadOutcome::Data(1));
        assert_eq!(buf[0], b'c');
        assert_eq!(session.read_available(&mut buf), ReadOutcome::Data(2));
        assert_eq!(&buf, b"de");
        assert_eq!(session.read_available(&mut buf), ReadOutcome::Empty);
    }

    #[test]
    fn test_scripted_inactive_session() {
        let mut session = ScriptedSession::new();
        assert_eq!(session.read_available(&mut [0u8; 4]), ReadOutcome::Closed);
        assert_eq!(session.write(b"x").unwrap(), 0);
        assert!(session.written().is_empty());
    }

    #[test]
    fn test_scripted_spawn_twice() {
        let mut session = ScriptedSession::new();
        session.spawn().unwrap();
        assert!(matches!(session.spawn(), Err(PtyError::AlreadyActive)));
        assert_eq!(session.spawn_count(), 1);
    }

    #[test]
    fn test_scripted_refused_spawn() {
        let mut session = ScriptedSession::new();
        session.refuse_spawn("no pty");
        assert!(matches!(session.spawn(), Err(PtyError::Refused(_))));
        assert!(!session.is_active());
    }

    #[test]
    fn test_scripted_write_failure_closes() {
        let mut session = ScriptedSession::new();
        session.spawn().unwrap();
        session.fail_writes();
        assert!(session.write(b"ls\n").is_err());
        assert!(!session.is_active());
    }

    #[test]
    fn test_scripted_replay_exits_when_drained() {
        let mut session = ScriptedSession::replay(b"hi".to_vec());
        session.spawn().unwrap();
        assert!(!session.poll_exit());
        assert_eq!(session.read_available(&mut [0u8; 8]), ReadOutcome::Data(2));
        assert!(session.poll_exit());
    }

    #[test]
    fn test_scripted_close_idempotent() {
        let mut session = ScriptedSession::new();
        session.spawn().unwrap();
        session.close();
        session.close();
        assert_eq!(session.close_count(), 1);
    }
}
