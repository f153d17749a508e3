//! Session Pool
//!
//! A fixed set of independent terminals, created up front. The host decides
//! which in-world object shows which slot; the pool only owns the terminals
//! and pumps the live ones.

#[cfg(unix)]
use crate::app::TerminalConfig;
#[cfg(unix)]
use crate::pty::PtySession;
use crate::pty::Session;
use crate::terminal::Terminal;

/// Fixed-size collection of terminals
pub struct SessionPool<S: Session> {
    terminals: Vec<Terminal<S>>,
}

#[cfg(unix)]
impl SessionPool<PtySession> {
    /// Create `config.pool_size` inert shell terminals
    pub fn new(config: &TerminalConfig) -> Self {
        Self::from_fn(config.pool_size, |_| Terminal::new(config))
    }
}

impl<S: Session> SessionPool<S> {
    /// Build each slot with `make(index)`
    pub fn from_fn(size: usize, make: impl FnMut(usize) -> Terminal<S>) -> Self {
        Self {
            terminals: (0..size).map(make).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.terminals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminals.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Terminal<S>> {
        self.terminals.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Terminal<S>> {
        self.terminals.get_mut(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Terminal<S>> {
        self.terminals.iter()
    }

    pub fn active_count(&self) -> usize {
        self.terminals.iter().filter(|t| t.is_active()).count()
    }

    /// Lowest slot whose terminal has no live child
    pub fn first_inert_slot(&self) -> Option<usize> {
        self.terminals.iter().position(|t| !t.is_active())
    }

    /// Run one `update` on every active terminal
    pub fn update_active(&mut self) {
        for term in self.terminals.iter_mut().filter(|t| t.is_active()) {
            term.update();
        }
    }

    /// Close every terminal
    pub fn close_all(&mut self) {
        for term in &mut self.terminals {
            term.close();
        }
        tracing::debug!(slots = self.terminals.len(), "closed session pool");
    }
}
