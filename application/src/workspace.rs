//! Shared working state
//!
//! [`Workspace`] is the one context object the use cases share: the live
//! [`SessionState`] behind a lock. Every access is a short closure with no
//! `.await` inside, so two mutations of the same node never interleave.

use agentic_domain::SessionState;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    inner: Arc<Mutex<SessionState>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: SessionState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` with shared access
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.lock())
    }

    /// Run `f` with exclusive access
    pub fn write<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Deep copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    /// Swap in another session's contents, invalidating in-flight replies
    pub fn replace(&self, state: SessionState) {
        self.lock().replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentic_domain::ModelBinding;

    #[test]
    fn test_clones_share_state() {
        let workspace = Workspace::new();
        let other = workspace.clone();
        other.write(|s| s.forest.create_roots(&[ModelBinding::new("a", "A")], "hi"));
        assert_eq!(workspace.read(|s| s.forest.len()), 1);
    }

    #[test]
    fn test_replace_bumps_generation() {
        let workspace = Workspace::new();
        let before = workspace.read(|s| s.forest.generation());
        workspace.replace(SessionState::new());
        assert!(workspace.read(|s| s.forest.generation()) > before);
    }
}
