//! Cooperative cancellation for the interactive loop.
//!
//! # How cancellation flows (for beginners)
//!
//! An interrupt (Ctrl-C) arrives asynchronously, at any moment.  Display
//! drivers are not reentrant, so the interrupt handler must never touch the
//! device.  Instead it only flips a [`CancelToken`]; the interactive loop looks
//! at the token once per iteration, on its own thread of control, and stops
//! when it sees it set.
//!
//! The handler itself is installed through an [`InterruptSource`] and removed
//! again when the returned [`InterruptGuard`] is dropped, so it is only active
//! for as long as the interactive command runs.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A shared "please stop" flag.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.  The only side effect is setting the flag.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears a previous request so the token can guard another run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Uninstalls an interrupt handler when dropped.
#[must_use = "the interrupt handler is removed as soon as the guard is dropped"]
pub struct InterruptGuard {
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl InterruptGuard {
    pub fn new(on_drop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// A guard with nothing to undo.
    pub fn noop() -> Self {
        Self { on_drop: None }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if let Some(undo) = self.on_drop.take() {
            undo();
        }
    }
}

/// Something that can deliver an external interrupt to a [`CancelToken`].
pub trait InterruptSource: Send + Sync {
    /// Starts forwarding interrupts to `token` until the guard is dropped.
    fn install(&self, token: CancelToken) -> InterruptGuard;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_token_starts_clear_and_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());

        clone.cancel();

        assert!(token.is_cancelled());
    }

    #[test]
    fn test_reset_clears_flag_for_all_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();

        clone.reset();

        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_guard_runs_undo_exactly_once_on_drop() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let guard = InterruptGuard::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 0);
        drop(guard);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
