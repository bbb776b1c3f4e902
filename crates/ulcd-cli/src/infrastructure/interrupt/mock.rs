//! Interrupt source for tests.
//!
//! `MockInterrupts` counts how often a handler was installed and removed, and
//! can simulate an interrupt that arrives immediately or on demand.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use crate::application::cancel::{CancelToken, InterruptGuard, InterruptSource};

#[derive(Default)]
pub struct MockInterrupts {
    installs: Arc<AtomicUsize>,
    removals: Arc<AtomicUsize>,
    /// Cancel the token as soon as a handler is installed.
    pub fire_immediately: bool,
    active: Mutex<Option<CancelToken>>,
}

impl MockInterrupts {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose interrupt arrives the moment it is installed.
    pub fn firing() -> Self {
        Self {
            fire_immediately: true,
            ..Self::default()
        }
    }

    /// Simulates Ctrl-C.  Returns `false` when no handler is installed.
    pub fn interrupt(&self) -> bool {
        let active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        match active.as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

impl InterruptSource for MockInterrupts {
    fn install(&self, token: CancelToken) -> InterruptGuard {
        self.installs.fetch_add(1, Ordering::SeqCst);
        if self.fire_immediately {
            token.cancel();
        }
        *self.active.lock().unwrap_or_else(|p| p.into_inner()) = Some(token);

        let removals = Arc::clone(&self.removals);
        InterruptGuard::new(move || {
            removals.fetch_add(1, Ordering::SeqCst);
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
