//! Process interrupt (Ctrl-C) delivery.
//!
//! [`CtrlCInterrupts`] listens for Ctrl-C on a background tokio task and, when
//! it arrives, only sets the [`CancelToken`].  Dropping the returned guard
//! aborts the task, after which Ctrl-C is no longer forwarded to the token.
//!
//! Once tokio has registered its SIGINT handler it stays registered for the
//! rest of the process; aborting the task does not restore the default
//! action, so a Ctrl-C after the draw test is swallowed.

pub mod mock;

use tracing::{info, warn};

use crate::application::cancel::{CancelToken, InterruptGuard, InterruptSource};

/// Forwards Ctrl-C to a [`CancelToken`] while installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CtrlCInterrupts;

impl InterruptSource for CtrlCInterrupts {
    fn install(&self, token: CancelToken) -> InterruptGuard {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime; Ctrl-C will not stop the draw test gracefully");
            return InterruptGuard::noop();
        };

        let task = runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, shutting down");
                token.cancel();
            }
        });
        info!("Ctrl-C handler installed");

        InterruptGuard::new(move || task.abort())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_and_drop_leaves_token_untouched() {
        let token = CancelToken::new();

        let guard = CtrlCInterrupts.install(token.clone());
        drop(guard);

        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_install_outside_runtime_is_noop() {
        let token = CancelToken::new();

        let _guard = CtrlCInterrupts.install(token.clone());

        assert!(!token.is_cancelled());
    }
}
