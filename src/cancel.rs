//! One-shot, process-wide cancellation token with broadcast wake.
//!
//! [`CancelToken`] is the only channel through which an external actor
//! (typically a SIGINT handler) talks to the protocol. Setting it is
//! idempotent and irreversible; the first `cancel()` call runs every
//! registered wake hook exactly once, so parties blocked inside the
//! synchronization primitives re-check their condition instead of
//! sleeping through the event.
//!
//! # Cancel Safety
//!
//! - `cancel()` before any waiter: waiters observe the flag before
//!   blocking and never park.
//! - `cancel()` concurrent with a waiter about to park: every hook locks
//!   the waiter's own state mutex before notifying, which serializes the
//!   wake against the waiter's check-then-park and rules out a lost
//!   wakeup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

type WakeHook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct TokenState {
    requested: AtomicBool,
    /// Wake hooks of the primitives built on this token. Two is the
    /// common case: one barrier, one broadcast.
    hooks: Mutex<SmallVec<[WakeHook; 2]>>,
}

/// One-shot cancellation token shared by every party of a round.
///
/// Cloning is cheap and all clones observe the same flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    state: Arc<TokenState>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    ///
    /// The first call flips the flag and broadcasts a wake to every
    /// registered primitive; later calls are no-ops. Returns `true` if
    /// this call performed the transition.
    pub fn cancel(&self) -> bool {
        if self
            .state
            .requested
            .compare_exchange(false, true, Ordering::Release, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }
        tracing::debug!("cancellation requested");
        let hooks = self.state.hooks.lock();
        for hook in hooks.iter() {
            hook();
        }
        true
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.requested.load(Ordering::Acquire)
    }

    /// Registers a wake hook to run when cancellation fires.
    ///
    /// If the token is already cancelled the hook runs immediately, so a
    /// primitive constructed after the fact still gets its wake.
    pub(crate) fn register_wake(&self, hook: WakeHook) {
        let mut hooks = self.state.hooks.lock();
        if self.is_cancelled() {
            // cancel() already ran the stored hooks; run this one here
            // instead of storing it, so it fires exactly once.
            drop(hooks);
            hook();
            return;
        }
        hooks.push(hook);
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancelToken::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        token.register_wake(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(token.cancel());
        assert!(!token.cancel());
        assert!(!token.cancel());
        assert!(token.is_cancelled());
        // The hook ran exactly once despite three cancel calls.
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn late_hook_fires_immediately_on_cancelled_token() {
        let token = CancelToken::new();
        token.cancel();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        token.register_wake(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
    }
}
