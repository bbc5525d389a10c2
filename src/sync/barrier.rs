//! Fan-in submission barrier: N registrations release one waiter.
//!
//! Each submitter hands its proposal to [`SubmissionBarrier::register`]
//! exactly once; the coordinator blocks in
//! [`SubmissionBarrier::wait_all`] until every slot is filled or
//! cancellation fires. On normal completion `wait_all` moves the whole
//! proposal set out, so a partial read of the slots is not expressible.
//!
//! # Cancel Safety
//!
//! `wait_all` re-checks the cancellation token every time it wakes. The
//! token's wake hook takes the barrier's own mutex before notifying,
//! which serializes the wake against a waiter about to park.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::cancel::CancelToken;
use crate::types::Proposal;

/// Error returned when waiting on the barrier fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// Cancelled while waiting.
    Cancelled,
}

impl std::fmt::Display for WaitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "wait cancelled"),
        }
    }
}

impl std::error::Error for WaitError {}

#[derive(Debug)]
struct BarrierState {
    slots: Vec<Option<Proposal>>,
    arrived: usize,
}

#[derive(Debug)]
struct BarrierInner {
    state: Mutex<BarrierState>,
    all_in: Condvar,
}

/// Fan-in barrier over `parties` proposal slots.
#[derive(Debug)]
pub struct SubmissionBarrier {
    parties: usize,
    inner: Arc<BarrierInner>,
    cancel: CancelToken,
}

impl SubmissionBarrier {
    /// Creates a barrier for `parties` submitters, wired to `cancel` so
    /// that cancellation wakes a blocked `wait_all`.
    ///
    /// # Panics
    /// Panics if `parties == 0`.
    #[must_use]
    pub fn new(parties: usize, cancel: &CancelToken) -> Self {
        assert!(parties > 0, "barrier requires at least 1 party");
        let inner = Arc::new(BarrierInner {
            state: Mutex::new(BarrierState {
                slots: (0..parties).map(|_| None).collect(),
                arrived: 0,
            }),
            all_in: Condvar::new(),
        });
        let wake = Arc::clone(&inner);
        cancel.register_wake(Box::new(move || {
            let _guard = wake.state.lock();
            wake.all_in.notify_all();
        }));
        Self {
            parties,
            inner,
            cancel: cancel.clone(),
        }
    }

    /// Returns the number of registrations that release the barrier.
    #[must_use]
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Returns how many submitters have registered so far.
    #[must_use]
    pub fn arrived(&self) -> usize {
        self.inner.state.lock().arrived
    }

    /// Stores `proposal` in slot `id` and counts the registration. The
    /// registrant that completes the count wakes the waiter.
    ///
    /// # Panics
    /// Panics if `id` is out of range or the slot is already filled;
    /// both are orchestration bugs, not runtime conditions.
    pub fn register(&self, id: usize, proposal: Proposal) {
        assert!(
            id < self.parties,
            "registration id {id} out of range for {} parties",
            self.parties
        );
        let mut state = self.inner.state.lock();
        assert!(
            state.slots[id].is_none(),
            "duplicate registration for submitter {id}"
        );
        state.slots[id] = Some(proposal);
        state.arrived += 1;
        tracing::debug!(id, arrived = state.arrived, parties = self.parties, "registered");
        if state.arrived == self.parties {
            // Exactly one registrant observes the final count.
            self.inner.all_in.notify_all();
        }
    }

    /// Blocks until all parties have registered or cancellation fires.
    ///
    /// On completion the full proposal set is moved out in slot order.
    /// Intended for a single waiter (the coordinator); a second
    /// successful `wait_all` cannot happen because the slots are
    /// consumed.
    ///
    /// # Errors
    /// Returns [`WaitError::Cancelled`] if the token fired before the
    /// final registration was observed.
    pub fn wait_all(&self) -> Result<Vec<Proposal>, WaitError> {
        let mut state = self.inner.state.lock();
        loop {
            if state.arrived == self.parties {
                let proposals = state
                    .slots
                    .iter_mut()
                    .map(|slot| slot.take().expect("arrived == parties with an empty slot"))
                    .collect();
                return Ok(proposals);
            }
            if self.cancel.is_cancelled() {
                tracing::debug!(arrived = state.arrived, "wait_all cancelled");
                return Err(WaitError::Cancelled);
            }
            self.inner.all_in.wait(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn proposal(id: usize, score: i32) -> Proposal {
        Proposal::new(id, score, "test")
    }

    #[test]
    fn releases_once_all_registered() {
        let token = CancelToken::new();
        let barrier = SubmissionBarrier::new(3, &token);
        for id in 0..3 {
            barrier.register(id, proposal(id, 10 + id as i32));
        }
        let proposals = barrier.wait_all().unwrap();
        assert_eq!(proposals.len(), 3);
        assert_eq!(proposals[2].score, 12);
    }

    #[test]
    fn blocks_until_the_last_registration() {
        let token = CancelToken::new();
        let barrier = Arc::new(SubmissionBarrier::new(5, &token));
        for id in 0..4 {
            barrier.register(id, proposal(id, 1));
        }

        let waiter = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || barrier.wait_all())
        };
        // Four of five registered: the waiter must still be parked.
        thread::sleep(Duration::from_millis(100));
        assert!(!waiter.is_finished());

        barrier.register(4, proposal(4, 1));
        let proposals = waiter.join().unwrap().unwrap();
        assert_eq!(proposals.len(), 5);
    }

    #[test]
    fn cancellation_unblocks_the_waiter() {
        let token = CancelToken::new();
        let barrier = Arc::new(SubmissionBarrier::new(2, &token));
        barrier.register(0, proposal(0, 1));

        let waiter = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || barrier.wait_all())
        };
        thread::sleep(Duration::from_millis(50));
        token.cancel();
        assert_eq!(waiter.join().unwrap(), Err(WaitError::Cancelled));
    }

    #[test]
    fn cancelled_before_waiting_returns_immediately() {
        let token = CancelToken::new();
        let barrier = SubmissionBarrier::new(2, &token);
        token.cancel();
        assert_eq!(barrier.wait_all(), Err(WaitError::Cancelled));
    }

    #[test]
    #[should_panic(expected = "duplicate registration")]
    fn duplicate_registration_panics() {
        let token = CancelToken::new();
        let barrier = SubmissionBarrier::new(2, &token);
        barrier.register(0, proposal(0, 1));
        barrier.register(0, proposal(0, 2));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_registration_panics() {
        let token = CancelToken::new();
        let barrier = SubmissionBarrier::new(2, &token);
        barrier.register(2, proposal(2, 1));
    }

    #[test]
    fn completion_wins_over_late_cancellation() {
        // All registrations already in: wait_all must return the
        // proposals even if the token fires concurrently.
        let token = CancelToken::new();
        let barrier = SubmissionBarrier::new(1, &token);
        barrier.register(0, proposal(0, 42));
        token.cancel();
        let proposals = barrier.wait_all().unwrap();
        assert_eq!(proposals[0].score, 42);
    }
}
