//! Fan-out outcome broadcast: one publish releases every waiter.
//!
//! The coordinator calls [`OutcomeBroadcast::publish`] exactly once per
//! round, with either the real outcomes or the all-sentinel abort set.
//! Every submitter blocks in [`OutcomeBroadcast::wait`] on the shared
//! readiness flag, not on a per-id signal, so a submitter that starts
//! waiting after the publish still observes it. All slot writes happen
//! under the same mutex that guards the flag, which gives waiters the
//! publish-then-flag visibility ordering for free.
//!
//! # Cancel Safety
//!
//! Cancellation wakes all waiters so they re-check readiness, but a
//! `wait` only ever returns a published outcome. Liveness under
//! cancellation comes from the coordinator's guarantee that exactly one
//! publish (normal or abort) happens per round.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::cancel::CancelToken;
use crate::types::Outcome;

#[derive(Debug)]
struct BroadcastState {
    slots: Vec<Option<Outcome>>,
    published: bool,
}

#[derive(Debug)]
struct BroadcastInner {
    state: Mutex<BroadcastState>,
    ready: Condvar,
}

/// Fan-out broadcast over `parties` outcome slots.
#[derive(Debug)]
pub struct OutcomeBroadcast {
    parties: usize,
    inner: Arc<BroadcastInner>,
}

impl OutcomeBroadcast {
    /// Creates a broadcast for `parties` submitters, wired to `cancel`
    /// so that cancellation forces blocked waiters to re-check.
    ///
    /// # Panics
    /// Panics if `parties == 0`.
    #[must_use]
    pub fn new(parties: usize, cancel: &CancelToken) -> Self {
        assert!(parties > 0, "broadcast requires at least 1 party");
        let inner = Arc::new(BroadcastInner {
            state: Mutex::new(BroadcastState {
                slots: vec![None; parties],
                published: false,
            }),
            ready: Condvar::new(),
        });
        let wake = Arc::clone(&inner);
        cancel.register_wake(Box::new(move || {
            let _guard = wake.state.lock();
            wake.ready.notify_all();
        }));
        Self { parties, inner }
    }

    /// Returns the number of outcome slots.
    #[must_use]
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Returns whether the outcomes have been published.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.inner.state.lock().published
    }

    /// Publishes one outcome per slot and wakes every waiter.
    ///
    /// # Panics
    /// Panics if called a second time, or if `outcomes` does not hold
    /// exactly one entry per party. Both are orchestration bugs.
    pub fn publish(&self, outcomes: Vec<Outcome>) {
        assert_eq!(
            outcomes.len(),
            self.parties,
            "publish requires one outcome per party"
        );
        let mut state = self.inner.state.lock();
        assert!(!state.published, "outcomes published twice");
        for (slot, outcome) in state.slots.iter_mut().zip(outcomes) {
            *slot = Some(outcome);
        }
        state.published = true;
        tracing::debug!(parties = self.parties, "outcomes published");
        self.inner.ready.notify_all();
    }

    /// Blocks until the outcomes are published, then consumes and
    /// returns the outcome for `id`.
    ///
    /// # Panics
    /// Panics if `id` is out of range or its outcome was already
    /// consumed; each slot is read once, by its owning submitter.
    pub fn wait(&self, id: usize) -> Outcome {
        assert!(
            id < self.parties,
            "outcome id {id} out of range for {} parties",
            self.parties
        );
        let mut state = self.inner.state.lock();
        while !state.published {
            self.inner.ready.wait(&mut state);
        }
        state.slots[id].take().expect("outcome consumed twice")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn outcomes(winner: usize, score: i32, parties: usize) -> Vec<Outcome> {
        (0..parties)
            .map(|id| Outcome {
                accepted: id == winner,
                winner_id: winner as i32,
                winner_score: score,
            })
            .collect()
    }

    #[test]
    fn waiters_parked_before_publish_are_released() {
        let token = CancelToken::new();
        let broadcast = Arc::new(OutcomeBroadcast::new(4, &token));

        let mut waiters = Vec::new();
        for id in 0..4 {
            let broadcast = Arc::clone(&broadcast);
            waiters.push(thread::spawn(move || broadcast.wait(id)));
        }
        thread::sleep(Duration::from_millis(50));
        broadcast.publish(outcomes(2, 88, 4));

        for (id, waiter) in waiters.into_iter().enumerate() {
            let outcome = waiter.join().unwrap();
            assert_eq!(outcome.accepted, id == 2);
            assert_eq!(outcome.winner_id, 2);
            assert_eq!(outcome.winner_score, 88);
        }
    }

    #[test]
    fn waiter_arriving_after_publish_sees_it() {
        let token = CancelToken::new();
        let broadcast = OutcomeBroadcast::new(2, &token);
        broadcast.publish(outcomes(0, 30, 2));
        assert!(broadcast.wait(1).winner_id == 0);
    }

    #[test]
    fn abort_publish_delivers_sentinels() {
        let token = CancelToken::new();
        let broadcast = Arc::new(OutcomeBroadcast::new(3, &token));

        let waiter = {
            let broadcast = Arc::clone(&broadcast);
            thread::spawn(move || broadcast.wait(1))
        };
        thread::sleep(Duration::from_millis(20));
        token.cancel();
        // The wake alone must not release the waiter; the abort publish
        // does.
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());
        broadcast.publish(vec![Outcome::cancelled(); 3]);
        assert_eq!(waiter.join().unwrap(), Outcome::cancelled());
    }

    #[test]
    #[should_panic(expected = "published twice")]
    fn double_publish_panics() {
        let token = CancelToken::new();
        let broadcast = OutcomeBroadcast::new(2, &token);
        broadcast.publish(outcomes(0, 10, 2));
        broadcast.publish(outcomes(1, 20, 2));
    }

    #[test]
    #[should_panic(expected = "one outcome per party")]
    fn short_publish_panics() {
        let token = CancelToken::new();
        let broadcast = OutcomeBroadcast::new(3, &token);
        broadcast.publish(outcomes(0, 10, 2));
    }
}
