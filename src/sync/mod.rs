//! Synchronization primitives for the two-phase rendezvous.
//!
//! One round pairs two primitives around a single shared-state policy:
//!
//! - [`SubmissionBarrier`]: fan-in, N registrations release one waiter
//!   (the coordinator).
//! - [`OutcomeBroadcast`]: fan-out, one publish releases N waiters
//!   (the submitters).
//!
//! Both primitives observe the same [`CancelToken`](crate::CancelToken)
//! so that no blocked party sleeps through cancellation. They use
//! independent mutexes; no code path holds both at once.

mod barrier;
mod outcome;

pub use barrier::{SubmissionBarrier, WaitError};
pub use outcome::OutcomeBroadcast;
