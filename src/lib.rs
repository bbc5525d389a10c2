//! Single-round proposal rendezvous.
//!
//! N submitters each compose one scored proposal; one coordinator waits
//! for all of them, selects the unique highest-scoring proposal
//! (lowest id wins ties), and broadcasts the outcome back to every
//! submitter. A one-shot [`CancelToken`] can abort the round at any
//! point: every blocked party is woken and receives the sentinel
//! outcome instead of hanging.
//!
//! # Architecture
//!
//! The round is a two-phase rendezvous built from two independent
//! primitives sharing one cancellation token:
//!
//! - [`SubmissionBarrier`] for fan-in: N registrations release the
//!   coordinator, which takes ownership of the complete proposal set.
//! - [`OutcomeBroadcast`] for fan-out: one publish (real or abort
//!   sentinels) releases all N submitters.
//!
//! [`run_round`] wires the workers around these primitives; proposal
//! generation sits behind [`ProposalSource`] and narration behind
//! [`Narrator`], so neither randomness nor I/O leaks into the protocol.
//!
//! # Example
//!
//! ```
//! use overture::{run_round, CancelToken, NullNarrator, RoundConfig, ScriptedSource};
//!
//! let config = RoundConfig { participants: 3, ..RoundConfig::default() };
//! let source = ScriptedSource::new(vec![10, 90, 50]);
//! let result = run_round(&config, &source, &NullNarrator, &CancelToken::new()).unwrap();
//! assert_eq!((result.winner_id, result.winner_score), (1, 90));
//! ```

pub mod arbiter;
pub mod cancel;
pub mod config;
pub mod error;
pub mod narrate;
pub mod round;
pub mod source;
pub mod sync;
pub mod types;

pub use arbiter::{select_winner, Decision};
pub use cancel::CancelToken;
pub use config::{ConfigError, RoundConfig, MAX_PARTICIPANTS, MIN_PARTICIPANTS};
pub use error::Error;
pub use narrate::{Narrator, NullNarrator, TeeNarrator};
pub use round::run_round;
pub use source::{ProposalSource, ScriptedSource, SeededSource};
pub use sync::{OutcomeBroadcast, SubmissionBarrier, WaitError};
pub use types::{Outcome, Proposal, RunResult, MAX_DETAIL_BYTES};
