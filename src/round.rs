//! One rendezvous round: worker loops and the entry point.
//!
//! [`run_round`] spawns N submitter threads, runs the coordinator on
//! the calling thread, and returns once every worker has terminated.
//! The round is single-shot: its state lives exactly as long as this
//! call.
//!
//! Liveness contract: the coordinator executes exactly one publish per
//! round, either the real outcomes after a normal barrier completion or
//! the all-sentinel abort set after a cancelled one, so every submitter's
//! outcome wait returns. A submitter cancelled while still composing
//! never registers, which is precisely the case the abort path covers.

use std::thread;
use std::time::Duration;

use crate::arbiter::select_winner;
use crate::cancel::CancelToken;
use crate::config::{RoundConfig, MAX_PARTICIPANTS, MIN_PARTICIPANTS};
use crate::error::Error;
use crate::narrate::Narrator;
use crate::source::ProposalSource;
use crate::sync::{OutcomeBroadcast, SubmissionBarrier};
use crate::types::{Outcome, RunResult};

/// Granularity at which a composing submitter re-checks cancellation.
const THINK_SLICE: Duration = Duration::from_millis(25);

/// Runs one complete rendezvous round.
///
/// Blocks until all `config.participants` submitters and the
/// coordinator have terminated, which the publish contract guarantees
/// happens even under cancellation.
///
/// # Errors
/// Returns [`Error::InvalidParticipants`] before starting any thread if
/// the submitter count is outside `[1, 1000]`.
pub fn run_round(
    config: &RoundConfig,
    source: &dyn ProposalSource,
    narrator: &dyn Narrator,
    cancel: &CancelToken,
) -> Result<RunResult, Error> {
    let parties = config.participants;
    if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&parties) {
        return Err(Error::InvalidParticipants { got: parties });
    }

    let barrier = SubmissionBarrier::new(parties, cancel);
    let broadcast = OutcomeBroadcast::new(parties, cancel);

    let result = thread::scope(|s| {
        for id in 0..parties {
            let barrier = &barrier;
            let broadcast = &broadcast;
            s.spawn(move || {
                run_submitter(id, barrier, broadcast, source, narrator, cancel);
            });
        }
        run_coordinator(&barrier, &broadcast, narrator)
    });

    Ok(result)
}

/// Submitter loop: compose, register, await the outcome.
fn run_submitter(
    id: usize,
    barrier: &SubmissionBarrier,
    broadcast: &OutcomeBroadcast,
    source: &dyn ProposalSource,
    narrator: &dyn Narrator,
    cancel: &CancelToken,
) {
    let think = source.think_time(id);
    tracing::debug!(id, ?think, "submitter thinking");
    if !think_while_watching(think, cancel) {
        tracing::debug!(id, "submitter cancelled while thinking");
        narrator.emit(&format!("[submitter {id:02}] interrupted while composing"));
        // No registration; the coordinator's abort publish still hands
        // this submitter its sentinel outcome.
        let outcome = broadcast.wait(id);
        debug_assert!(!outcome.accepted);
        return;
    }

    let proposal = source.compose(id);
    narrator.emit(&format!(
        "[submitter {id:02}] sent proposal: score={}, idea='{}' (thought {:.1}s)",
        proposal.score,
        proposal.detail,
        think.as_secs_f64()
    ));
    barrier.register(id, proposal);

    let outcome = broadcast.wait(id);
    let line = if outcome.winner_id < 0 {
        format!("[submitter {id:02}] outcome: round cancelled, no winner")
    } else if outcome.accepted {
        format!(
            "[submitter {id:02}] outcome: accepted with score {}",
            outcome.winner_score
        )
    } else {
        format!(
            "[submitter {id:02}] outcome: declined (winner {}, score {})",
            outcome.winner_id, outcome.winner_score
        )
    };
    narrator.emit(&line);
}

/// Coordinator loop: gather, select, publish (or abort-publish).
fn run_coordinator(
    barrier: &SubmissionBarrier,
    broadcast: &OutcomeBroadcast,
    narrator: &dyn Narrator,
) -> RunResult {
    let parties = barrier.parties();
    tracing::debug!(parties, "coordinator waiting for all proposals");
    match barrier.wait_all() {
        Ok(proposals) => {
            narrator.emit(&format!("[coordinator] all {parties} proposals received"));
            // Cancellation from here on is best-effort: selection has
            // started, so the round completes with a real winner.
            let decision = select_winner(&proposals);
            narrator.emit(&format!(
                "[coordinator] winner is submitter {} with score {}",
                decision.winner_id, decision.winner_score
            ));
            broadcast.publish(decision.outcomes(parties));
            decision.run_result()
        }
        Err(_) => {
            narrator.emit(&format!(
                "[coordinator] cancelled with {} of {parties} proposals; declining all",
                barrier.arrived()
            ));
            broadcast.publish(vec![Outcome::cancelled(); parties]);
            RunResult::cancelled()
        }
    }
}

/// Sleeps for `total`, waking early if cancellation fires. Returns
/// `false` when interrupted.
fn think_while_watching(total: Duration, cancel: &CancelToken) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if cancel.is_cancelled() {
            return false;
        }
        let slice = remaining.min(THINK_SLICE);
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
    !cancel.is_cancelled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrate::NullNarrator;
    use crate::source::ScriptedSource;

    #[test]
    fn rejects_out_of_range_participant_counts() {
        let source = ScriptedSource::new(Vec::new());
        for got in [0, 1001] {
            let config = RoundConfig {
                participants: got,
                ..RoundConfig::default()
            };
            let err = run_round(&config, &source, &NullNarrator, &CancelToken::new());
            assert!(matches!(err, Err(Error::InvalidParticipants { got: g }) if g == got));
        }
    }

    #[test]
    fn single_submitter_wins_trivially() {
        let config = RoundConfig {
            participants: 1,
            ..RoundConfig::default()
        };
        let source = ScriptedSource::new(vec![64]);
        let result = run_round(&config, &source, &NullNarrator, &CancelToken::new()).unwrap();
        assert_eq!(
            result,
            RunResult {
                cancelled: false,
                winner_id: 0,
                winner_score: 64
            }
        );
    }

    #[test]
    fn interrupted_thinking_reports_cancellation() {
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(!think_while_watching(Duration::from_secs(60), &cancel));
    }

    #[test]
    fn uninterrupted_thinking_completes() {
        let cancel = CancelToken::new();
        assert!(think_while_watching(Duration::from_millis(5), &cancel));
    }
}
