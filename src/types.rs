//! Core data types for one rendezvous round.
//!
//! A [`Proposal`] is created exactly once by its owning submitter and is
//! immutable from then on; registering it with the barrier transfers
//! ownership into the protocol. An [`Outcome`] is written exactly once per
//! submitter, by exactly one writer (the coordinator's normal publish or
//! its abort publish), and consumed exactly once by the owning submitter.

use core::fmt;

/// Maximum length of a proposal's detail text, in bytes.
pub const MAX_DETAIL_BYTES: usize = 128;

/// One scored proposal from a single submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Identity of the submitter that composed this proposal.
    pub submitter_id: usize,
    /// Attractiveness score in `[1, 100]`.
    pub score: i32,
    /// Free-form description, at most [`MAX_DETAIL_BYTES`] bytes.
    pub detail: String,
}

impl Proposal {
    /// Creates a proposal, truncating `detail` to [`MAX_DETAIL_BYTES`]
    /// bytes on a character boundary.
    #[must_use]
    pub fn new(submitter_id: usize, score: i32, detail: impl Into<String>) -> Self {
        let mut detail = detail.into();
        if detail.len() > MAX_DETAIL_BYTES {
            let mut cut = MAX_DETAIL_BYTES;
            while !detail.is_char_boundary(cut) {
                cut -= 1;
            }
            detail.truncate(cut);
        }
        Self {
            submitter_id,
            score,
            detail,
        }
    }
}

/// The per-submitter result of a round.
///
/// Every outcome of a given round carries the same `winner_id` and
/// `winner_score`. `accepted` is true for exactly the winning submitter
/// when the round completed, and false for everyone when it was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Whether this submitter's proposal won.
    pub accepted: bool,
    /// Winning submitter id, or `-1` if the round was cancelled.
    pub winner_id: i32,
    /// Winning score, or `-1` if the round was cancelled.
    pub winner_score: i32,
}

impl Outcome {
    /// The sentinel outcome delivered to every submitter of a cancelled
    /// round.
    #[must_use]
    pub const fn cancelled() -> Self {
        Self {
            accepted: false,
            winner_id: -1,
            winner_score: -1,
        }
    }
}

/// Aggregate result of one round, as seen by the caller of
/// [`run_round`](crate::run_round).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Whether the round was cancelled before a winner was selected.
    pub cancelled: bool,
    /// Winning submitter id, or `-1` if cancelled.
    pub winner_id: i32,
    /// Winning score, or `-1` if cancelled.
    pub winner_score: i32,
}

impl RunResult {
    /// The result of a cancelled round.
    #[must_use]
    pub const fn cancelled() -> Self {
        Self {
            cancelled: true,
            winner_id: -1,
            winner_score: -1,
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cancelled {
            write!(f, "cancelled")
        } else {
            write!(
                f,
                "winner {} with score {}",
                self.winner_id, self.winner_score
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_truncated_on_char_boundary() {
        // 43 four-byte scalars = 172 bytes; the cut must land on a boundary.
        let long: String = "\u{1F386}".repeat(43);
        let p = Proposal::new(0, 50, long);
        assert!(p.detail.len() <= MAX_DETAIL_BYTES);
        assert_eq!(p.detail.len() % 4, 0);
    }

    #[test]
    fn short_detail_is_kept_verbatim() {
        let p = Proposal::new(3, 77, "cinema and pizza");
        assert_eq!(p.detail, "cinema and pizza");
        assert_eq!(p.submitter_id, 3);
    }

    #[test]
    fn cancelled_sentinels_agree() {
        let o = Outcome::cancelled();
        let r = RunResult::cancelled();
        assert!(!o.accepted);
        assert_eq!((o.winner_id, o.winner_score), (-1, -1));
        assert_eq!((r.winner_id, r.winner_score), (-1, -1));
        assert!(r.cancelled);
    }
}
