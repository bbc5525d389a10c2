//! Winner selection over a completed proposal set.
//!
//! Pure and deterministic: a left-to-right scan that replaces the
//! running best only on a strictly greater score. The strict comparison
//! is the tie rule: among equal maximal scores the lowest submitter id
//! wins, because an equal score never displaces the held one. That rule
//! is a contract, not an accident of implementation.

use crate::types::{Outcome, Proposal, RunResult};

/// The arbiter's verdict for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Index of the winning proposal.
    pub winner_id: usize,
    /// The winning score.
    pub winner_score: i32,
}

impl Decision {
    /// Expands the decision into one [`Outcome`] per party: `accepted`
    /// for exactly the winner, the shared winner id/score for everyone.
    #[must_use]
    pub fn outcomes(&self, parties: usize) -> Vec<Outcome> {
        (0..parties)
            .map(|id| Outcome {
                accepted: id == self.winner_id,
                winner_id: self.winner_id as i32,
                winner_score: self.winner_score,
            })
            .collect()
    }

    /// The caller-facing result for this decision.
    #[must_use]
    pub fn run_result(&self) -> RunResult {
        RunResult {
            cancelled: false,
            winner_id: self.winner_id as i32,
            winner_score: self.winner_score,
        }
    }
}

/// Selects the winning proposal.
///
/// # Panics
/// Panics if `proposals` is empty; the barrier guarantees a complete,
/// non-empty set before selection runs.
#[must_use]
pub fn select_winner(proposals: &[Proposal]) -> Decision {
    assert!(!proposals.is_empty(), "selection over an empty proposal set");
    let mut best = Decision {
        winner_id: proposals[0].submitter_id,
        winner_score: proposals[0].score,
    };
    for p in &proposals[1..] {
        if p.score > best.winner_score {
            best = Decision {
                winner_id: p.submitter_id,
                winner_score: p.score,
            };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposals(scores: &[i32]) -> Vec<Proposal> {
        scores
            .iter()
            .enumerate()
            .map(|(id, &score)| Proposal::new(id, score, "idea"))
            .collect()
    }

    #[test]
    fn picks_the_highest_score() {
        let d = select_winner(&proposals(&[10, 90, 50]));
        assert_eq!(d, Decision { winner_id: 1, winner_score: 90 });
    }

    #[test]
    fn tie_goes_to_the_lowest_id() {
        let d = select_winner(&proposals(&[80, 95, 95]));
        assert_eq!(d.winner_id, 1);
        assert_eq!(d.winner_score, 95);
    }

    #[test]
    fn single_proposal_wins_trivially() {
        let d = select_winner(&proposals(&[37]));
        assert_eq!(d, Decision { winner_id: 0, winner_score: 37 });
    }

    #[test]
    fn outcomes_accept_exactly_the_winner() {
        let d = select_winner(&proposals(&[5, 5, 5, 6]));
        let outcomes = d.outcomes(4);
        let accepted: Vec<usize> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| o.accepted)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(accepted, vec![3]);
        assert!(outcomes.iter().all(|o| o.winner_id == 3 && o.winner_score == 6));
    }
}
