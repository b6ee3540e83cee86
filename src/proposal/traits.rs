//! Candidate proposal capability

use crate::config::BetterDirection;
use crate::error::Result;
use crate::ledger::RowId;

/// A resolved trial expressed in normalized coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedObservation {
    pub row_id: RowId,
    /// One coordinate per parameter, in declaration order
    pub point: Vec<f64>,
    pub output: f64,
    pub cost: f64,
}

/// History handed to a proposer; all points are normalized and ordered by
/// parameter declaration
#[derive(Debug, Clone, Copy)]
pub struct ProposalContext<'a> {
    /// Row id the proposal will be issued under
    pub row_id: RowId,
    pub search_center: &'a [f64],
    pub successes: &'a [NormalizedObservation],
    pub failures: &'a [NormalizedObservation],
    pub outstanding: &'a [Vec<f64>],
    pub better_direction: BetterDirection,
}

impl ProposalContext<'_> {
    /// Number of coordinates a proposal must contain
    pub fn dimension(&self) -> usize {
        self.search_center.len()
    }
}

/// Ranks or samples the next candidate point
pub trait CandidateProposer: Send {
    /// Return exactly `ctx.dimension()` normalized coordinates
    fn propose(&mut self, ctx: &ProposalContext<'_>) -> Result<Vec<f64>>;
}
