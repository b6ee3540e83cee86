//! In-memory ledgers
//!
//! Every row id lives in exactly one partition: outstanding, success,
//! failure, or forgotten. [`Ledgers`] owns all four and only moves a row
//! out of the outstanding partition together with its arrival elsewhere.

mod observation;
mod suggestion;
mod types;

pub use observation::{ForgottenSet, ObservationLedger};
pub use suggestion::SuggestionLedger;
pub use types::{
    LedgerKind, Observation, ObservationRecord, ObservationResult, RowId, Suggestion, ROW_ID_KEY,
};

use serde::{Deserialize, Serialize};

/// Sizes of the four partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerCounts {
    pub outstanding: usize,
    pub success: usize,
    pub failure: usize,
    pub forgotten: usize,
}

impl LedgerCounts {
    /// Every row the engine has ever issued or recorded
    pub fn total(&self) -> usize {
        self.outstanding + self.success + self.failure + self.forgotten
    }
}

/// Which partition currently holds a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Outstanding,
    Success,
    Failure,
    Forgotten,
}

/// The four partitions, mutated only through partition-preserving moves
#[derive(Debug, Clone, Default)]
pub struct Ledgers {
    pub(crate) suggestions: SuggestionLedger,
    pub(crate) observations: ObservationLedger,
    pub(crate) forgotten: ForgottenSet,
}

impl Ledgers {
    pub fn suggestions(&self) -> &SuggestionLedger {
        &self.suggestions
    }

    pub fn observations(&self) -> &ObservationLedger {
        &self.observations
    }

    pub fn forgotten(&self) -> &ForgottenSet {
        &self.forgotten
    }

    pub fn counts(&self) -> LedgerCounts {
        LedgerCounts {
            outstanding: self.suggestions.len(),
            success: self.observations.success().len(),
            failure: self.observations.failure().len(),
            forgotten: self.forgotten.len(),
        }
    }

    pub fn partition_of(&self, row_id: RowId) -> Option<Partition> {
        if self.suggestions.contains(row_id) {
            Some(Partition::Outstanding)
        } else if self.forgotten.contains(row_id) {
            Some(Partition::Forgotten)
        } else if self.observations.success().iter().any(|r| r.row_id == row_id) {
            Some(Partition::Success)
        } else if self.observations.failure().iter().any(|r| r.row_id == row_id) {
            Some(Partition::Failure)
        } else {
            None
        }
    }

    /// Largest row id held in any partition
    pub fn max_row_id(&self) -> Option<RowId> {
        let observed = self.observations.success().iter().chain(self.observations.failure()).map(|r| r.row_id);
        self.suggestions.row_ids().chain(self.forgotten.iter()).chain(observed).max()
    }

    pub(crate) fn issue(&mut self, suggestion: Suggestion) {
        self.suggestions.insert(suggestion);
    }

    /// Move an outstanding row into an observation ledger
    pub(crate) fn resolve(&mut self, record: ObservationRecord) -> Option<LedgerKind> {
        self.suggestions.remove(record.row_id)?;
        Some(self.observations.push(record))
    }

    /// Record a trial that was never issued as a suggestion
    pub(crate) fn record_external(&mut self, record: ObservationRecord) -> LedgerKind {
        self.observations.push(record)
    }

    /// Move an outstanding row into the forgotten set
    pub(crate) fn forget(&mut self, row_id: RowId) -> bool {
        self.suggestions.remove(row_id).is_some() && self.forgotten.insert(row_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn suggestion(id: i64) -> Suggestion {
        Suggestion { row_id: RowId::new(id), values: BTreeMap::from([("x".to_string(), 1.0)]) }
    }

    fn record(id: i64, is_failure: bool) -> ObservationRecord {
        ObservationRecord {
            row_id: RowId::new(id),
            input: BTreeMap::from([("x".to_string(), 1.0)]),
            output: 0.5,
            cost: 1.0,
            is_failure,
        }
    }

    #[test]
    fn test_partition_moves_conserve_total() {
        let mut ledgers = Ledgers::default();
        for id in 1..=4 {
            ledgers.issue(suggestion(id));
        }
        assert_eq!(ledgers.counts().total(), 4);

        assert_eq!(ledgers.resolve(record(1, false)), Some(LedgerKind::Success));
        assert_eq!(ledgers.resolve(record(2, true)), Some(LedgerKind::Failure));
        assert!(ledgers.forget(RowId::new(3)));

        let counts = ledgers.counts();
        assert_eq!(counts, LedgerCounts { outstanding: 1, success: 1, failure: 1, forgotten: 1 });
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_moves_from_non_outstanding_rows_are_refused() {
        let mut ledgers = Ledgers::default();
        ledgers.issue(suggestion(1));
        assert!(ledgers.forget(RowId::new(1)));
        assert!(!ledgers.forget(RowId::new(1)));
        assert_eq!(ledgers.resolve(record(1, false)), None);
        assert_eq!(ledgers.partition_of(RowId::new(1)), Some(Partition::Forgotten));
        assert_eq!(ledgers.counts().success, 0);
    }

    #[test]
    fn test_max_row_id_spans_partitions() {
        let mut ledgers = Ledgers::default();
        assert_eq!(ledgers.max_row_id(), None);
        ledgers.issue(suggestion(2));
        ledgers.record_external(record(7, false));
        assert!(ledgers.forget(RowId::new(2)));
        assert_eq!(ledgers.max_row_id(), Some(RowId::new(7)));
    }
}
