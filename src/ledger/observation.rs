//! Success / failure observation ledgers

use std::collections::BTreeSet;

use super::types::{LedgerKind, ObservationRecord, RowId};

/// Resolved trials in resolution order, split by outcome
#[derive(Debug, Clone, Default)]
pub struct ObservationLedger {
    success: Vec<ObservationRecord>,
    failure: Vec<ObservationRecord>,
}

impl ObservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self) -> &[ObservationRecord] {
        &self.success
    }

    pub fn failure(&self) -> &[ObservationRecord] {
        &self.failure
    }

    pub fn len(&self) -> usize {
        self.success.len() + self.failure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, row_id: RowId) -> bool {
        self.success.iter().chain(&self.failure).any(|r| r.row_id == row_id)
    }

    /// Append to exactly one ledger
    pub(crate) fn push(&mut self, record: ObservationRecord) -> LedgerKind {
        let kind = record.ledger();
        match kind {
            LedgerKind::Success => self.success.push(record),
            LedgerKind::Failure => self.failure.push(record),
        }
        kind
    }
}

/// Row ids cancelled through `forget_suggestion`
#[derive(Debug, Clone, Default)]
pub struct ForgottenSet {
    rows: BTreeSet<RowId>,
}

impl ForgottenSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, row_id: RowId) -> bool {
        self.rows.contains(&row_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().copied()
    }

    pub(crate) fn insert(&mut self, row_id: RowId) -> bool {
        self.rows.insert(row_id)
    }
}
