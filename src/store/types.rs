//! Stored row types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::TuneError;
use crate::ledger::{ObservationRecord, RowId, Suggestion};

/// Lifecycle status of a stored row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    Outstanding,
    Success,
    Failure,
    Forgotten,
}

impl TrialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialStatus::Outstanding => "outstanding",
            TrialStatus::Success => "success",
            TrialStatus::Failure => "failure",
            TrialStatus::Forgotten => "forgotten",
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, TrialStatus::Success | TrialStatus::Failure)
    }
}

impl std::fmt::Display for TrialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrialStatus {
    type Err = TuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outstanding" => Ok(TrialStatus::Outstanding),
            "success" => Ok(TrialStatus::Success),
            "failure" => Ok(TrialStatus::Failure),
            "forgotten" => Ok(TrialStatus::Forgotten),
            other => Err(TuneError::Persistence(format!("Unknown trial status '{other}'"))),
        }
    }
}

/// One durable row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTrial {
    pub row_id: RowId,
    pub input: BTreeMap<String, f64>,
    pub status: TrialStatus,
    pub output: Option<f64>,
    pub cost: Option<f64>,
    /// Position in resolution order, assigned by the store
    pub resolution_seq: Option<i64>,
}

impl StoredTrial {
    pub fn outstanding(suggestion: &Suggestion) -> Self {
        Self {
            row_id: suggestion.row_id,
            input: suggestion.values.clone(),
            status: TrialStatus::Outstanding,
            output: None,
            cost: None,
            resolution_seq: None,
        }
    }

    pub fn resolved(record: &ObservationRecord) -> Self {
        Self {
            row_id: record.row_id,
            input: record.input.clone(),
            status: status_of(record.is_failure),
            output: Some(record.output),
            cost: Some(record.cost),
            resolution_seq: None,
        }
    }
}

/// A single mutation; `TrialStore::commit` applies a slice of these atomically
#[derive(Debug, Clone, PartialEq)]
pub enum TrialWrite {
    /// New row, outstanding or already resolved
    Insert(StoredTrial),
    /// Outstanding -> success/failure, replacing the stored input
    Resolve {
        row_id: RowId,
        status: TrialStatus,
        input: BTreeMap<String, f64>,
        output: f64,
        cost: f64,
    },
    /// Outstanding -> forgotten
    Forget { row_id: RowId },
}

impl TrialWrite {
    pub fn resolve(record: &ObservationRecord) -> Self {
        TrialWrite::Resolve {
            row_id: record.row_id,
            status: status_of(record.is_failure),
            input: record.input.clone(),
            output: record.output,
            cost: record.cost,
        }
    }

    pub fn row_id(&self) -> RowId {
        match self {
            TrialWrite::Insert(trial) => trial.row_id,
            TrialWrite::Resolve { row_id, .. } | TrialWrite::Forget { row_id } => *row_id,
        }
    }
}

fn status_of(is_failure: bool) -> TrialStatus {
    if is_failure {
        TrialStatus::Failure
    } else {
        TrialStatus::Success
    }
}
