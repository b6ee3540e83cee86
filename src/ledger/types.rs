//! Suggestion and observation records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, TuneError};

/// Bookkeeping key carrying the row id inside an input mapping
pub const ROW_ID_KEY: &str = "row_id";

/// Store-issued identifier tying a suggestion to its resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(i64);

impl RowId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Recover a row id carried as a float inside an input mapping
    pub fn from_input_value(value: f64) -> Result<Self> {
        if value.is_finite() && value.fract() == 0.0 && value >= 1.0 && value < i64::MAX as f64 {
            Ok(Self(value as i64))
        } else {
            Err(TuneError::domain(ROW_ID_KEY, value, "row id must be a positive integer"))
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outstanding candidate handed to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub row_id: RowId,
    /// Raw value for every declared parameter
    pub values: BTreeMap<String, f64>,
}

impl Suggestion {
    /// Parameter values plus the `row_id` key, ready to pass back as an observation input
    pub fn to_input(&self) -> BTreeMap<String, f64> {
        let mut input = self.values.clone();
        input.insert(ROW_ID_KEY.to_string(), self.row_id.get() as f64);
        input
    }
}

/// Outcome reported by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Target row; when absent, `input[ROW_ID_KEY]` is consulted
    #[serde(default)]
    pub row_id: Option<RowId>,
    pub input: BTreeMap<String, f64>,
    pub output: f64,
    pub cost: f64,
    #[serde(default)]
    pub is_failure: bool,
}

impl Observation {
    pub fn new(input: BTreeMap<String, f64>, output: f64, cost: f64) -> Self {
        Self { row_id: None, input, output, cost, is_failure: false }
    }

    /// Successful outcome for a suggestion, carrying its row id
    pub fn for_suggestion(suggestion: &Suggestion, output: f64, cost: f64) -> Self {
        Self {
            row_id: Some(suggestion.row_id),
            input: suggestion.values.clone(),
            output,
            cost,
            is_failure: false,
        }
    }

    /// Mark the trial as failed
    pub fn failed(mut self) -> Self {
        self.is_failure = true;
        self
    }

    pub fn with_row_id(mut self, row_id: RowId) -> Self {
        self.row_id = Some(row_id);
        self
    }

    /// Explicit target, from the field or the bookkeeping key
    pub fn target_row_id(&self) -> Result<Option<RowId>> {
        if let Some(id) = self.row_id {
            return Ok(Some(id));
        }
        self.input.get(ROW_ID_KEY).map(|v| RowId::from_input_value(*v)).transpose()
    }

    pub(crate) fn validate_outcome(&self) -> Result<()> {
        if !(self.cost.is_finite() && self.cost >= 0.0) {
            return Err(TuneError::invalid_config(
                "cost",
                format!("cost must be finite and non-negative, got {}", self.cost),
            ));
        }
        if !self.is_failure && !self.output.is_finite() {
            return Err(TuneError::invalid_config(
                "output",
                format!("successful observation needs a finite output, got {}", self.output),
            ));
        }
        Ok(())
    }
}

/// Which observation ledger a resolution landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Success,
    Failure,
}

impl LedgerKind {
    pub fn of(is_failure: bool) -> Self {
        if is_failure {
            LedgerKind::Failure
        } else {
            LedgerKind::Success
        }
    }
}

/// Immutable resolved trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub row_id: RowId,
    /// Parameter values plus any extra bookkeeping keys
    pub input: BTreeMap<String, f64>,
    pub output: f64,
    pub cost: f64,
    pub is_failure: bool,
}

impl ObservationRecord {
    pub fn ledger(&self) -> LedgerKind {
        LedgerKind::of(self.is_failure)
    }
}

/// Summary returned by `observe()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationResult {
    pub row_id: RowId,
    pub ledger: LedgerKind,
    /// Whether the resolution is already committed to the store
    pub persisted: bool,
}
