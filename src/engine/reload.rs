//! Rebuilding ledgers from stored rows

use crate::error::{Result, TuneError};
use crate::ledger::{Ledgers, ObservationRecord, Suggestion};
use crate::param::Parameter;
use crate::store::{StoredTrial, TrialStatus};

/// Replay a full store scan into the four partitions
///
/// Outstanding rows keep their issue (row id) order. Resolved rows are
/// appended in the order the store resolved them, so the observation ledgers
/// match those of an engine that never restarted.
pub(crate) fn replay(params: &[Parameter], trials: &[StoredTrial]) -> Result<Ledgers> {
    let mut ledgers = Ledgers::default();
    let mut resolved = Vec::new();

    for trial in trials {
        check_stored_input(params, trial)?;
        match trial.status {
            TrialStatus::Outstanding => {
                ledgers.issue(Suggestion { row_id: trial.row_id, values: trial.input.clone() });
            }
            TrialStatus::Forgotten => {
                ledgers.forgotten.insert(trial.row_id);
            }
            TrialStatus::Success | TrialStatus::Failure => resolved.push(trial),
        }
    }

    // rows without a sequence predate it; keep them last, by row id
    resolved.sort_by_key(|t| (t.resolution_seq.unwrap_or(i64::MAX), t.row_id));
    for trial in resolved {
        ledgers.record_external(record_of(trial)?);
    }

    Ok(ledgers)
}

fn check_stored_input(params: &[Parameter], trial: &StoredTrial) -> Result<()> {
    for param in params {
        let raw = trial.input.get(&param.name).ok_or_else(|| {
            TuneError::ConfigMismatch(format!("row {} has no value for '{}'", trial.row_id, param.name))
        })?;
        param.space.to_normalized(*raw).map_err(|e| {
            TuneError::ConfigMismatch(format!("row {} value of '{}': {e}", trial.row_id, param.name))
        })?;
    }
    Ok(())
}

fn record_of(trial: &StoredTrial) -> Result<ObservationRecord> {
    let is_failure = trial.status == TrialStatus::Failure;
    let cost = trial
        .cost
        .ok_or_else(|| TuneError::Persistence(format!("Resolved row {} has no cost", trial.row_id)))?;
    let output = match trial.output {
        Some(output) => output,
        None if is_failure => f64::NAN,
        None => {
            return Err(TuneError::Persistence(format!(
                "Successful row {} has no output",
                trial.row_id
            )))
        }
    };
    Ok(ObservationRecord { row_id: trial.row_id, input: trial.input.clone(), output, cost, is_failure })
}
