//! suggest / observe / forget

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::error::{Result, TuneError};
use crate::ledger::{
    Observation, ObservationRecord, ObservationResult, RowId, Suggestion, ROW_ID_KEY,
};
use crate::proposal::{NormalizedObservation, ProposalContext};
use crate::store::{StoredTrial, TrialStore, TrialWrite};

use super::state::SuggestionEngine;

impl<S: TrialStore> SuggestionEngine<S> {
    /// Issue one new outstanding suggestion
    ///
    /// The row is committed to the store before it is registered in memory;
    /// if the commit fails nothing is registered.
    pub fn suggest(&mut self) -> Result<Suggestion> {
        let row_id = self.fresh_row_id()?;

        let successes = self.normalized_history(self.ledgers.observations().success())?;
        let failures = self.normalized_history(self.ledgers.observations().failure())?;
        let outstanding = self
            .ledgers
            .suggestions()
            .iter()
            .map(|s| self.normalize(&s.values))
            .collect::<Result<Vec<_>>>()?;

        let ctx = ProposalContext {
            row_id,
            search_center: &self.centers,
            successes: &successes,
            failures: &failures,
            outstanding: &outstanding,
            better_direction: self.config.better_direction,
        };
        let point = self.proposer.propose(&ctx)?;
        if point.len() != self.params.len() {
            return Err(TuneError::Proposal(format!(
                "proposer returned {} coordinates for {} parameters",
                point.len(),
                self.params.len()
            )));
        }

        let mut values = BTreeMap::new();
        for (param, coordinate) in self.params.iter().zip(&point) {
            values.insert(param.name.clone(), param.space.to_raw(*coordinate)?);
        }
        let suggestion = Suggestion { row_id, values };

        self.store.insert_outstanding(StoredTrial::outstanding(&suggestion))?;
        self.ledgers.issue(suggestion.clone());
        self.telemetry.suggestion_issued(&suggestion);
        debug!(row_id = %row_id, "suggestion issued");
        Ok(suggestion)
    }

    /// Resolve an outstanding suggestion with the outcome of its trial
    ///
    /// The target is `observation.row_id`, else the `row_id` key of the
    /// input, else (when `match_observations_by_value` is on) the most recent
    /// outstanding suggestion with equal parameter values. An observation
    /// matching nothing is recorded as an unsolicited trial under a fresh row
    /// id. The recorded input always carries the row id under `row_id`.
    pub fn observe(&mut self, observation: Observation) -> Result<ObservationResult> {
        observation.validate_outcome()?;
        self.check_input(&observation.input)?;

        let target = match observation.target_row_id()? {
            Some(row_id) => {
                if !self.ledgers.suggestions().contains(row_id) {
                    return Err(TuneError::NotFound(row_id));
                }
                Some(row_id)
            }
            None if self.config.match_observations_by_value => {
                let matched = self.ledgers.suggestions().find_by_values(&self.params, &observation.input);
                if let Some(row_id) = matched {
                    warn!(row_id = %row_id, "observation has no row id; bound to a suggestion by parameter values");
                }
                matched
            }
            None => None,
        };

        match target {
            Some(row_id) => self.resolve(row_id, observation),
            None => self.record_unsolicited(observation),
        }
    }

    /// Cancel an outstanding suggestion without an observation
    ///
    /// Only outstanding rows can be forgotten; resolved, already forgotten and
    /// unknown rows fail with `NotFound` and change nothing.
    pub fn forget_suggestion(&mut self, row_id: RowId) -> Result<()> {
        if !self.ledgers.suggestions().contains(row_id) {
            return Err(TuneError::NotFound(row_id));
        }
        self.store.forget(row_id)?;
        self.ledgers.forget(row_id);
        self.telemetry.suggestion_forgotten(row_id);
        debug!(row_id = %row_id, "suggestion forgotten");
        Ok(())
    }

    fn resolve(&mut self, row_id: RowId, observation: Observation) -> Result<ObservationResult> {
        let record = record_for(row_id, observation);
        let persisted = self.persist(TrialWrite::resolve(&record), false)?;

        self.telemetry.observation_recorded(&record);
        let ledger = self.ledgers.resolve(record).ok_or(TuneError::NotFound(row_id))?;
        debug!(row_id = %row_id, ledger = ?ledger, persisted, "observation recorded");
        Ok(ObservationResult { row_id, ledger, persisted })
    }

    fn record_unsolicited(&mut self, observation: Observation) -> Result<ObservationResult> {
        let row_id = self.fresh_row_id()?;
        let record = record_for(row_id, observation);
        // forced: pending resolutions go out in the same transaction
        self.persist(TrialWrite::Insert(StoredTrial::resolved(&record)), true)?;

        self.telemetry.observation_recorded(&record);
        let ledger = self.ledgers.record_external(record);
        info!(row_id = %row_id, ledger = ?ledger, "recorded observation without a matching suggestion");
        Ok(ObservationResult { row_id, ledger, persisted: true })
    }

    /// Next id from the store, checked against every id already in memory
    fn fresh_row_id(&self) -> Result<RowId> {
        let row_id = self.store.next_row_id()?;
        match self.ledgers.max_row_id() {
            Some(max) if row_id <= max => Err(TuneError::Persistence(format!(
                "store issued row id {row_id} but row {max} is already known"
            ))),
            _ => Ok(row_id),
        }
    }

    /// Reject inputs that lack a declared parameter, hold a value outside its
    /// space, or carry a non-finite bookkeeping value
    fn check_input(&self, input: &BTreeMap<String, f64>) -> Result<()> {
        self.normalize(input)?;
        if let Some((key, value)) = input.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TuneError::invalid_config(
                format!("input.{key}"),
                format!("value must be finite, got {value}"),
            ));
        }
        Ok(())
    }

    fn normalize(&self, input: &BTreeMap<String, f64>) -> Result<Vec<f64>> {
        self.params
            .iter()
            .map(|param| {
                let raw = input
                    .get(&param.name)
                    .ok_or_else(|| TuneError::ParameterNotFound(param.name.clone()))?;
                param.space.to_normalized(*raw)
            })
            .collect()
    }

    fn normalized_history(&self, records: &[ObservationRecord]) -> Result<Vec<NormalizedObservation>> {
        records
            .iter()
            .map(|record| {
                Ok(NormalizedObservation {
                    row_id: record.row_id,
                    point: self.normalize(&record.input)?,
                    output: record.output,
                    cost: record.cost,
                })
            })
            .collect()
    }
}

fn record_for(row_id: RowId, observation: Observation) -> ObservationRecord {
    let mut input = observation.input;
    input.insert(ROW_ID_KEY.to_string(), row_id.get() as f64);
    ObservationRecord {
        row_id,
        input,
        output: observation.output,
        cost: observation.cost,
        is_failure: observation.is_failure,
    }
}
