//! In-memory trial store for testing and throwaway sessions

use std::collections::BTreeMap;

use crate::error::{Result, TuneError};
use crate::ledger::RowId;
use crate::param::ParamSchema;

use super::traits::TrialStore;
use super::types::{StoredTrial, TrialStatus, TrialWrite};

/// Non-durable store with the same commit semantics as the SQLite backend
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    schema: Option<Vec<ParamSchema>>,
    trials: BTreeMap<RowId, StoredTrial>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn get(&self, row_id: RowId) -> Option<&StoredTrial> {
        self.trials.get(&row_id)
    }
}

fn next_resolution_seq(trials: &BTreeMap<RowId, StoredTrial>) -> i64 {
    trials.values().filter_map(|t| t.resolution_seq).max().unwrap_or(0) + 1
}

fn apply(trials: &mut BTreeMap<RowId, StoredTrial>, write: &TrialWrite) -> Result<()> {
    match write {
        TrialWrite::Insert(trial) => {
            if trials.contains_key(&trial.row_id) {
                return Err(TuneError::Persistence(format!("Row {} already exists", trial.row_id)));
            }
            let mut trial = trial.clone();
            trial.resolution_seq = trial.status.is_resolved().then(|| next_resolution_seq(trials));
            trials.insert(trial.row_id, trial);
        }
        TrialWrite::Resolve { row_id, status, input, output, cost } => {
            let seq = next_resolution_seq(trials);
            let trial = outstanding_mut(trials, *row_id)?;
            trial.resolution_seq = Some(seq);
            trial.status = *status;
            trial.input = input.clone();
            trial.output = Some(*output);
            trial.cost = Some(*cost);
        }
        TrialWrite::Forget { row_id } => {
            outstanding_mut(trials, *row_id)?.status = TrialStatus::Forgotten;
        }
    }
    Ok(())
}

fn outstanding_mut(
    trials: &mut BTreeMap<RowId, StoredTrial>,
    row_id: RowId,
) -> Result<&mut StoredTrial> {
    match trials.get_mut(&row_id) {
        Some(trial) if trial.status == TrialStatus::Outstanding => Ok(trial),
        Some(trial) => Err(TuneError::Persistence(format!(
            "Row {row_id} is {}, not outstanding",
            trial.status
        ))),
        None => Err(TuneError::Persistence(format!("Row {row_id} is not stored"))),
    }
}

impl TrialStore for InMemoryStore {
    fn load_schema(&self) -> Result<Option<Vec<ParamSchema>>> {
        Ok(self.schema.clone())
    }

    fn save_schema(&mut self, schema: &[ParamSchema]) -> Result<()> {
        self.schema = Some(schema.to_vec());
        Ok(())
    }

    fn next_row_id(&self) -> Result<RowId> {
        Ok(RowId::new(self.trials.keys().next_back().map_or(1, |id| id.get() + 1)))
    }

    fn commit(&mut self, writes: &[TrialWrite]) -> Result<()> {
        let mut staged = self.trials.clone();
        for write in writes {
            apply(&mut staged, write)?;
        }
        self.trials = staged;
        Ok(())
    }

    fn scan(&self) -> Result<Vec<StoredTrial>> {
        Ok(self.trials.values().cloned().collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.schema = None;
        self.trials.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outstanding(id: i64) -> StoredTrial {
        StoredTrial {
            row_id: RowId::new(id),
            input: BTreeMap::from([("x".to_string(), 0.1)]),
            status: TrialStatus::Outstanding,
            output: None,
            cost: None,
            resolution_seq: None,
        }
    }

    fn resolve(id: i64) -> TrialWrite {
        TrialWrite::Resolve {
            row_id: RowId::new(id),
            status: TrialStatus::Success,
            input: BTreeMap::new(),
            output: 1.0,
            cost: 1.0,
        }
    }

    #[test]
    fn test_resolution_seq_follows_commit_order() {
        let mut store = InMemoryStore::new();
        store.insert_outstanding(outstanding(1)).unwrap();
        store.insert_outstanding(outstanding(2)).unwrap();
        store.commit(&[resolve(2), resolve(1)]).unwrap();
        assert_eq!(store.get(RowId::new(2)).unwrap().resolution_seq, Some(1));
        assert_eq!(store.get(RowId::new(1)).unwrap().resolution_seq, Some(2));
    }

    #[test]
    fn test_next_row_id_follows_max() {
        let mut store = InMemoryStore::new();
        assert_eq!(store.next_row_id().unwrap(), RowId::new(1));
        store.insert_outstanding(outstanding(5)).unwrap();
        assert_eq!(store.next_row_id().unwrap(), RowId::new(6));
        store.forget(RowId::new(5)).unwrap();
        assert_eq!(store.next_row_id().unwrap(), RowId::new(6));
    }

    #[test]
    fn test_commit_is_all_or_nothing() {
        let mut store = InMemoryStore::new();
        store.insert_outstanding(outstanding(1)).unwrap();

        let writes = vec![
            TrialWrite::Forget { row_id: RowId::new(1) },
            TrialWrite::Forget { row_id: RowId::new(2) },
        ];
        assert!(store.commit(&writes).is_err());
        assert_eq!(store.get(RowId::new(1)).unwrap().status, TrialStatus::Outstanding);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut store = InMemoryStore::new();
        store.insert_outstanding(outstanding(1)).unwrap();
        assert!(matches!(store.insert_outstanding(outstanding(1)), Err(TuneError::Persistence(_))));
    }

    #[test]
    fn test_resolve_requires_outstanding() {
        let mut store = InMemoryStore::new();
        store.insert_outstanding(outstanding(1)).unwrap();
        store.forget(RowId::new(1)).unwrap();
        assert!(store.commit(&[resolve(1)]).is_err());
    }

    #[test]
    fn test_clear() {
        let mut store = InMemoryStore::new();
        store.save_schema(&[]).unwrap();
        store.insert_outstanding(outstanding(1)).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(store.load_schema().unwrap().is_none());
    }
}
