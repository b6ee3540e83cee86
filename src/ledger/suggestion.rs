//! Outstanding-suggestion ledger

use std::collections::BTreeMap;

use crate::param::Parameter;

use super::types::{RowId, Suggestion};

/// Row id -> suggestion not yet resolved or forgotten, ordered by issue
#[derive(Debug, Clone, Default)]
pub struct SuggestionLedger {
    outstanding: BTreeMap<RowId, Suggestion>,
}

impl SuggestionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }

    pub fn contains(&self, row_id: RowId) -> bool {
        self.outstanding.contains_key(&row_id)
    }

    pub fn get(&self, row_id: RowId) -> Option<&Suggestion> {
        self.outstanding.get(&row_id)
    }

    /// Iterate in issue order
    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.outstanding.values()
    }

    pub fn row_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.outstanding.keys().copied()
    }

    pub(crate) fn insert(&mut self, suggestion: Suggestion) {
        self.outstanding.insert(suggestion.row_id, suggestion);
    }

    pub(crate) fn remove(&mut self, row_id: RowId) -> Option<Suggestion> {
        self.outstanding.remove(&row_id)
    }

    /// Most recently issued suggestion whose declared values equal `input`
    pub fn find_by_values(&self, params: &[Parameter], input: &BTreeMap<String, f64>) -> Option<RowId> {
        self.outstanding
            .values()
            .rev()
            .find(|s| {
                params.iter().all(|p| match (s.values.get(&p.name), input.get(&p.name)) {
                    (Some(a), Some(b)) => values_match(*a, *b),
                    _ => false,
                })
            })
            .map(|s| s.row_id)
    }
}

fn values_match(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::LinearSpace;

    fn suggestion(id: i64, x: f64) -> Suggestion {
        Suggestion { row_id: RowId::new(id), values: BTreeMap::from([("x".to_string(), x)]) }
    }

    #[test]
    fn test_insert_remove() {
        let mut ledger = SuggestionLedger::new();
        ledger.insert(suggestion(1, 0.5));
        ledger.insert(suggestion(2, 0.7));
        assert_eq!(ledger.len(), 2);
        assert!(ledger.remove(RowId::new(1)).is_some());
        assert!(ledger.remove(RowId::new(1)).is_none());
        assert_eq!(ledger.row_ids().collect::<Vec<_>>(), vec![RowId::new(2)]);
    }

    #[test]
    fn test_find_by_values_prefers_most_recent() {
        let params = vec![Parameter::new("x", LinearSpace::new(1.0), 0.0).unwrap()];
        let mut ledger = SuggestionLedger::new();
        ledger.insert(suggestion(1, 0.5));
        ledger.insert(suggestion(2, 0.5));
        ledger.insert(suggestion(3, 0.9));

        let input = BTreeMap::from([("x".to_string(), 0.5), ("extra".to_string(), 1.0)]);
        assert_eq!(ledger.find_by_values(&params, &input), Some(RowId::new(2)));

        let input = BTreeMap::from([("x".to_string(), 0.6)]);
        assert_eq!(ledger.find_by_values(&params, &input), None);
    }
}
