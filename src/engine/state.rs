//! Engine state, accessors and shutdown

use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::TunerConfig;
use crate::error::Result;
use crate::ledger::{ForgottenSet, LedgerCounts, Ledgers, ObservationRecord, SuggestionLedger};
use crate::param::Parameter;
use crate::proposal::{pareto_front_indices, CandidateProposer};
use crate::store::{SqliteStore, TrialStore, TrialWrite};
use crate::telemetry::TelemetrySink;

use super::builder::EngineBuilder;
use super::flush::FlushPolicy;

/// Cost-aware suggestion engine over a durable trial store
///
/// The engine is the only writer of its store and the single mutator of its
/// ledgers; every lifecycle method takes `&mut self`. Wrap it in a mutex to
/// share it between threads.
pub struct SuggestionEngine<S: TrialStore = SqliteStore> {
    pub(super) config: TunerConfig,
    pub(super) params: Vec<Parameter>,
    /// Normalized search center, one coordinate per parameter
    pub(super) centers: Vec<f64>,
    pub(super) store: S,
    pub(super) proposer: Box<dyn CandidateProposer>,
    pub(super) telemetry: Box<dyn TelemetrySink>,
    pub(super) flush_policy: Box<dyn FlushPolicy>,
    pub(super) ledgers: Ledgers,
    /// Resolutions applied in memory but not yet committed
    pub(super) pending: Vec<TrialWrite>,
    pub(super) closed: bool,
}

impl SuggestionEngine<SqliteStore> {
    /// Open (or create) the SQLite store at `path` and rebuild the ledgers from it
    ///
    /// An empty or missing store yields an engine with empty ledgers. A store
    /// created with different parameters fails with `ConfigMismatch`.
    pub fn load_from_store<P: AsRef<Path>>(
        config: TunerConfig,
        params: Vec<Parameter>,
        path: P,
    ) -> Result<Self> {
        EngineBuilder::new(config, params).open(path)
    }
}

impl<S: TrialStore> SuggestionEngine<S> {
    /// Build an engine over an already opened store, with default strategies
    pub fn with_store(config: TunerConfig, params: Vec<Parameter>, store: S) -> Result<Self> {
        EngineBuilder::new(config, params).build(store)
    }

    pub fn outstanding_suggestions(&self) -> &SuggestionLedger {
        self.ledgers.suggestions()
    }

    /// Successful observations in resolution order
    pub fn success_observations(&self) -> &[ObservationRecord] {
        self.ledgers.observations().success()
    }

    /// Failed observations in resolution order
    pub fn failure_observations(&self) -> &[ObservationRecord] {
        self.ledgers.observations().failure()
    }

    pub fn forgotten_rows(&self) -> &ForgottenSet {
        self.ledgers.forgotten()
    }

    pub fn counts(&self) -> LedgerCounts {
        self.ledgers.counts()
    }

    pub fn ledgers(&self) -> &Ledgers {
        &self.ledgers
    }

    /// Resolutions not yet committed to the store
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    /// Successes not dominated in (lower cost, better output)
    pub fn pareto_front(&self) -> Vec<&ObservationRecord> {
        let successes = self.success_observations();
        let pairs: Vec<(f64, f64)> = successes.iter().map(|r| (r.cost, r.output)).collect();
        pareto_front_indices(&pairs, self.config.better_direction)
            .into_iter()
            .map(|i| &successes[i])
            .collect()
    }

    /// Success with the best output; ties go to the cheaper trial
    pub fn best_observation(&self) -> Option<&ObservationRecord> {
        let direction = self.config.better_direction;
        self.success_observations().iter().min_by(|a, b| {
            if direction.is_better(a.output, b.output) {
                Ordering::Less
            } else if direction.is_better(b.output, a.output) {
                Ordering::Greater
            } else {
                a.cost.total_cmp(&b.cost)
            }
        })
    }

    /// Commit every queued resolution in one transaction
    ///
    /// Returns the number of writes committed. On failure the queue is kept
    /// and the call can be retried.
    pub fn flush(&mut self) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        self.store.commit(&self.pending)?;
        let committed = self.pending.len();
        self.pending.clear();
        debug!(writes = committed, "flushed pending resolutions");
        Ok(committed)
    }

    /// Flush pending resolutions and release the telemetry sink
    pub fn close(mut self) -> Result<()> {
        let flushed = self.flush();
        self.telemetry.close();
        self.closed = true;
        flushed.map(|_| ())
    }

    /// Queue a write and commit the queue if forced or the policy says so
    ///
    /// Returns whether the write is committed. On commit failure the write is
    /// removed again, so the caller can leave memory untouched.
    pub(super) fn persist(&mut self, write: TrialWrite, force: bool) -> Result<bool> {
        self.pending.push(write);
        if !force && !self.flush_policy.should_flush(self.pending.len()) {
            return Ok(false);
        }
        if let Err(e) = self.store.commit(&self.pending) {
            self.pending.pop();
            return Err(e);
        }
        self.pending.clear();
        Ok(true)
    }
}

impl<S: TrialStore> Drop for SuggestionEngine<S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.flush() {
            warn!(error = %e, pending = self.pending.len(), "dropping engine with unflushed resolutions");
        }
        self.telemetry.close();
    }
}
