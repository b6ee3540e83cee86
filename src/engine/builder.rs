//! Engine construction with injectable strategies

use std::path::Path;
use tracing::info;

use crate::config::TunerConfig;
use crate::error::{Result, TuneError};
use crate::param::{schema_mismatch, validate_params, ParamSchema, Parameter};
use crate::proposal::{CandidateProposer, GaussianProposer};
use crate::store::{SqliteStore, TrialStore};
use crate::telemetry::{JsonlTelemetry, NoopTelemetry, TelemetrySink, TracingTelemetry};

use super::flush::{policy_for, FlushPolicy};
use super::reload::replay;
use super::state::SuggestionEngine;

/// Builder for [`SuggestionEngine`]
///
/// Strategies left unset are derived from the configuration: a
/// [`GaussianProposer`] seeded from `seed`, telemetry from
/// `external_logging_enabled` / `telemetry_path`, and write-through or batched
/// persistence from `persist_every_observation`.
///
/// # Example
///
/// ```
/// use afinar::engine::{Batched, EngineBuilder};
/// use afinar::store::InMemoryStore;
/// use afinar::{LinearSpace, Parameter, TunerConfig};
///
/// let params = vec![Parameter::new("momentum", LinearSpace::new(0.1), 0.9)?];
/// let mut engine = EngineBuilder::new(TunerConfig::default(), params)
///     .flush_policy(Batched::new(8))
///     .build(InMemoryStore::new())?;
/// let suggestion = engine.suggest()?;
/// assert!(suggestion.values.contains_key("momentum"));
/// # Ok::<(), afinar::TuneError>(())
/// ```
pub struct EngineBuilder {
    config: TunerConfig,
    params: Vec<Parameter>,
    proposer: Option<Box<dyn CandidateProposer>>,
    telemetry: Option<Box<dyn TelemetrySink>>,
    flush_policy: Option<Box<dyn FlushPolicy>>,
}

impl EngineBuilder {
    pub fn new(config: TunerConfig, params: Vec<Parameter>) -> Self {
        Self { config, params, proposer: None, telemetry: None, flush_policy: None }
    }

    /// Replace the default proposer
    pub fn proposer(mut self, proposer: impl CandidateProposer + 'static) -> Self {
        self.proposer = Some(Box::new(proposer));
        self
    }

    /// Replace the telemetry sink chosen from the configuration
    pub fn telemetry(mut self, telemetry: impl TelemetrySink + 'static) -> Self {
        self.telemetry = Some(Box::new(telemetry));
        self
    }

    /// Replace the flush policy chosen from the configuration
    pub fn flush_policy(mut self, policy: impl FlushPolicy + 'static) -> Self {
        self.flush_policy = Some(Box::new(policy));
        self
    }

    /// Open the SQLite store at `path` and build over it
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<SuggestionEngine<SqliteStore>> {
        self.validate()?;
        let store = SqliteStore::open(path)?;
        self.build(store)
    }

    /// Check the declarations, reconcile them with the store and replay it
    pub fn build<S: TrialStore>(self, mut store: S) -> Result<SuggestionEngine<S>> {
        self.validate()?;
        let centers = self
            .params
            .iter()
            .map(Parameter::normalized_center)
            .collect::<Result<Vec<_>>>()?;

        let telemetry = match self.telemetry {
            Some(telemetry) => telemetry,
            None => default_telemetry(&self.config)?,
        };
        let proposer = self
            .proposer
            .unwrap_or_else(|| Box::new(GaussianProposer::from_config(&self.config)));
        let flush_policy = self.flush_policy.unwrap_or_else(|| policy_for(&self.config));

        if !self.config.resume {
            store.clear()?;
            info!("resume disabled; cleared trial store");
        }

        let declared: Vec<ParamSchema> = self.params.iter().map(Parameter::schema).collect();
        let trials = store.scan()?;
        match store.load_schema()? {
            Some(stored) => {
                if let Some(diff) = schema_mismatch(&stored, &declared) {
                    return Err(TuneError::ConfigMismatch(diff));
                }
            }
            None if !trials.is_empty() => {
                return Err(TuneError::ConfigMismatch(format!(
                    "store holds {} rows but no parameter schema",
                    trials.len()
                )));
            }
            None => store.save_schema(&declared)?,
        }

        let ledgers = replay(&self.params, &trials)?;
        let counts = ledgers.counts();
        info!(
            outstanding = counts.outstanding,
            success = counts.success,
            failure = counts.failure,
            forgotten = counts.forgotten,
            "loaded suggestion engine"
        );

        Ok(SuggestionEngine {
            config: self.config,
            params: self.params,
            centers,
            store,
            proposer,
            telemetry,
            flush_policy,
            ledgers,
            pending: Vec::new(),
            closed: false,
        })
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        validate_params(&self.params)
    }
}

fn default_telemetry(config: &TunerConfig) -> Result<Box<dyn TelemetrySink>> {
    if !config.external_logging_enabled {
        return Ok(Box::new(NoopTelemetry));
    }
    Ok(match &config.telemetry_path {
        Some(path) => Box::new(JsonlTelemetry::create(path)?),
        None => Box::new(TracingTelemetry),
    })
}
