//! # afinar: cost-aware hyperparameter suggestions
//!
//! Declare tunable parameters with their search spaces, ask the engine for
//! candidate values, run the trial, and report the outcome and its cost. Every
//! suggestion and observation is persisted, so an engine reopened on the same
//! store continues exactly where the previous process stopped.
//!
//! ## Architecture
//!
//! - `space`: raw ↔ normalized transforms (linear, log, logit)
//! - `param`: parameter declarations and stored schema fingerprints
//! - `ledger`: outstanding suggestions, success/failure observations, forgotten rows
//! - `store`: durable row storage (SQLite, in-memory)
//! - `proposal`: pluggable candidate proposers and the cost/output Pareto front
//! - `telemetry`: lifecycle event sinks
//! - `engine`: the suggest / observe / forget orchestrator
//!
//! ## Example
//!
//! ```
//! use afinar::{LinearSpace, LogSpace, LogitSpace, Observation, Parameter, SuggestionEngine, TunerConfig};
//!
//! let dir = tempfile::tempdir()?;
//! let params = vec![
//!     Parameter::new("learning_rate", LogSpace::new(1.0), 1e-3)?,
//!     Parameter::new("batch_size", LinearSpace::new(32.0).with_bounds(8.0, 512.0).integer(), 64.0)?,
//!     Parameter::new("dropout", LogitSpace::new(1.0), 0.1)?,
//! ];
//! let path = dir.path().join("trials.db");
//! let mut engine = SuggestionEngine::load_from_store(TunerConfig::default(), params.clone(), &path)?;
//!
//! let suggestion = engine.suggest()?;
//! engine.observe(Observation::for_suggestion(&suggestion, 0.91, 12.5))?;
//! engine.close()?;
//!
//! let engine = SuggestionEngine::load_from_store(TunerConfig::default(), params, &path)?;
//! assert_eq!(engine.success_observations().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod param;
pub mod proposal;
pub mod space;
pub mod store;
pub mod telemetry;

pub use config::{BetterDirection, TunerConfig};
pub use engine::{EngineBuilder, SuggestionEngine};
pub use error::{Result, TuneError};
pub use ledger::{
    LedgerCounts, LedgerKind, Observation, ObservationRecord, ObservationResult, RowId, Suggestion,
};
pub use param::Parameter;
pub use space::{LinearSpace, LogSpace, LogitSpace, ParameterSpace};
