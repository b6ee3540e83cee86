//! Suggestion engine
//!
//! Orchestrates the suggest → observe / forget lifecycle over a
//! [`TrialStore`](crate::store::TrialStore). Row ids are allocated by the
//! store, every state change reaches the store before (or, in batched mode,
//! together with) the matching change in memory, and reopening a store
//! rebuilds the same ledgers.
//!
//! # Toyota Way: 自働化 (Jidoka)
//!
//! A lifecycle call that cannot persist stops and reports instead of letting
//! memory and store drift apart.
//!
//! # Example
//!
//! ```
//! use afinar::{LinearSpace, LogSpace, Observation, Parameter, SuggestionEngine, TunerConfig};
//!
//! let dir = tempfile::tempdir()?;
//! let params = vec![
//!     Parameter::new("lr", LogSpace::new(1.0), 1e-3)?,
//!     Parameter::new("warmup", LinearSpace::new(100.0).integer(), 500.0)?,
//! ];
//! let mut engine = SuggestionEngine::load_from_store(TunerConfig::default(), params, dir.path().join("trials.db"))?;
//!
//! let suggestion = engine.suggest()?;
//! engine.observe(Observation::for_suggestion(&suggestion, 0.87, 1.5))?;
//! assert_eq!(engine.success_observations().len(), 1);
//! engine.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod flush;
mod lifecycle;
mod reload;
mod state;


pub use builder::EngineBuilder;
pub use flush::{policy_for, Batched, FlushPolicy, WriteThrough};
pub use state::SuggestionEngine;
