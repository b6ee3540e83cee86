//! Reload semantics: an engine reopened on its store matches the live one

use afinar::engine::EngineBuilder;
use afinar::store::SqliteStore;
use afinar::{
    LedgerCounts, LinearSpace, LogSpace, LogitSpace, Observation, Parameter, RowId,
    SuggestionEngine, TuneError, TunerConfig,
};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;

fn params() -> Vec<Parameter> {
    vec![
        Parameter::new("p1", LogSpace::new(1.0), 1e-2).unwrap(),
        Parameter::new("p2", LinearSpace::new(2.0), 0.0).unwrap(),
        Parameter::new("p3", LogitSpace::new(0.5), 0.5).unwrap(),
    ]
}

fn open_with(config: TunerConfig, path: &Path) -> SuggestionEngine<SqliteStore> {
    SuggestionEngine::load_from_store(config, params(), path).unwrap()
}

struct Snapshot {
    counts: LedgerCounts,
    outstanding: Vec<RowId>,
    success: Vec<RowId>,
    failure: Vec<RowId>,
    forgotten: BTreeSet<RowId>,
}

fn snapshot(engine: &SuggestionEngine<SqliteStore>) -> Snapshot {
    Snapshot {
        counts: engine.counts(),
        outstanding: engine.outstanding_suggestions().row_ids().collect(),
        success: engine.success_observations().iter().map(|r| r.row_id).collect(),
        failure: engine.failure_observations().iter().map(|r| r.row_id).collect(),
        forgotten: engine.forgotten_rows().iter().collect(),
    }
}

fn assert_same(live: &Snapshot, reloaded: &Snapshot) {
    assert_eq!(live.counts, reloaded.counts);
    assert_eq!(live.outstanding, reloaded.outstanding);
    assert_eq!(live.success, reloaded.success);
    assert_eq!(live.failure, reloaded.failure);
    assert_eq!(live.forgotten, reloaded.forgotten);
}

#[test]
fn test_empty_store_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("trials.db");
    let mut engine = open_with(TunerConfig::default(), &path);
    assert_eq!(engine.counts(), LedgerCounts::default());
    assert_eq!(engine.suggest().unwrap().row_id, RowId::new(1));
}

#[test]
fn test_reload_matches_live_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trials.db");
    let mut engine = open_with(TunerConfig::default(), &path);

    let s: Vec<_> = (0..6).map(|_| engine.suggest().unwrap()).collect();
    // resolve out of issue order so resolution order differs from row order
    engine.observe(Observation::for_suggestion(&s[3], 0.9, 2.0)).unwrap();
    engine.observe(Observation::for_suggestion(&s[0], 0.4, 1.0)).unwrap();
    engine.observe(Observation::for_suggestion(&s[1], f64::NAN, 0.5).failed()).unwrap();
    engine.forget_suggestion(s[2].row_id).unwrap();

    let live = snapshot(&engine);
    let reloaded = open_with(TunerConfig::default(), &path);
    assert_same(&live, &snapshot(&reloaded));
    assert_eq!(live.success, vec![s[3].row_id, s[0].row_id]);

    let record = &reloaded.success_observations()[0];
    assert_eq!(record.input, engine.success_observations()[0].input);
    assert!(reloaded.failure_observations()[0].output.is_nan());
}

#[test]
fn test_row_ids_continue_after_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trials.db");
    let last = {
        let mut engine = open_with(TunerConfig::default(), &path);
        let a = engine.suggest().unwrap();
        engine.forget_suggestion(a.row_id).unwrap();
        engine.suggest().unwrap().row_id
    };

    let mut engine = open_with(TunerConfig::default(), &path);
    let next = engine.suggest().unwrap().row_id;
    assert!(next > last);
}

#[test]
fn test_reload_with_different_params_is_mismatch() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trials.db");
    {
        let mut engine = open_with(TunerConfig::default(), &path);
        engine.suggest().unwrap();
    }

    let mut renamed = params();
    renamed[1].name = "q2".to_string();
    let result = SuggestionEngine::load_from_store(TunerConfig::default(), renamed, &path);
    assert!(matches!(result, Err(TuneError::ConfigMismatch(_))));

    let mut reordered = params();
    reordered.swap(0, 2);
    let result = SuggestionEngine::load_from_store(TunerConfig::default(), reordered, &path);
    assert!(matches!(result, Err(TuneError::ConfigMismatch(_))));

    let mut rescaled = params();
    rescaled[0] = Parameter::new("p1", LogSpace::new(2.0), 1e-2).unwrap();
    let result = SuggestionEngine::load_from_store(TunerConfig::default(), rescaled, &path);
    assert!(matches!(result, Err(TuneError::ConfigMismatch(_))));

    // the declared parameters still open the store
    assert_eq!(open_with(TunerConfig::default(), &path).counts().outstanding, 1);
}

#[test]
fn test_resume_false_starts_over() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trials.db");
    {
        let mut engine = open_with(TunerConfig::default(), &path);
        engine.suggest().unwrap();
    }

    let mut renamed = params();
    renamed[0].name = "lr".to_string();
    let config = TunerConfig { resume: false, ..Default::default() };
    let engine = SuggestionEngine::load_from_store(config, renamed, &path).unwrap();
    assert_eq!(engine.counts().total(), 0);
}

#[test]
fn test_batched_resolutions_flushed_on_drop() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trials.db");
    let config = TunerConfig { persist_every_observation: false, ..Default::default() };
    let live = {
        let mut engine = open_with(config.clone(), &path);
        for _ in 0..3 {
            let suggestion = engine.suggest().unwrap();
            let result = engine.observe(Observation::for_suggestion(&suggestion, 0.5, 1.0)).unwrap();
            assert!(!result.persisted);
        }
        assert_eq!(engine.pending_writes(), 3);
        snapshot(&engine)
    };

    let reloaded = open_with(config, &path);
    assert_same(&live, &snapshot(&reloaded));
    assert_eq!(reloaded.counts().success, 3);
}

#[test]
fn test_close_flushes_and_writes_telemetry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trials.db");
    let events = dir.path().join("events.jsonl");
    let config = TunerConfig {
        external_logging_enabled: true,
        telemetry_path: Some(events.clone()),
        persist_every_observation: false,
        ..Default::default()
    };

    let mut engine = open_with(config, &path);
    let suggestion = engine.suggest().unwrap();
    engine.observe(Observation::for_suggestion(&suggestion, 0.5, 1.0)).unwrap();
    engine.close().unwrap();

    let lines = std::fs::read_to_string(&events).unwrap();
    let kinds: Vec<String> = lines
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap()["event"].to_string())
        .collect();
    assert_eq!(kinds, vec!["\"suggestion\"", "\"observation\""]);
    assert_eq!(open_with(TunerConfig::default(), &path).counts().success, 1);
}

#[test]
fn test_builder_opens_sqlite_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trials.db");
    let mut engine = EngineBuilder::new(TunerConfig::default(), params()).open(&path).unwrap();
    engine.suggest().unwrap();
    assert_eq!(engine.store().path(), path.to_string_lossy());
}

#[test]
fn test_bounded_integer_spaces_observe_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trials.db");
    let integer_params = || {
        vec![
            Parameter::new("layers", LinearSpace::new(4.0).with_bounds(0.5, 3.5).integer(), 2.0).unwrap(),
            Parameter::new("batch", LogSpace::new(1.0).with_bounds(0.5, 16.0).integer(), 4.0).unwrap(),
        ]
    };
    {
        let mut engine = SuggestionEngine::load_from_store(TunerConfig::default(), integer_params(), &path).unwrap();
        for i in 0..8 {
            let suggestion = engine.suggest().unwrap();
            assert!((1.0..=3.0).contains(&suggestion.values["layers"]));
            assert!((1.0..=16.0).contains(&suggestion.values["batch"]));
            engine.observe(Observation::for_suggestion(&suggestion, i as f64, 1.0)).unwrap();
        }
    }
    let engine = SuggestionEngine::load_from_store(TunerConfig::default(), integer_params(), &path).unwrap();
    assert_eq!(engine.counts().success, 8);

    // bounds holding no integer never reach the engine
    assert!(matches!(
        Parameter::new("layers", LinearSpace::new(1.0).with_bounds(0.2, 0.8).integer(), 0.5),
        Err(TuneError::InvalidConfig { .. })
    ));
    assert!(matches!(
        Parameter::new("batch", LogSpace::new(1.0).with_bounds(0.1, 0.9).integer(), 0.5),
        Err(TuneError::InvalidConfig { .. })
    ));
}

#[derive(Debug, Clone)]
enum Step {
    Suggest,
    Succeed(usize),
    Fail(usize),
    Forget(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Suggest),
        2 => (0usize..8).prop_map(Step::Succeed),
        1 => (0usize..8).prop_map(Step::Fail),
        1 => (0usize..8).prop_map(Step::Forget),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_reload_round_trip(steps in prop::collection::vec(step(), 1..25), batched in any::<bool>()) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trials.db");
        let config = TunerConfig { persist_every_observation: !batched, observation_batch_size: 3, ..Default::default() };
        let mut engine = open_with(config.clone(), &path);

        for step in steps {
            let outstanding: Vec<_> = engine.outstanding_suggestions().iter().cloned().collect();
            let pick = |i: usize| outstanding.get(i % outstanding.len().max(1)).cloned();
            match step {
                Step::Suggest => {
                    engine.suggest().unwrap();
                }
                Step::Succeed(i) => {
                    if let Some(s) = pick(i) {
                        engine.observe(Observation::for_suggestion(&s, i as f64, 1.0 + i as f64)).unwrap();
                    }
                }
                Step::Fail(i) => {
                    if let Some(s) = pick(i) {
                        engine.observe(Observation::for_suggestion(&s, 0.0, 0.5).failed()).unwrap();
                    }
                }
                Step::Forget(i) => {
                    if let Some(s) = pick(i) {
                        engine.forget_suggestion(s.row_id).unwrap();
                    }
                }
            }
        }

        engine.flush().unwrap();
        let live = snapshot(&engine);
        let reloaded = open_with(config, &path);
        let reloaded = snapshot(&reloaded);
        prop_assert_eq!(live.counts, reloaded.counts);
        prop_assert_eq!(live.outstanding, reloaded.outstanding);
        prop_assert_eq!(live.success, reloaded.success);
        prop_assert_eq!(live.failure, reloaded.failure);
        prop_assert_eq!(live.forgotten, reloaded.forgotten);
    }
}
