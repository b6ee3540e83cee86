//! Write batching strategies for resolutions

use std::fmt;

use crate::config::TunerConfig;

/// Decides when queued resolutions are committed to the store
///
/// Only `observe()` resolutions are ever queued. Suggestions, forgets and
/// unsolicited observations always commit before returning.
pub trait FlushPolicy: Send + fmt::Debug {
    /// Whether a queue holding `pending` writes must be committed now
    fn should_flush(&self, pending: usize) -> bool;
}

/// Commit every resolution before `observe()` returns
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteThrough;

impl FlushPolicy for WriteThrough {
    fn should_flush(&self, _pending: usize) -> bool {
        true
    }
}

/// Commit once `max_pending` resolutions are queued
#[derive(Debug, Clone, Copy)]
pub struct Batched {
    max_pending: usize,
}

impl Batched {
    pub fn new(max_pending: usize) -> Self {
        Self { max_pending: max_pending.max(1) }
    }

    pub fn max_pending(&self) -> usize {
        self.max_pending
    }
}

impl FlushPolicy for Batched {
    fn should_flush(&self, pending: usize) -> bool {
        pending >= self.max_pending
    }
}

/// Policy selected by `persist_every_observation` / `observation_batch_size`
pub fn policy_for(config: &TunerConfig) -> Box<dyn FlushPolicy> {
    if config.persist_every_observation {
        Box::new(WriteThrough)
    } else {
        Box::new(Batched::new(config.observation_batch_size))
    }
}
