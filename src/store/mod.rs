//! Persistence store
//!
//! Row-keyed durable storage for every suggestion and its resolution. The
//! engine is the only writer; ledgers are rebuilt from [`TrialStore::scan`].

mod memory;
pub mod sqlite;
mod traits;
mod types;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::TrialStore;
pub use types::{StoredTrial, TrialStatus, TrialWrite};
