//! SQLite trial store
//!
//! Local-first durable storage using SQLite in WAL mode.
//!
//! # Toyota Way: 平準化 (Heijunka)
//!
//! SQLite provides consistent, predictable performance without external services.
//!
//! # Example
//!
//! ```ignore
//! use afinar::store::{SqliteStore, TrialStore};
//!
//! let store = SqliteStore::open("./observations.db")?;
//! let next = store.next_row_id()?;
//! ```

mod backend;
pub(crate) mod schema;

pub use backend::SqliteStore;
