//! Trial store trait definition

use crate::error::Result;
use crate::ledger::RowId;
use crate::param::ParamSchema;

use super::types::{StoredTrial, TrialWrite};

/// Durable, row-keyed backing for the engine's ledgers
///
/// Rows are never deleted, only re-statused, so `next_row_id` derived from the
/// stored maximum is monotonic across restarts.
pub trait TrialStore: Send {
    /// Parameter schema recorded when the store was created
    fn load_schema(&self) -> Result<Option<Vec<ParamSchema>>>;

    /// Record the parameter schema
    fn save_schema(&mut self, schema: &[ParamSchema]) -> Result<()>;

    /// Identifier the next inserted row must use
    fn next_row_id(&self) -> Result<RowId>;

    /// Apply all writes or none of them
    ///
    /// Fails if an insert collides with an existing row, or a resolve/forget
    /// targets a row that is not stored as outstanding.
    fn commit(&mut self, writes: &[TrialWrite]) -> Result<()>;

    /// Every stored row, ordered by row id
    fn scan(&self) -> Result<Vec<StoredTrial>>;

    /// Remove all rows and the schema
    fn clear(&mut self) -> Result<()>;

    /// Insert an outstanding row
    fn insert_outstanding(&mut self, trial: StoredTrial) -> Result<()> {
        self.commit(&[TrialWrite::Insert(trial)])
    }

    /// Mark an outstanding row forgotten
    fn forget(&mut self, row_id: RowId) -> Result<()> {
        self.commit(&[TrialWrite::Forget { row_id }])
    }
}
