//! SQLite trial store implementation.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, TuneError};
use crate::ledger::RowId;
use crate::param::ParamSchema;
use crate::space::ParameterSpace;
use crate::store::traits::TrialStore;
use crate::store::types::{StoredTrial, TrialStatus, TrialWrite};

use super::schema::init_schema;

/// SQLite-backed trial store
///
/// Each `commit` runs in one transaction, so a crash mid-write leaves every
/// row either fully written or absent.
#[derive(Debug)]
pub struct SqliteStore {
    path: String,
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file (use ":memory:" for in-memory)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();

        if path_str != ":memory:" {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| {
                    TuneError::Persistence(format!("Failed to create {}: {e}", parent.display()))
                })?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| TuneError::Persistence(format!("Failed to open {path_str}: {e}")))?;
        init_schema(&conn)
            .map_err(|e| TuneError::Persistence(format!("Failed to initialize schema: {e}")))?;

        debug!(path = %path_str, "opened trial store");
        Ok(Self { path: path_str, conn })
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Get the database path
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn encode_input(input: &BTreeMap<String, f64>) -> Result<String> {
    serde_json::to_string(input)
        .map_err(|e| TuneError::Persistence(format!("Failed to encode input: {e}")))
}

fn decode_input(row_id: i64, json: &str) -> Result<BTreeMap<String, f64>> {
    serde_json::from_str(json)
        .map_err(|e| TuneError::Persistence(format!("Failed to decode input of row {row_id}: {e}")))
}

/// SQLite stores NaN as NULL; keep that explicit
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn apply(tx: &Transaction<'_>, write: &TrialWrite, now: &str) -> Result<()> {
    match write {
        TrialWrite::Insert(trial) => {
            tx.execute(
                "INSERT INTO trials (row_id, input, status, output, cost, resolution_seq, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5,
                         CASE WHEN ?7 THEN (SELECT COALESCE(MAX(resolution_seq), 0) + 1 FROM trials) END,
                         ?6, ?6)",
                params![
                    trial.row_id.get(),
                    encode_input(&trial.input)?,
                    trial.status.as_str(),
                    trial.output.and_then(finite),
                    trial.cost.and_then(finite),
                    now,
                    trial.status.is_resolved()
                ],
            )
            .map_err(|e| TuneError::Persistence(format!("Failed to insert row {}: {e}", trial.row_id)))?;
        }
        TrialWrite::Resolve { row_id, status, input, output, cost } => {
            let updated = tx
                .execute(
                    "UPDATE trials SET status = ?1, input = ?2, output = ?3, cost = ?4, updated_at = ?5,
                         resolution_seq = (SELECT COALESCE(MAX(resolution_seq), 0) + 1 FROM trials)
                     WHERE row_id = ?6 AND status = 'outstanding'",
                    params![status.as_str(), encode_input(input)?, finite(*output), finite(*cost), now, row_id.get()],
                )
                .map_err(|e| TuneError::Persistence(format!("Failed to resolve row {row_id}: {e}")))?;
            if updated != 1 {
                return Err(TuneError::Persistence(format!("Row {row_id} is not stored as outstanding")));
            }
        }
        TrialWrite::Forget { row_id } => {
            let updated = tx
                .execute(
                    "UPDATE trials SET status = 'forgotten', updated_at = ?1
                     WHERE row_id = ?2 AND status = 'outstanding'",
                    params![now, row_id.get()],
                )
                .map_err(|e| TuneError::Persistence(format!("Failed to forget row {row_id}: {e}")))?;
            if updated != 1 {
                return Err(TuneError::Persistence(format!("Row {row_id} is not stored as outstanding")));
            }
        }
    }
    Ok(())
}

impl TrialStore for SqliteStore {
    fn load_schema(&self) -> Result<Option<Vec<ParamSchema>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, space FROM param_schema ORDER BY position")
            .map_err(|e| TuneError::Persistence(format!("Failed to prepare query: {e}")))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| TuneError::Persistence(format!("Failed to query schema: {e}")))?;

        let mut schema = Vec::new();
        for row in rows {
            let (name, space_json) =
                row.map_err(|e| TuneError::Persistence(format!("Failed to read schema row: {e}")))?;
            let space: ParameterSpace = serde_json::from_str(&space_json).map_err(|e| {
                TuneError::Persistence(format!("Failed to decode space of '{name}': {e}"))
            })?;
            schema.push(ParamSchema { name, space });
        }

        Ok((!schema.is_empty()).then_some(schema))
    }

    fn save_schema(&mut self, schema: &[ParamSchema]) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| TuneError::Persistence(format!("Failed to begin transaction: {e}")))?;
        tx.execute("DELETE FROM param_schema", [])
            .map_err(|e| TuneError::Persistence(format!("Failed to reset schema: {e}")))?;
        for (position, param) in schema.iter().enumerate() {
            let space = serde_json::to_string(&param.space)
                .map_err(|e| TuneError::Persistence(format!("Failed to encode space: {e}")))?;
            tx.execute(
                "INSERT INTO param_schema (position, name, space) VALUES (?1, ?2, ?3)",
                params![position as i64, param.name, space],
            )
            .map_err(|e| TuneError::Persistence(format!("Failed to save schema: {e}")))?;
        }
        tx.commit()
            .map_err(|e| TuneError::Persistence(format!("Failed to commit schema: {e}")))
    }

    fn next_row_id(&self) -> Result<RowId> {
        let next: i64 = self
            .conn
            .query_row("SELECT COALESCE(MAX(row_id), 0) + 1 FROM trials", [], |row| row.get(0))
            .map_err(|e| TuneError::Persistence(format!("Failed to query next row id: {e}")))?;
        Ok(RowId::new(next))
    }

    fn commit(&mut self, writes: &[TrialWrite]) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }
        let now = Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction()
            .map_err(|e| TuneError::Persistence(format!("Failed to begin transaction: {e}")))?;
        for write in writes {
            // dropping `tx` on error rolls the whole batch back
            apply(&tx, write, &now)?;
        }
        tx.commit()
            .map_err(|e| TuneError::Persistence(format!("Failed to commit {} writes: {e}", writes.len())))?;
        debug!(writes = writes.len(), "committed trial writes");
        Ok(())
    }

    fn scan(&self) -> Result<Vec<StoredTrial>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT row_id, input, status, output, cost, resolution_seq FROM trials ORDER BY row_id",
            )
            .map_err(|e| TuneError::Persistence(format!("Failed to prepare query: {e}")))?;
        let rows = stmt
            .query_map([], |row| {
                let row_id: i64 = row.get(0)?;
                let input: String = row.get(1)?;
                let status: String = row.get(2)?;
                let output: Option<f64> = row.get(3)?;
                let cost: Option<f64> = row.get(4)?;
                let resolution_seq: Option<i64> = row.get(5)?;
                Ok((row_id, input, status, output, cost, resolution_seq))
            })
            .map_err(|e| TuneError::Persistence(format!("Failed to query trials: {e}")))?;

        let mut trials = Vec::new();
        for row in rows {
            let (row_id, input, status, output, cost, resolution_seq) =
                row.map_err(|e| TuneError::Persistence(format!("Failed to read trial row: {e}")))?;
            trials.push(StoredTrial {
                row_id: RowId::new(row_id),
                input: decode_input(row_id, &input)?,
                status: status.parse::<TrialStatus>()?,
                output,
                cost,
                resolution_seq,
            });
        }

        Ok(trials)
    }

    fn clear(&mut self) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| TuneError::Persistence(format!("Failed to begin transaction: {e}")))?;
        tx.execute("DELETE FROM trials", [])
            .map_err(|e| TuneError::Persistence(format!("Failed to clear trials: {e}")))?;
        tx.execute("DELETE FROM param_schema", [])
            .map_err(|e| TuneError::Persistence(format!("Failed to clear schema: {e}")))?;
        tx.commit()
            .map_err(|e| TuneError::Persistence(format!("Failed to commit clear: {e}")))
    }
}

impl SqliteStore {
    /// Status of a single row, if stored
    pub fn status_of(&self, row_id: RowId) -> Result<Option<TrialStatus>> {
        let status: Option<String> = self
            .conn
            .query_row("SELECT status FROM trials WHERE row_id = ?1", [row_id.get()], |row| row.get(0))
            .optional()
            .map_err(|e| TuneError::Persistence(format!("Failed to query row {row_id}: {e}")))?;
        status.map(|s| s.parse()).transpose()
    }
}
