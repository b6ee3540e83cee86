//! Lifecycle telemetry
//!
//! The engine owns one [`TelemetrySink`] for its whole lifetime and calls
//! [`TelemetrySink::close`] when it is closed or dropped. Telemetry is
//! best-effort: a sink that cannot write logs a warning instead of failing the
//! lifecycle call that triggered it.

use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Result, TuneError};
use crate::ledger::{ObservationRecord, RowId, Suggestion};

/// Receives lifecycle events from the engine
pub trait TelemetrySink: Send {
    fn suggestion_issued(&mut self, _suggestion: &Suggestion) {}

    fn observation_recorded(&mut self, _record: &ObservationRecord) {}

    fn suggestion_forgotten(&mut self, _row_id: RowId) {}

    /// Release whatever the sink acquired
    fn close(&mut self) {}
}

/// Telemetry disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {}

/// Structured `tracing` events on the `afinar::telemetry` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn suggestion_issued(&mut self, suggestion: &Suggestion) {
        info!(target: "afinar::telemetry", row_id = %suggestion.row_id, values = ?suggestion.values, "suggestion issued");
    }

    fn observation_recorded(&mut self, record: &ObservationRecord) {
        info!(
            target: "afinar::telemetry",
            row_id = %record.row_id,
            output = record.output,
            cost = record.cost,
            is_failure = record.is_failure,
            "observation recorded"
        );
    }

    fn suggestion_forgotten(&mut self, row_id: RowId) {
        info!(target: "afinar::telemetry", row_id = %row_id, "suggestion forgotten");
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum TelemetryEvent<'a> {
    Suggestion { timestamp: String, suggestion: &'a Suggestion },
    Observation { timestamp: String, record: &'a ObservationRecord },
    Forget { timestamp: String, row_id: RowId },
}

/// Appends one JSON object per event to a file
#[derive(Debug)]
pub struct JsonlTelemetry {
    writer: Option<BufWriter<File>>,
}

impl JsonlTelemetry {
    /// Open `path` for appending, creating it if needed
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path).map_err(|e| {
            TuneError::invalid_config(
                "telemetry_path",
                format!("Failed to open telemetry file {}: {e}", path.display()),
            )
        })?;
        Ok(Self { writer: Some(BufWriter::new(file)) })
    }

    fn emit(&mut self, event: &TelemetryEvent<'_>) {
        let Some(writer) = self.writer.as_mut() else {
            warn!("telemetry event after close dropped");
            return;
        };
        let written = serde_json::to_string(event)
            .map_err(std::io::Error::from)
            .and_then(|line| writeln!(writer, "{line}"));
        if let Err(e) = written {
            warn!(error = %e, "failed to write telemetry event");
        }
    }
}

impl TelemetrySink for JsonlTelemetry {
    fn suggestion_issued(&mut self, suggestion: &Suggestion) {
        self.emit(&TelemetryEvent::Suggestion { timestamp: Utc::now().to_rfc3339(), suggestion });
    }

    fn observation_recorded(&mut self, record: &ObservationRecord) {
        self.emit(&TelemetryEvent::Observation { timestamp: Utc::now().to_rfc3339(), record });
    }

    fn suggestion_forgotten(&mut self, row_id: RowId) {
        self.emit(&TelemetryEvent::Forget { timestamp: Utc::now().to_rfc3339(), row_id });
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                warn!(error = %e, "failed to flush telemetry file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_jsonl_writes_one_line_per_event() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut sink = JsonlTelemetry::create(&path).unwrap();

        let suggestion = Suggestion {
            row_id: RowId::new(1),
            values: BTreeMap::from([("lr".to_string(), 0.01)]),
        };
        sink.suggestion_issued(&suggestion);
        sink.suggestion_forgotten(RowId::new(1));
        sink.close();
        sink.suggestion_forgotten(RowId::new(2));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "suggestion");
        assert_eq!(first["suggestion"]["row_id"], 1);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "forget");
    }

    #[test]
    fn test_jsonl_bad_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("events.jsonl");
        assert!(JsonlTelemetry::create(path).is_err());
    }

    #[test]
    fn test_noop_and_tracing_accept_events() {
        let suggestion = Suggestion { row_id: RowId::new(1), values: BTreeMap::new() };
        let mut sinks: Vec<Box<dyn TelemetrySink>> = vec![Box::new(NoopTelemetry), Box::new(TracingTelemetry)];
        for sink in &mut sinks {
            sink.suggestion_issued(&suggestion);
            sink.suggestion_forgotten(RowId::new(1));
            sink.close();
        }
    }
}
