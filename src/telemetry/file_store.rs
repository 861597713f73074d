use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::settings::GateSettings;

use super::{lock_log, BoundedLog, TelemetryEvent, TelemetryRecord, TelemetrySink};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Telemetry log persisted as a JSON array, rewritten on every append.
///
/// Storage failures are logged and swallowed; the in-memory log stays
/// authoritative for the lifetime of the process.
pub struct FileTelemetryStore {
    path: PathBuf,
    log: Mutex<BoundedLog>,
}

impl FileTelemetryStore {
    pub fn new(path: PathBuf, cap: usize) -> Self {
        let records = match Self::load(&path) {
            Ok(records) => records,
            Err(err) => {
                log_warn!("starting with empty telemetry log: {err:#}");
                Vec::new()
            }
        };

        Self {
            path,
            log: Mutex::new(BoundedLog::from_records(records, cap)),
        }
    }

    /// Store sized by the deployed `telemetryCap`.
    pub fn from_settings(path: PathBuf, settings: &GateSettings) -> Self {
        Self::new(path, settings.telemetry_cap)
    }

    fn load(path: &Path) -> Result<Vec<TelemetryRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read telemetry from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse telemetry in {}", path.display()))
    }

    fn persist(&self, records: &[TelemetryRecord]) -> Result<()> {
        let serialized = serde_json::to_string(records)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write telemetry to {}", self.path.display()))
    }
}

impl TelemetrySink for FileTelemetryStore {
    fn record(&self, session_id: &str, event: TelemetryEvent) {
        let mut log = lock_log(&self.log);
        log.push(TelemetryRecord::new(session_id, event));
        // Written while still holding the lock so the file never regresses.
        if let Err(err) = self.persist(&log.snapshot()) {
            log_warn!("telemetry write dropped: {err:#}");
        }
    }

    fn list(&self) -> Vec<TelemetryRecord> {
        lock_log(&self.log).snapshot()
    }

    fn clear(&self) {
        let mut log = lock_log(&self.log);
        log.clear();
        if let Err(err) = self.persist(&[]) {
            log_warn!("telemetry clear not persisted: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened(article_id: &str) -> TelemetryEvent {
        TelemetryEvent::ReaderViewOpened {
            article_id: article_id.into(),
            total_blocks: 2,
            total_words: 200,
        }
    }

    #[test]
    fn records_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");

        let store = FileTelemetryStore::new(path.clone(), 100);
        store.record("s", opened("a"));
        store.record("s", opened("b"));

        let reloaded = FileTelemetryStore::new(path, 100);
        let records = reloaded.list();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].event, opened("b"));
    }

    #[test]
    fn reload_applies_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");

        let store = FileTelemetryStore::new(path.clone(), 10);
        for i in 0..5 {
            store.record("s", opened(&format!("a{i}")));
        }

        let smaller = FileTelemetryStore::new(path, 2);
        let ids: Vec<String> = smaller
            .list()
            .iter()
            .map(|record| record.event.article_id().to_string())
            .collect();
        assert_eq!(ids, vec!["a3", "a4"]);
    }

    #[test]
    fn settings_cap_bounds_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");
        let settings = GateSettings {
            telemetry_cap: 3,
            ..GateSettings::default()
        };

        let store = FileTelemetryStore::from_settings(path.clone(), &settings);
        for i in 0..6 {
            store.record("s", opened(&format!("a{i}")));
        }
        assert_eq!(store.list().len(), 3);

        let on_disk: Vec<TelemetryRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let ids: Vec<&str> = on_disk.iter().map(|record| record.event.article_id()).collect();
        assert_eq!(ids, vec!["a3", "a4", "a5"]);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileTelemetryStore::new(path, 100);
        assert!(store.list().is_empty());
    }

    #[test]
    fn write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory path cannot be written as a file.
        let store = FileTelemetryStore::new(dir.path().to_path_buf(), 100);
        store.record("s", opened("a"));
        assert_eq!(store.list().len(), 1);

        store.clear();
        assert!(store.list().is_empty());
    }
}
