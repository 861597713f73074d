mod file_store;
mod types;

pub use file_store::FileTelemetryStore;
pub use types::{TelemetryEvent, TelemetryRecord};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::settings::GateSettings;

pub const DEFAULT_TELEMETRY_CAP: usize = 100;

/// Append-only event sink used by gate sessions.
///
/// `record` never fails from the caller's point of view; implementations
/// swallow their own storage errors.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, session_id: &str, event: TelemetryEvent);

    /// All retained records, most recent last.
    fn list(&self) -> Vec<TelemetryRecord>;

    fn clear(&self);

    fn list_for_article(&self, article_id: &str) -> Vec<TelemetryRecord> {
        self.list()
            .into_iter()
            .filter(|record| record.event.article_id() == article_id)
            .collect()
    }
}

/// Ring of the most recent records; the oldest entry goes first.
#[derive(Debug, Clone)]
pub(crate) struct BoundedLog {
    records: VecDeque<TelemetryRecord>,
    cap: usize,
}

impl BoundedLog {
    pub(crate) fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            records: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub(crate) fn from_records(records: Vec<TelemetryRecord>, cap: usize) -> Self {
        let mut log = Self::new(cap);
        for record in records {
            log.push(record);
        }
        log
    }

    pub(crate) fn push(&mut self, record: TelemetryRecord) {
        self.records.push_back(record);
        while self.records.len() > self.cap {
            self.records.pop_front();
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<TelemetryRecord> {
        self.records.iter().cloned().collect()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}

/// Lock a log, recovering it if a writer panicked mid-append.
pub(crate) fn lock_log(log: &Mutex<BoundedLog>) -> MutexGuard<'_, BoundedLog> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory bounded telemetry log. Clones share the same log.
pub struct TelemetryRecorder {
    inner: Arc<Mutex<BoundedLog>>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_TELEMETRY_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BoundedLog::new(cap))),
        }
    }

    /// Recorder sized by the deployed `telemetryCap`.
    pub fn from_settings(settings: &GateSettings) -> Self {
        Self::with_cap(settings.telemetry_cap)
    }

    pub fn len(&self) -> usize {
        lock_log(&self.inner).records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TelemetryRecorder {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl TelemetrySink for TelemetryRecorder {
    fn record(&self, session_id: &str, event: TelemetryEvent) {
        // Append and trim happen under one lock.
        lock_log(&self.inner).push(TelemetryRecord::new(session_id, event));
    }

    fn list(&self) -> Vec<TelemetryRecord> {
        lock_log(&self.inner).snapshot()
    }

    fn clear(&self) {
        lock_log(&self.inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn started(article_id: &str, ratio: f64) -> TelemetryEvent {
        TelemetryEvent::GateTestStarted {
            article_id: article_id.into(),
            final_read_ratio: ratio,
        }
    }

    #[test]
    fn evicts_oldest_past_cap() {
        let recorder = TelemetryRecorder::new();
        for i in 0..105 {
            recorder.record("s", started("a", i as f64));
        }
        let records = recorder.list();
        assert_eq!(records.len(), 100);
        assert_eq!(records[0].event, started("a", 5.0));
        assert_eq!(records[99].event, started("a", 104.0));
    }

    #[test]
    fn cap_comes_from_settings() {
        let settings: GateSettings = serde_json::from_str(r#"{"telemetryCap": 4}"#).unwrap();
        let recorder = TelemetryRecorder::from_settings(&settings);
        for i in 0..10 {
            recorder.record("s", started("a", i as f64));
        }
        let records = recorder.list();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].event, started("a", 6.0));
    }

    #[test]
    fn clear_empties_the_log() {
        let recorder = TelemetryRecorder::with_cap(3);
        recorder.record("s", started("a", 0.0));
        recorder.clear();
        assert!(recorder.is_empty());
    }

    #[test]
    fn filters_by_article() {
        let recorder = TelemetryRecorder::new();
        recorder.record("s1", started("a", 0.1));
        recorder.record("s2", started("b", 0.2));
        recorder.record("s1", started("a", 0.3));
        let for_a = recorder.list_for_article("a");
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|record| record.session_id == "s1"));
    }

    #[test]
    fn concurrent_sessions_neither_lose_nor_duplicate() {
        let recorder = TelemetryRecorder::with_cap(1_000);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let recorder = recorder.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        recorder.record(&format!("s{t}"), started(&format!("a{t}"), i as f64));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let records = recorder.list();
        assert_eq!(records.len(), 400);
        for t in 0..4 {
            let ratios: Vec<f64> = records
                .iter()
                .filter(|record| record.session_id == format!("s{t}"))
                .map(|record| match record.event {
                    TelemetryEvent::GateTestStarted { final_read_ratio, .. } => final_read_ratio,
                    _ => unreachable!(),
                })
                .collect();
            let expected: Vec<f64> = (0..100).map(|i| i as f64).collect();
            assert_eq!(ratios, expected);
        }
    }

    #[test]
    fn events_serialize_with_snake_case_kind() {
        let json = serde_json::to_value(TelemetryEvent::ReaderUnlockReached {
            article_id: "a".into(),
            read_ratio: 1.0,
            read_blocks: 2,
            total_blocks: 2,
            time_ms: 70_000,
        })
        .unwrap();
        assert_eq!(json["kind"], "reader_unlock_reached");
        assert_eq!(json["articleId"], "a");
        assert_eq!(json["timeMs"], 70_000);
    }
}
