use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gate lifecycle events kept for QA and tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TelemetryEvent {
    #[serde(rename_all = "camelCase")]
    ReaderViewOpened {
        article_id: String,
        total_blocks: usize,
        total_words: usize,
    },
    #[serde(rename_all = "camelCase")]
    ReaderBlockCompleted {
        article_id: String,
        block_id: String,
        block_index: usize,
        dwell_ms: u64,
        coverage: f64,
        words: usize,
    },
    #[serde(rename_all = "camelCase")]
    ReaderVelocityViolation {
        article_id: String,
        velocity: f64,
        threshold: f64,
    },
    #[serde(rename_all = "camelCase")]
    ReaderUnlockReached {
        article_id: String,
        read_ratio: f64,
        read_blocks: usize,
        total_blocks: usize,
        time_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    GateTestStarted {
        article_id: String,
        final_read_ratio: f64,
    },
}

impl TelemetryEvent {
    pub fn article_id(&self) -> &str {
        match self {
            TelemetryEvent::ReaderViewOpened { article_id, .. }
            | TelemetryEvent::ReaderBlockCompleted { article_id, .. }
            | TelemetryEvent::ReaderVelocityViolation { article_id, .. }
            | TelemetryEvent::ReaderUnlockReached { article_id, .. }
            | TelemetryEvent::GateTestStarted { article_id, .. } => article_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TelemetryEvent::ReaderViewOpened { .. } => "reader_view_opened",
            TelemetryEvent::ReaderBlockCompleted { .. } => "reader_block_completed",
            TelemetryEvent::ReaderVelocityViolation { .. } => "reader_velocity_violation",
            TelemetryEvent::ReaderUnlockReached { .. } => "reader_unlock_reached",
            TelemetryEvent::GateTestStarted { .. } => "gate_test_started",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub id: Uuid,
    pub session_id: String,
    pub recorded_at: DateTime<Utc>,
    pub event: TelemetryEvent,
}

impl TelemetryRecord {
    pub fn new(session_id: &str, event: TelemetryEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            recorded_at: Utc::now(),
            event,
        }
    }
}
