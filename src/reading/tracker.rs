use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::{GateError, GateResult};

use super::block::{BlockSample, ReadingBlock};
use super::config::ReadingConfig;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Aggregate reading progress for one article view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingState {
    pub completed_blocks: HashSet<String>,
    pub total_dwell_ms: u64,
    pub read_ratio: f64,
}

/// Emitted once, on the sample that completes a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCompletion {
    pub block_id: String,
    pub block_index: usize,
    pub word_count: usize,
    pub dwell_ms: u64,
    pub coverage: f64,
    /// Time since the block first became visible
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl BlockCompletion {
    /// Implied reading speed in words per second.
    pub fn velocity(&self) -> f64 {
        if self.dwell_ms == 0 {
            return f64::INFINITY;
        }
        self.word_count as f64 / (self.dwell_ms as f64 / 1000.0)
    }
}

#[derive(Debug)]
pub struct Observation<'a> {
    pub state: &'a ReadingState,
    pub completed: Option<BlockCompletion>,
}

#[derive(Debug, Clone)]
struct BlockProgress {
    index: usize,
    word_count: usize,
    max_coverage: f64,
    dwell_ms: u64,
    first_visible_at: Option<DateTime<Utc>>,
    last_sample_at: Option<DateTime<Utc>>,
    completed: bool,
}

/// Folds viewport samples into per-block progress and a monotonic read ratio.
#[derive(Debug, Clone)]
pub struct ReadingProgressTracker {
    config: ReadingConfig,
    blocks: HashMap<String, BlockProgress>,
    total_words: usize,
    completed_words: usize,
    state: ReadingState,
}

impl ReadingProgressTracker {
    pub fn new(blocks: Vec<ReadingBlock>, config: ReadingConfig) -> Self {
        let mut progress = HashMap::with_capacity(blocks.len());
        let mut total_words = 0usize;

        for block in blocks {
            if block.word_count == 0 {
                log_warn!("dropping block {} with no words", block.id);
                continue;
            }
            if progress.contains_key(&block.id) {
                log_warn!("dropping duplicate block id {}", block.id);
                continue;
            }
            total_words += block.word_count;
            progress.insert(
                block.id,
                BlockProgress {
                    index: block.index,
                    word_count: block.word_count,
                    max_coverage: 0.0,
                    dwell_ms: 0,
                    first_visible_at: None,
                    last_sample_at: None,
                    completed: false,
                },
            );
        }

        // Nothing to read means nothing left unread.
        let read_ratio = if total_words == 0 { 1.0 } else { 0.0 };

        Self {
            config,
            blocks: progress,
            total_words,
            completed_words: 0,
            state: ReadingState {
                completed_blocks: HashSet::new(),
                total_dwell_ms: 0,
                read_ratio,
            },
        }
    }

    pub fn state(&self) -> &ReadingState {
        &self.state
    }

    pub fn total_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn total_words(&self) -> usize {
        self.total_words
    }

    pub fn is_completed(&self, block_id: &str) -> bool {
        self.state.completed_blocks.contains(block_id)
    }

    /// Apply one sample. Malformed samples are rejected without touching state.
    pub fn observe(&mut self, sample: &BlockSample) -> GateResult<Observation<'_>> {
        if !sample.coverage.is_finite() || !(0.0..=1.0).contains(&sample.coverage) {
            return Err(GateError::InvalidSample(format!(
                "coverage {} for block {} is outside [0, 1]",
                sample.coverage, sample.block_id
            )));
        }

        let config = self.config;
        let progress = self.blocks.get_mut(&sample.block_id).ok_or_else(|| {
            GateError::InvalidSample(format!("unknown block {}", sample.block_id))
        })?;

        if progress.completed {
            return Ok(Observation {
                state: &self.state,
                completed: None,
            });
        }

        if let Some(last) = progress.last_sample_at {
            if sample.timestamp < last {
                return Err(GateError::InvalidSample(format!(
                    "timestamp for block {} went backwards",
                    sample.block_id
                )));
            }
        }

        progress.last_sample_at = Some(sample.timestamp);
        progress.max_coverage = progress.max_coverage.max(sample.coverage);

        if sample.coverage >= config.visibility_floor {
            progress.dwell_ms = progress.dwell_ms.saturating_add(sample.dwell_ms);
            self.state.total_dwell_ms = self.state.total_dwell_ms.saturating_add(sample.dwell_ms);
            progress
                .first_visible_at
                .get_or_insert_with(|| visible_since(sample));
        }

        let reached_coverage = progress.max_coverage >= config.completion_coverage;
        let reached_dwell = progress.dwell_ms >= config.min_dwell_ms(progress.word_count);
        if !(reached_coverage && reached_dwell) {
            return Ok(Observation {
                state: &self.state,
                completed: None,
            });
        }

        progress.completed = true;
        let elapsed_ms = progress
            .first_visible_at
            .map(|at| (sample.timestamp - at).num_milliseconds().max(0) as u64)
            .unwrap_or(0);
        let completion = BlockCompletion {
            block_id: sample.block_id.clone(),
            block_index: progress.index,
            word_count: progress.word_count,
            dwell_ms: progress.dwell_ms,
            coverage: progress.max_coverage,
            elapsed_ms,
            completed_at: sample.timestamp,
        };

        self.completed_words += completion.word_count;
        self.state.completed_blocks.insert(completion.block_id.clone());
        let ratio = (self.completed_words as f64 / self.total_words as f64).min(1.0);
        self.state.read_ratio = self.state.read_ratio.max(ratio);

        Ok(Observation {
            state: &self.state,
            completed: Some(completion),
        })
    }
}

/// Start of the visible span a sample reports, clamped to the sample's own
/// timestamp when the dwell does not fit in the calendar.
fn visible_since(sample: &BlockSample) -> DateTime<Utc> {
    i64::try_from(sample.dwell_ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .and_then(|dwell| sample.timestamp.checked_sub_signed(dwell))
        .unwrap_or(sample.timestamp)
}
