use serde::{Deserialize, Serialize};

/// Thresholds deciding when a block counts as read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingConfig {
    /// Samples below this coverage do not accrue dwell time
    pub visibility_floor: f64,

    /// Maximum coverage a block must reach before it can complete
    pub completion_coverage: f64,

    /// Minimum accumulated dwell per word of the block
    pub min_dwell_ms_per_word: u64,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            visibility_floor: 0.1,
            completion_coverage: 0.8,
            min_dwell_ms_per_word: 60,
        }
    }
}

impl ReadingConfig {
    pub fn min_dwell_ms(&self, word_count: usize) -> u64 {
        self.min_dwell_ms_per_word.saturating_mul(word_count as u64)
    }
}
